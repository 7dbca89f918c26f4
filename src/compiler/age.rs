// Copyright 2026 Cohort Search Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Age-range to birth-date-range arithmetic, anchored to "now"

use chrono::{Months, NaiveDate};

/// Birth-date window equivalent to an inclusive age range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthDateRange {
    /// Exclusive lower bound: a person born exactly on this date has already
    /// turned `hi_age + 1` and falls outside the range. Absent when the age
    /// range is open-ended upward.
    pub lo_exclusive: Option<NaiveDate>,
    /// Inclusive upper bound, derived from the low end of the age range
    /// (younger age, more recent birth date)
    pub hi_inclusive: NaiveDate,
}

/// Calendar date exactly `years` before `today`, clamped at month ends
pub fn today_minus_years(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

/// Translate "age between `lo_age` and `hi_age` inclusive, as of `today`"
/// into a birth-date window.
///
/// The upper age bound shifts by one year so that the boundary stays
/// inclusive in age space: someone born exactly `hi_age + 1` years ago is
/// `hi_age + 1` today and must be excluded, while a birth date one day later
/// still evaluates to `hi_age`.
pub fn birth_date_range(today: NaiveDate, lo_age: u32, hi_age: Option<u32>) -> BirthDateRange {
    BirthDateRange {
        lo_exclusive: hi_age.map(|hi| today_minus_years(today, hi + 1)),
        hi_inclusive: today_minus_years(today, lo_age),
    }
}
