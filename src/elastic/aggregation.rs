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

//! Demographic breakdown aggregations
//!
//! Builds the age-range x gender x race bucket spec executed alongside a
//! compiled cohort filter, and decodes the returned bucket counts into a
//! flat chart-ready list. The single-character gender rendering and the
//! `"> 65"` top-range label are display conventions the chart layer relies
//! on; they are fixed here, not in the UI.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::compiler::age::birth_date_range;
use crate::elastic::document;
use crate::error::{CohortSearchError, Result};

/// Aggregation name of the outer age-range buckets
pub const AGE_RANGES_AGG: &str = "age_ranges";
/// Aggregation name of the gender sub-buckets
pub const GENDER_AGG: &str = "gender";
/// Aggregation name of the race sub-buckets
pub const RACE_AGG: &str = "race";

/// One demographic chart cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoChartInfo {
    /// Single-character gender code (first character of the stored label)
    pub gender: String,
    /// Race display label
    pub race: String,
    /// Age range label as charted, e.g. `"18-44"` or `"> 65"`
    pub age_range: String,
    /// Matching person count
    pub count: i64,
}

/// Build the demographic bucket spec for the given age-range labels,
/// anchored to today's date
pub fn demo_chart_buckets(age_ranges: &[&str]) -> Result<Value> {
    demo_chart_buckets_at(age_ranges, Utc::now().date_naive())
}

/// Build the demographic bucket spec with an explicit "today"
///
/// Labels are either `"lo-hi"` (inclusive age range) or a bare `"lo"`
/// (open-ended top range). The date-range bounds reuse the compiler's
/// age arithmetic, shifted one day because the engine's range buckets are
/// from-inclusive and to-exclusive while the birth-date window is the
/// opposite.
pub fn demo_chart_buckets_at(age_ranges: &[&str], today: NaiveDate) -> Result<Value> {
    let mut ranges = Vec::new();
    for label in age_ranges {
        let (lo_age, hi_age) = parse_age_range(label)?;
        let window = birth_date_range(today, lo_age, hi_age);
        let mut entry = serde_json::Map::new();
        entry.insert("key".into(), json!(label));
        if let Some(lo_exclusive) = window.lo_exclusive {
            entry.insert("from".into(), json!(iso_date(day_after(lo_exclusive))));
        }
        entry.insert("to".into(), json!(iso_date(day_after(window.hi_inclusive))));
        ranges.push(Value::Object(entry));
    }

    Ok(json!({
        AGE_RANGES_AGG: {
            "date_range": {
                "field": document::BIRTH_DATETIME,
                "format": "yyyy-MM-dd",
                "ranges": ranges
            },
            "aggs": {
                GENDER_AGG: {
                    "terms": {
                        "field": document::GENDER,
                        "order": { "_key": "asc" }
                    },
                    "aggs": {
                        RACE_AGG: {
                            "terms": {
                                "field": document::RACE,
                                "order": { "_key": "asc" },
                                "min_doc_count": 1
                            }
                        }
                    }
                }
            }
        }
    }))
}

/// Decode an aggregation response into chart cells
///
/// `aggregations` is the response's aggregations object. Buckets walk in
/// the label order given by `age_ranges`; missing buckets are skipped.
pub fn unwrap_demo_buckets(aggregations: &Value, age_ranges: &[&str]) -> Vec<DemoChartInfo> {
    let mut cells = Vec::new();
    let buckets = &aggregations[AGE_RANGES_AGG]["buckets"];
    for label in age_ranges {
        let Some(bucket) = find_bucket(buckets, label) else {
            continue;
        };
        let age_range = if label.contains('-') {
            (*label).to_string()
        } else {
            format!("> {label}")
        };
        for gender_bucket in bucket_list(&bucket[GENDER_AGG]) {
            let gender_label = key_str(gender_bucket);
            let gender: String = gender_label.chars().take(1).collect();
            for race_bucket in bucket_list(&gender_bucket[RACE_AGG]) {
                cells.push(DemoChartInfo {
                    gender: gender.clone(),
                    race: key_str(race_bucket).to_string(),
                    age_range: age_range.clone(),
                    count: race_bucket["doc_count"].as_i64().unwrap_or(0),
                });
            }
        }
    }
    cells
}

fn parse_age_range(label: &str) -> Result<(u32, Option<u32>)> {
    let parse = |text: &str| -> Result<u32> {
        text.parse().map_err(|_| CohortSearchError::InvalidOperand {
            construct: "age range label".into(),
            operand: label.to_string(),
        })
    };
    match label.split_once('-') {
        Some((lo, hi)) => Ok((parse(lo)?, Some(parse(hi)?))),
        None => Ok((parse(label)?, None)),
    }
}

fn day_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn find_bucket<'a>(buckets: &'a Value, label: &str) -> Option<&'a Value> {
    buckets
        .as_array()?
        .iter()
        .find(|bucket| bucket["key"] == *label)
}

fn bucket_list(aggregation: &Value) -> impl Iterator<Item = &Value> {
    aggregation["buckets"].as_array().into_iter().flatten()
}

fn key_str(bucket: &Value) -> &str {
    bucket["key"].as_str().unwrap_or_default()
}
