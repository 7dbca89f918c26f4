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

//! Per-person document schema
//!
//! Fixed external contract of the backing index: one document per person,
//! flat demographic fields plus a nested `events` collection with one
//! sub-document per clinical occurrence. The compiler's field-name choices
//! must match this schema exactly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Nested collection path holding clinical events
pub const EVENTS: &str = "events";

/// Gender concept id (flat)
pub const GENDER_CONCEPT_ID: &str = "gender_concept_id";
/// Race concept id (flat)
pub const RACE_CONCEPT_ID: &str = "race_concept_id";
/// Ethnicity concept id (flat)
pub const ETHNICITY_CONCEPT_ID: &str = "ethnicity_concept_id";
/// Deceased flag (flat)
pub const IS_DECEASED: &str = "is_deceased";
/// Birth date, day precision (flat)
pub const BIRTH_DATETIME: &str = "birth_datetime";
/// Age at program consent, precomputed (flat)
pub const AGE_AT_CONSENT: &str = "age_at_consent";
/// Age at the data snapshot date, precomputed (flat)
pub const AGE_AT_CDR: &str = "age_at_cdr";
/// Gender display label (flat, keyword; demographic aggregations)
pub const GENDER: &str = "gender";
/// Race display label (flat, keyword; demographic aggregations)
pub const RACE: &str = "race";

/// Standard-vocabulary concept id (event)
pub const CONCEPT_ID: &str = "concept_id";
/// Source-vocabulary concept id (event)
pub const SOURCE_CONCEPT_ID: &str = "source_concept_id";
/// Event start date (event)
pub const START_DATE: &str = "start_date";
/// Person's age when the event started (event)
pub const AGE_AT_START: &str = "age_at_start";
/// Visit type concept id (event)
pub const VISIT_CONCEPT_ID: &str = "visit_concept_id";
/// Measured numeric value (event)
pub const VALUE_AS_NUMBER: &str = "value_as_number";
/// Standard value concept id (event)
pub const VALUE_AS_CONCEPT_ID: &str = "value_as_concept_id";
/// Source value concept id (event)
pub const VALUE_AS_SOURCE_CONCEPT_ID: &str = "value_as_source_concept_id";

/// Dotted path of an event-level field
pub fn event_field(name: &str) -> String {
    format!("{EVENTS}.{name}")
}

/// One person document as stored in the index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonDocument {
    /// Gender concept id
    pub gender_concept_id: i64,
    /// Race concept id
    pub race_concept_id: i64,
    /// Ethnicity concept id
    pub ethnicity_concept_id: i64,
    /// Gender display label
    #[serde(default)]
    pub gender: String,
    /// Race display label
    #[serde(default)]
    pub race: String,
    /// Whether the person is deceased
    pub is_deceased: bool,
    /// Birth date (day precision)
    pub birth_datetime: NaiveDate,
    /// Age at program consent
    pub age_at_consent: i64,
    /// Age at the data snapshot date
    pub age_at_cdr: i64,
    /// Nested clinical events
    #[serde(default)]
    pub events: Vec<EventDocument>,
}

/// One clinical occurrence nested under a person
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventDocument {
    /// Standard-vocabulary concept id
    pub concept_id: i64,
    /// Source-vocabulary concept id
    pub source_concept_id: i64,
    /// Event start date
    pub start_date: NaiveDate,
    /// Person's age when the event started
    pub age_at_start: i64,
    /// Visit type concept id
    #[serde(default)]
    pub visit_concept_id: i64,
    /// Measured numeric value, if any
    #[serde(default)]
    pub value_as_number: Option<f64>,
    /// Standard value concept id
    #[serde(default)]
    pub value_as_concept_id: i64,
    /// Source value concept id
    #[serde(default)]
    pub value_as_source_concept_id: i64,
}
