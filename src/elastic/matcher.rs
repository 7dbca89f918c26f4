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

//! In-memory filter evaluation over single documents
//!
//! Reference semantics for the realized queries: an occurrence threshold
//! here is a literal count of qualifying nested events, which the engine's
//! summed-constant-score realization must reproduce exactly. Used to check
//! set semantics without a live index; not a query planner.

use chrono::NaiveDate;

use crate::elastic::document::{self, EventDocument, PersonDocument};
use crate::filter::{FilterExpression, ScalarValue};

/// Evaluate a compiled filter against one person document
pub fn matches(expr: &FilterExpression, person: &PersonDocument) -> bool {
    eval(expr, person, None)
}

fn eval(expr: &FilterExpression, person: &PersonDocument, event: Option<&EventDocument>) -> bool {
    match expr {
        FilterExpression::And(children) => {
            children.iter().all(|child| eval(child, person, event))
        }
        // An empty disjunction mirrors an empty bool query: match-all.
        FilterExpression::Or(children) => {
            children.is_empty() || children.iter().any(|child| eval(child, person, event))
        }
        FilterExpression::Not(inner) => !eval(inner, person, event),
        FilterExpression::Term { field, values } => field_values(field, person, event)
            .iter()
            .any(|doc_value| values.iter().any(|value| doc_value.equals(value))),
        FilterExpression::Range {
            field,
            lo,
            hi,
            inclusive_lo,
            inclusive_hi,
        } => field_values(field, person, event).iter().any(|doc_value| {
            doc_value.meets_lower(lo.as_ref(), *inclusive_lo)
                && doc_value.meets_upper(hi.as_ref(), *inclusive_hi)
        }),
        FilterExpression::NestedThreshold {
            predicate,
            min_occurrences,
            ..
        } => {
            let qualifying = person
                .events
                .iter()
                .filter(|nested| eval(predicate, person, Some(nested)))
                .count();
            qualifying >= *min_occurrences as usize
        }
    }
}

/// A document field value in comparable form
enum FieldValue {
    Num(f64),
    Date(NaiveDate),
    Text(String),
    Flag(bool),
}

impl FieldValue {
    fn equals(&self, value: &ScalarValue) -> bool {
        match (self, value) {
            (Self::Flag(flag), ScalarValue::Bool(b)) => flag == b,
            (Self::Num(n), _) => scalar_as_f64(value).is_some_and(|x| *n == x),
            (Self::Text(text), ScalarValue::Str(s)) => text == s,
            (Self::Date(date), _) => scalar_as_date(value).is_some_and(|d| *date == d),
            _ => false,
        }
    }

    fn meets_lower(&self, lo: Option<&ScalarValue>, inclusive: bool) -> bool {
        let Some(lo) = lo else { return true };
        match self.compare(lo) {
            Some(ordering) => ordering.is_gt() || (inclusive && ordering.is_eq()),
            None => false,
        }
    }

    fn meets_upper(&self, hi: Option<&ScalarValue>, inclusive: bool) -> bool {
        let Some(hi) = hi else { return true };
        match self.compare(hi) {
            Some(ordering) => ordering.is_lt() || (inclusive && ordering.is_eq()),
            None => false,
        }
    }

    fn compare(&self, value: &ScalarValue) -> Option<std::cmp::Ordering> {
        match self {
            Self::Num(n) => scalar_as_f64(value).and_then(|x| n.partial_cmp(&x)),
            Self::Date(date) => scalar_as_date(value).map(|d| date.cmp(&d)),
            Self::Text(text) => match value {
                ScalarValue::Str(s) => Some(text.as_str().cmp(s.as_str())),
                _ => None,
            },
            Self::Flag(_) => None,
        }
    }
}

fn scalar_as_f64(value: &ScalarValue) -> Option<f64> {
    match value {
        ScalarValue::Int(n) => Some(*n as f64),
        ScalarValue::Float(x) => Some(*x),
        ScalarValue::Str(s) => s.parse().ok(),
        _ => None,
    }
}

fn scalar_as_date(value: &ScalarValue) -> Option<NaiveDate> {
    match value {
        ScalarValue::Date(date) => Some(*date),
        ScalarValue::Str(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Values a field name resolves to; event fields resolve only inside a
/// nested scope, person fields resolve from anywhere
fn field_values(
    field: &str,
    person: &PersonDocument,
    event: Option<&EventDocument>,
) -> Vec<FieldValue> {
    if let Some((path, event_name)) = field.split_once('.') {
        if path != document::EVENTS {
            return Vec::new();
        }
        let Some(event) = event else { return Vec::new() };
        return match event_name {
            document::CONCEPT_ID => vec![FieldValue::Num(event.concept_id as f64)],
            document::SOURCE_CONCEPT_ID => vec![FieldValue::Num(event.source_concept_id as f64)],
            document::START_DATE => vec![FieldValue::Date(event.start_date)],
            document::AGE_AT_START => vec![FieldValue::Num(event.age_at_start as f64)],
            document::VISIT_CONCEPT_ID => vec![FieldValue::Num(event.visit_concept_id as f64)],
            document::VALUE_AS_NUMBER => event
                .value_as_number
                .map(FieldValue::Num)
                .into_iter()
                .collect(),
            document::VALUE_AS_CONCEPT_ID => vec![FieldValue::Num(event.value_as_concept_id as f64)],
            document::VALUE_AS_SOURCE_CONCEPT_ID => {
                vec![FieldValue::Num(event.value_as_source_concept_id as f64)]
            }
            _ => Vec::new(),
        };
    }
    match field {
        document::GENDER_CONCEPT_ID => vec![FieldValue::Num(person.gender_concept_id as f64)],
        document::RACE_CONCEPT_ID => vec![FieldValue::Num(person.race_concept_id as f64)],
        document::ETHNICITY_CONCEPT_ID => vec![FieldValue::Num(person.ethnicity_concept_id as f64)],
        document::IS_DECEASED => vec![FieldValue::Flag(person.is_deceased)],
        document::BIRTH_DATETIME => vec![FieldValue::Date(person.birth_datetime)],
        document::AGE_AT_CONSENT => vec![FieldValue::Num(person.age_at_consent as f64)],
        document::AGE_AT_CDR => vec![FieldValue::Num(person.age_at_cdr as f64)],
        document::GENDER => vec![FieldValue::Text(person.gender.clone())],
        document::RACE => vec![FieldValue::Text(person.race.clone())],
        _ => Vec::new(),
    }
}
