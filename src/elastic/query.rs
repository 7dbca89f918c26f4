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

//! Filter expression realizer for the nested-document search engine
//!
//! Walks a [`FilterExpression`] and emits the engine's query DSL as JSON.
//! Occurrence thresholds realize as a function-score query that sums a
//! constant unit score per matching nested event and gates the parent on
//! `min_score`, which makes the engine count qualifying events without
//! enumerating them.

use serde_json::{Map, Value, json};

use crate::filter::{FilterExpression, ScalarValue};

/// Realize a compiled filter expression as an executable query
pub fn realize(expr: &FilterExpression) -> Value {
    match expr {
        FilterExpression::And(children) => {
            // Negated children fold into the same bool query, so the top
            // level realizes as one bool with filter + must_not arrays.
            let mut filter = Vec::new();
            let mut must_not = Vec::new();
            for child in children {
                match child {
                    FilterExpression::Not(inner) => must_not.push(realize(inner)),
                    other => filter.push(realize(other)),
                }
            }
            let mut body = Map::new();
            if !filter.is_empty() {
                body.insert("filter".into(), Value::Array(filter));
            }
            if !must_not.is_empty() {
                body.insert("must_not".into(), Value::Array(must_not));
            }
            json!({ "bool": body })
        }
        FilterExpression::Or(children) => {
            let should: Vec<Value> = children.iter().map(realize).collect();
            if should.is_empty() {
                json!({ "bool": {} })
            } else {
                json!({ "bool": { "should": should } })
            }
        }
        FilterExpression::Not(inner) => {
            json!({ "bool": { "must_not": [realize(inner)] } })
        }
        FilterExpression::Term { field, values } => match values.as_slice() {
            [single @ ScalarValue::Bool(_)] => {
                json!({ "term": { field.clone(): single.to_json() } })
            }
            _ => {
                let values: Vec<Value> = values.iter().map(ScalarValue::to_json).collect();
                json!({ "terms": { field.clone(): values } })
            }
        },
        FilterExpression::Range {
            field,
            lo,
            hi,
            inclusive_lo,
            inclusive_hi,
        } => {
            let mut bounds = Map::new();
            let mut has_date_bound = false;
            if let Some(lo) = lo {
                has_date_bound |= lo.is_date();
                let key = if *inclusive_lo { "gte" } else { "gt" };
                bounds.insert(key.into(), lo.to_json());
            }
            if let Some(hi) = hi {
                has_date_bound |= hi.is_date();
                let key = if *inclusive_hi { "lte" } else { "lt" };
                bounds.insert(key.into(), hi.to_json());
            }
            if has_date_bound {
                bounds.insert("format".into(), json!("yyyy-MM-dd"));
            }
            json!({ "range": { field.clone(): bounds } })
        }
        FilterExpression::NestedThreshold {
            path,
            predicate,
            min_occurrences,
        } => {
            json!({
                "function_score": {
                    "query": {
                        "nested": {
                            "path": path,
                            "query": { "constant_score": { "filter": realize(predicate) } },
                            "score_mode": "sum"
                        }
                    },
                    "min_score": min_occurrences
                }
            })
        }
    }
}
