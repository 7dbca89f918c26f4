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

//! Filter expression node definitions

use chrono::NaiveDate;
use serde::Serialize;

/// Scalar literal carried by terms and range bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Boolean flag value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value (concept ids render as strings for keyword fields)
    Str(String),
    /// Calendar date (no time of day)
    Date(NaiveDate),
}

impl ScalarValue {
    /// JSON rendition for the realized query; dates format as `yyyy-MM-dd`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(n) => serde_json::json!(n),
            Self::Float(x) => serde_json::json!(x),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// True for calendar-date values
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// Tagged tree of filter predicates over a person document
///
/// Recursive variants are boxed; child lists stay inline since real
/// requests fan out at most a few dozen nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterExpression {
    /// All children must match
    And(Vec<FilterExpression>),
    /// At least one child must match; an empty list matches everything,
    /// mirroring an empty bool query
    Or(Vec<FilterExpression>),
    /// Child must not match
    Not(Box<FilterExpression>),
    /// Field holds one of the given values
    Term {
        /// Document field name
        field: String,
        /// Accepted values
        values: Vec<ScalarValue>,
    },
    /// Field falls inside the (half-)open interval
    Range {
        /// Document field name
        field: String,
        /// Lower bound, if constrained
        lo: Option<ScalarValue>,
        /// Upper bound, if constrained
        hi: Option<ScalarValue>,
        /// Whether the lower bound itself is inside the interval
        inclusive_lo: bool,
        /// Whether the upper bound itself is inside the interval
        inclusive_hi: bool,
    },
    /// Person matches when at least `min_occurrences` sub-documents of
    /// `path` satisfy the predicate
    NestedThreshold {
        /// Nested collection path
        path: String,
        /// Predicate evaluated per sub-document
        predicate: Box<FilterExpression>,
        /// Minimum count of matching sub-documents
        min_occurrences: u32,
    },
}

impl FilterExpression {
    /// Conjunction of the given children
    pub fn and(children: Vec<FilterExpression>) -> Self {
        Self::And(children)
    }

    /// Disjunction of the given children
    pub fn or(children: Vec<FilterExpression>) -> Self {
        Self::Or(children)
    }

    /// Negation of the child
    pub fn not(child: FilterExpression) -> Self {
        Self::Not(Box::new(child))
    }

    /// Term predicate over the given field
    pub fn term(field: impl Into<String>, values: Vec<ScalarValue>) -> Self {
        Self::Term {
            field: field.into(),
            values,
        }
    }

    /// Occurrence-threshold predicate over a nested collection
    pub fn nested_threshold(
        path: impl Into<String>,
        predicate: FilterExpression,
        min_occurrences: u32,
    ) -> Self {
        Self::NestedThreshold {
            path: path.into(),
            predicate: Box::new(predicate),
            min_occurrences,
        }
    }

    /// Start a range predicate over the given field
    pub fn range(field: impl Into<String>) -> RangeBuilder {
        RangeBuilder::new(field)
    }
}

/// Fluent builder for [`FilterExpression::Range`]
#[derive(Debug, Clone)]
pub struct RangeBuilder {
    field: String,
    lo: Option<ScalarValue>,
    hi: Option<ScalarValue>,
    inclusive_lo: bool,
    inclusive_hi: bool,
}

impl RangeBuilder {
    /// Unbounded range over the field
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            lo: None,
            hi: None,
            inclusive_lo: true,
            inclusive_hi: true,
        }
    }

    /// Exclusive lower bound
    pub fn gt(mut self, value: ScalarValue) -> Self {
        self.lo = Some(value);
        self.inclusive_lo = false;
        self
    }

    /// Inclusive lower bound
    pub fn gte(mut self, value: ScalarValue) -> Self {
        self.lo = Some(value);
        self.inclusive_lo = true;
        self
    }

    /// Exclusive upper bound
    pub fn lt(mut self, value: ScalarValue) -> Self {
        self.hi = Some(value);
        self.inclusive_hi = false;
        self
    }

    /// Inclusive upper bound
    pub fn lte(mut self, value: ScalarValue) -> Self {
        self.hi = Some(value);
        self.inclusive_hi = true;
        self
    }

    /// Finish the range expression
    pub fn build(self) -> FilterExpression {
        FilterExpression::Range {
            field: self.field,
            lo: self.lo,
            hi: self.hi,
            inclusive_lo: self.inclusive_lo,
            inclusive_hi: self.inclusive_hi,
        }
    }
}
