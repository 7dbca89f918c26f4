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

//! Closed enumerations of the search request DSL
//!
//! Unknown wire names are rejected at the deserialization boundary, so the
//! compiler can match exhaustively instead of defending against stray
//! strings at every dispatch site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical domain a search parameter targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Domain {
    /// Person-level demographics (flat schema fields)
    Person,
    /// Condition occurrences
    Condition,
    /// Procedure occurrences
    Procedure,
    /// Drug exposures
    Drug,
    /// Lab and vitals measurements
    Measurement,
    /// Observations
    Observation,
    /// Visit occurrences
    Visit,
    /// Device exposures
    Device,
    /// Survey responses
    Survey,
    /// Program physical measurements
    PhysicalMeasurement,
}

/// Criteria tree a search parameter was selected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriteriaType {
    /// Gender identity concept
    Gender,
    /// Race concept
    Race,
    /// Ethnicity concept
    Ethnicity,
    /// Current-age criterion (no concept id; carries an AGE attribute)
    Age,
    /// Deceased-status criterion (no concept id)
    Deceased,
    /// ICD-9-CM diagnosis codes
    Icd9cm,
    /// ICD-10-CM diagnosis codes
    Icd10cm,
    /// ICD-10-PCS procedure codes
    Icd10pcs,
    /// CPT-4 procedure codes
    Cpt4,
    /// SNOMED CT concepts
    Snomed,
    /// LOINC lab codes
    Loinc,
    /// ATC drug classification
    Atc,
    /// RxNorm drug codes
    Rxnorm,
    /// Program survey (PPI) concepts
    Ppi,
    /// Visit type concepts
    Visit,
}

impl CriteriaType {
    /// Wire name of this criteria type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "GENDER",
            Self::Race => "RACE",
            Self::Ethnicity => "ETHNICITY",
            Self::Age => "AGE",
            Self::Deceased => "DECEASED",
            Self::Icd9cm => "ICD9CM",
            Self::Icd10cm => "ICD10CM",
            Self::Icd10pcs => "ICD10PCS",
            Self::Cpt4 => "CPT4",
            Self::Snomed => "SNOMED",
            Self::Loinc => "LOINC",
            Self::Atc => "ATC",
            Self::Rxnorm => "RXNORM",
            Self::Ppi => "PPI",
            Self::Visit => "VISIT",
        }
    }
}

impl fmt::Display for CriteriaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute kinds attachable to a search parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttrName {
    /// Numeric value constraint over the event's measured value
    Num,
    /// Categorical value constraint over the event's value concept
    Cat,
    /// Current-age constraint, anchored to "now"
    Age,
    /// Age at program consent (precomputed integer column)
    AgeAtConsent,
    /// Age at the data snapshot date (precomputed integer column)
    AgeAtCdr,
}

impl AttrName {
    /// Wire name of this attribute kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Num => "NUM",
            Self::Cat => "CAT",
            Self::Age => "AGE",
            Self::AgeAtConsent => "AGE_AT_CONSENT",
            Self::AgeAtCdr => "AGE_AT_CDR",
        }
    }
}

impl fmt::Display for AttrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modifier kinds applicable to a whole search group item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierName {
    /// Minimum count of qualifying events
    NumOfOccurrences,
    /// Constraint on the event date
    EventDate,
    /// Constraint on the person's age when the event occurred
    AgeAtEvent,
    /// Restriction to events within given visit types
    Encounters,
}

impl ModifierName {
    /// Wire name of this modifier kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumOfOccurrences => "NUM_OF_OCCURRENCES",
            Self::EventDate => "EVENT_DATE",
            Self::AgeAtEvent => "AGE_AT_EVENT",
            Self::Encounters => "ENCOUNTERS",
        }
    }
}

impl fmt::Display for ModifierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators carried by attributes and modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// Equality
    Equal,
    /// Inequality
    NotEqual,
    /// Strictly less than
    LessThan,
    /// Strictly greater than
    GreaterThan,
    /// Less than or equal
    LessThanOrEqualTo,
    /// Greater than or equal
    GreaterThanOrEqualTo,
    /// Inclusive two-sided range
    Between,
    /// Pattern match (relational path only; rejected here)
    Like,
    /// Membership in the operand set
    In,
}

impl Operator {
    /// Wire name of this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::GreaterThan => "GREATER_THAN",
            Self::LessThanOrEqualTo => "LESS_THAN_OR_EQUAL_TO",
            Self::GreaterThanOrEqualTo => "GREATER_THAN_OR_EQUAL_TO",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        let json = serde_json::to_string(&CriteriaType::Icd10cm).unwrap();
        assert_eq!(json, "\"ICD10CM\"");
        let back: CriteriaType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CriteriaType::Icd10cm);

        assert_eq!(
            serde_json::to_string(&ModifierName::NumOfOccurrences).unwrap(),
            "\"NUM_OF_OCCURRENCES\""
        );
        assert_eq!(
            serde_json::to_string(&Domain::PhysicalMeasurement).unwrap(),
            "\"PHYSICAL_MEASUREMENT\""
        );
    }

    #[test]
    fn test_unknown_wire_name_is_rejected() {
        let parsed: std::result::Result<ModifierName, _> = serde_json::from_str("\"CASE_AGE\"");
        assert!(parsed.is_err());
    }
}
