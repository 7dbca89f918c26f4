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

//! Search request structure
//!
//! A request is a two-level boolean expression: include groups are ANDed,
//! the items inside a group are ORed, and each item is the OR of its
//! parameters under the item's shared modifiers.

use serde::{Deserialize, Serialize};

use super::types::{AttrName, CriteriaType, Domain, ModifierName, Operator};

/// Top-level cohort search request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Groups a matching person must satisfy, all of them
    #[serde(default)]
    pub includes: Vec<SearchGroup>,
    /// Groups a matching person must not satisfy (see the compiler for the
    /// excludes-only caveat)
    #[serde(default)]
    pub excludes: Vec<SearchGroup>,
    /// Named boolean flags on the person document that must all be true
    #[serde(default)]
    pub data_filters: Vec<String>,
}

impl SearchRequest {
    /// Request with include groups only
    pub fn includes(groups: Vec<SearchGroup>) -> Self {
        Self {
            includes: groups,
            ..Self::default()
        }
    }

    /// Request with exclude groups only
    pub fn excludes(groups: Vec<SearchGroup>) -> Self {
        Self {
            excludes: groups,
            ..Self::default()
        }
    }
}

/// One AND-term of the request: the OR of its items
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroup {
    /// Items, any one of which satisfies the group
    #[serde(default)]
    pub items: Vec<SearchGroupItem>,
}

impl SearchGroup {
    /// Group holding the given items
    pub fn of(items: Vec<SearchGroupItem>) -> Self {
        Self { items }
    }
}

/// One OR-term of a group: parameters sharing a set of modifiers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroupItem {
    /// Criteria selected by the user; any one may match
    #[serde(default)]
    pub search_parameters: Vec<SearchParameter>,
    /// Modifiers applied to every parameter of this item
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl SearchGroupItem {
    /// Item holding the given parameters and no modifiers
    pub fn of(search_parameters: Vec<SearchParameter>) -> Self {
        Self {
            search_parameters,
            modifiers: Vec::new(),
        }
    }

    /// Attach a modifier
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// One selected criterion
///
/// A parameter is a concrete leaf (`concept_id` present), a group criterion
/// (`group` set, expanded through the resolver), or a schema-level boolean
/// criterion such as DECEASED (neither).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameter {
    /// Domain the criterion was selected from
    pub domain: Domain,
    /// Criteria tree the criterion belongs to
    #[serde(rename = "type")]
    pub criteria_type: CriteriaType,
    /// Concept id of a concrete leaf selection
    #[serde(default)]
    pub concept_id: Option<i64>,
    /// Whether this selection stands for all its descendant leaves
    #[serde(default)]
    pub group: bool,
    /// Whether the criterion is coded in the standard vocabulary
    #[serde(default)]
    pub standard: bool,
    /// Value constraints on the events this criterion matches
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl SearchParameter {
    /// Leaf parameter with the given coordinates
    pub fn new(domain: Domain, criteria_type: CriteriaType) -> Self {
        Self {
            domain,
            criteria_type,
            concept_id: None,
            group: false,
            standard: false,
            attributes: Vec::new(),
        }
    }

    /// Set the concept id
    pub fn concept_id(mut self, id: i64) -> Self {
        self.concept_id = Some(id);
        self
    }

    /// Mark as a group criterion
    pub fn group(mut self, group: bool) -> Self {
        self.group = group;
        self
    }

    /// Mark as standard-vocabulary coded
    pub fn standard(mut self, standard: bool) -> Self {
        self.standard = standard;
        self
    }

    /// Attach a value attribute
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Value constraint attached to one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Which value the constraint applies to
    pub name: AttrName,
    /// Comparison operator
    pub operator: Operator,
    /// Operand list; arity depends on the operator
    #[serde(default)]
    pub operands: Vec<String>,
}

impl Attribute {
    /// Build an attribute
    pub fn new(name: AttrName, operator: Operator, operands: Vec<&str>) -> Self {
        Self {
            name,
            operator,
            operands: operands.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Constraint applied to a whole search group item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    /// Which aspect of the matched events the constraint applies to
    pub name: ModifierName,
    /// Comparison operator
    pub operator: Operator,
    /// Operand list; arity depends on the operator
    #[serde(default)]
    pub operands: Vec<String>,
}

impl Modifier {
    /// Build a modifier
    pub fn new(name: ModifierName, operator: Operator, operands: Vec<&str>) -> Self {
        Self {
            name,
            operator,
            operands: operands.into_iter().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_from_camel_case_wire_form() {
        let req: SearchRequest = serde_json::from_str(
            r#"{
              "includes": [{
                "items": [{
                  "searchParameters": [{
                    "domain": "CONDITION",
                    "type": "ICD9CM",
                    "conceptId": 772,
                    "group": false,
                    "standard": false
                  }],
                  "modifiers": [{
                    "name": "NUM_OF_OCCURRENCES",
                    "operator": "GREATER_THAN_OR_EQUAL_TO",
                    "operands": ["2"]
                  }]
                }]
              }],
              "dataFilters": ["has_ehr_data"]
            }"#,
        )
        .unwrap();

        assert_eq!(req.includes.len(), 1);
        assert_eq!(req.excludes.len(), 0);
        assert_eq!(req.data_filters, vec!["has_ehr_data"]);
        let param = &req.includes[0].items[0].search_parameters[0];
        assert_eq!(param.criteria_type, CriteriaType::Icd9cm);
        assert_eq!(param.concept_id, Some(772));
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let req: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(req.includes.is_empty());
        assert!(req.excludes.is_empty());
        assert!(req.data_filters.is_empty());
    }
}
