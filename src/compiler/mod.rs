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

//! Search request compiler
//!
//! Translates a [`SearchRequest`] into a backend-neutral
//! [`FilterExpression`]. Pure aside from resolver lookups: the compiler
//! holds no state across calls and never mutates its input.
//!
//! Include groups are ANDed; the items (and parameters) inside a group are
//! ORed; every nested-event parameter is wrapped in an occurrence threshold
//! so that "N or more qualifying events" is a single evaluable predicate.

pub mod age;

use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::elastic::document::{self, event_field};
use crate::error::{CohortSearchError, Result};
use crate::filter::{FilterExpression, ScalarValue};
use crate::model::{
    AttrName, Attribute, CriteriaType, Domain, Modifier, ModifierName, Operator, SearchGroup,
    SearchGroupItem, SearchParameter, SearchRequest,
};
use crate::resolver::CriteriaResolver;

use age::birth_date_range;

/// Person-level criteria types and the flat schema field each one matches
static PERSON_FIELDS: Lazy<FxHashMap<CriteriaType, &'static str>> = Lazy::new(|| {
    let mut fields = FxHashMap::default();
    fields.insert(CriteriaType::Gender, document::GENDER_CONCEPT_ID);
    fields.insert(CriteriaType::Race, document::RACE_CONCEPT_ID);
    fields.insert(CriteriaType::Ethnicity, document::ETHNICITY_CONCEPT_ID);
    fields
});

/// Compile a search request against today's date.
///
/// Deterministic for a fixed date and resolver; see [`compile_at`] for the
/// date-injected form used by age-arithmetic tests.
pub fn compile(
    request: &SearchRequest,
    resolver: &dyn CriteriaResolver,
) -> Result<FilterExpression> {
    compile_at(request, resolver, Utc::now().date_naive())
}

/// Compile a search request with an explicit "today" anchoring all
/// age-to-date arithmetic.
pub fn compile_at(
    request: &SearchRequest,
    resolver: &dyn CriteriaResolver,
    today: NaiveDate,
) -> Result<FilterExpression> {
    let mut clauses = Vec::new();
    for group in &request.includes {
        clauses.push(compile_group(group, resolver, today)?);
    }
    for group in &request.excludes {
        let compiled = compile_group(group, resolver, today)?;
        // Excluded groups negate only when includes are present; an
        // excludes-only request compiles like an includes request. Saved
        // cohort definitions depend on this quirk; see DESIGN.md before
        // changing it.
        if request.includes.is_empty() {
            clauses.push(compiled);
        } else {
            clauses.push(FilterExpression::not(compiled));
        }
    }
    for flag in &request.data_filters {
        clauses.push(FilterExpression::term(
            flag.clone(),
            vec![ScalarValue::Bool(true)],
        ));
    }
    Ok(FilterExpression::and(clauses))
}

/// A group is the OR of the clauses contributed by its items; each
/// parameter of an item contributes one clause of its own, so occurrence
/// thresholds apply per criterion rather than across the whole item.
fn compile_group(
    group: &SearchGroup,
    resolver: &dyn CriteriaResolver,
    today: NaiveDate,
) -> Result<FilterExpression> {
    let mut alternatives = Vec::new();
    for item in &group.items {
        compile_item(&mut alternatives, item, resolver, today)?;
    }
    Ok(FilterExpression::or(alternatives))
}

fn compile_item(
    alternatives: &mut Vec<FilterExpression>,
    item: &SearchGroupItem,
    resolver: &dyn CriteriaResolver,
    today: NaiveDate,
) -> Result<()> {
    // Modifiers apply to every parameter of the item and are re-applied
    // inside each per-parameter clause.
    let mut min_occurrences = 1;
    let mut modifier_filters = Vec::new();
    for modifier in &item.modifiers {
        match modifier.name {
            ModifierName::NumOfOccurrences => {
                min_occurrences = occurrence_threshold(modifier)?;
            }
            ModifierName::EventDate | ModifierName::AgeAtEvent => {
                modifier_filters.push(date_modifier_filter(modifier)?);
            }
            ModifierName::Encounters => {
                modifier_filters.push(FilterExpression::term(
                    event_field(document::VISIT_CONCEPT_ID),
                    modifier
                        .operands
                        .iter()
                        .map(|operand| ScalarValue::Str(operand.clone()))
                        .collect(),
                ));
            }
        }
    }

    for param in &item.search_parameters {
        let leaf_ids = leaf_concept_ids(param, resolver)?;
        let mut conjuncts = Vec::new();
        if leaf_ids.is_empty() {
            // No concepts to match; the criterion is the schema-level
            // deceased flag (true only for DECEASED itself).
            conjuncts.push(FilterExpression::term(
                document::IS_DECEASED,
                vec![ScalarValue::Bool(param.criteria_type == CriteriaType::Deceased)],
            ));
        } else {
            conjuncts.push(FilterExpression::term(
                concept_field(param)?,
                leaf_ids
                    .iter()
                    .map(|id| ScalarValue::Str(id.to_string()))
                    .collect(),
            ));
        }
        for attribute in &param.attributes {
            conjuncts.push(attribute_filter(attribute, param, today)?);
        }
        conjuncts.extend(modifier_filters.iter().cloned());

        if param.domain == Domain::Person {
            alternatives.push(FilterExpression::and(conjuncts));
        } else {
            alternatives.push(FilterExpression::nested_threshold(
                document::EVENTS,
                FilterExpression::and(conjuncts),
                min_occurrences,
            ));
        }
    }
    Ok(())
}

/// Field holding the concept ids this parameter matches against
fn concept_field(param: &SearchParameter) -> Result<String> {
    if param.domain == Domain::Person {
        return PERSON_FIELDS
            .get(&param.criteria_type)
            .map(|field| (*field).to_string())
            .ok_or_else(|| CohortSearchError::UnsupportedCriteria {
                criteria_type: param.criteria_type.to_string(),
            });
    }
    Ok(event_field(if param.standard {
        document::CONCEPT_ID
    } else {
        document::SOURCE_CONCEPT_ID
    }))
}

/// Resolve the set of leaf concept ids a parameter stands for
fn leaf_concept_ids(
    param: &SearchParameter,
    resolver: &dyn CriteriaResolver,
) -> Result<BTreeSet<i64>> {
    let mut ids = BTreeSet::new();
    if param.group {
        if param.criteria_type == CriteriaType::Snomed {
            // SNOMED concepts are poly-hierarchical; the request does not
            // carry enough information to pick the criteria subtree, so a
            // SNOMED group indicates a client bug.
            log::warn!("received a SNOMED group criterion in a search request");
            return Err(CohortSearchError::InvalidCriteriaGroup {
                criteria_type: param.criteria_type.to_string(),
            });
        }
        ids.extend(resolver.expand(param)?);
    }
    if let Some(concept_id) = param.concept_id {
        // Not every parameter has a concept id; attributes and modifiers
        // carry the match in those cases.
        ids.insert(concept_id);
    }
    Ok(ids)
}

fn attribute_filter(
    attribute: &Attribute,
    param: &SearchParameter,
    today: NaiveDate,
) -> Result<FilterExpression> {
    match attribute.name {
        AttrName::Cat => {
            // Survey answers match against the source value concept; every
            // other domain stores the standard one.
            let field = if param.domain == Domain::Survey {
                document::VALUE_AS_SOURCE_CONCEPT_ID
            } else {
                document::VALUE_AS_CONCEPT_ID
            };
            Ok(FilterExpression::term(
                event_field(field),
                attribute
                    .operands
                    .iter()
                    .map(|operand| ScalarValue::Str(operand.clone()))
                    .collect(),
            ))
        }
        AttrName::Num => {
            let construct = attr_construct(attribute);
            let lo = ScalarValue::Float(parse_operand(&construct, attribute.operands.first())?);
            let range = FilterExpression::range(event_field(document::VALUE_AS_NUMBER));
            Ok(match attribute.operator {
                Operator::LessThanOrEqualTo => range.lte(lo).build(),
                Operator::GreaterThanOrEqualTo => range.gte(lo).build(),
                Operator::Equal => range.gte(lo.clone()).lte(lo).build(),
                Operator::Between => {
                    let hi =
                        ScalarValue::Float(parse_operand(&construct, attribute.operands.get(1))?);
                    range.gte(lo).lte(hi).build()
                }
                other => return Err(unsupported_operator(&construct, other)),
            })
        }
        AttrName::Age => {
            let construct = attr_construct(attribute);
            if attribute.operator != Operator::Between {
                return Err(unsupported_operator(&construct, attribute.operator));
            }
            let lo_age = parse_operand(&construct, attribute.operands.first())?;
            let hi_age = attribute
                .operands
                .get(1)
                .map(|operand| parse_operand(&construct, Some(operand)))
                .transpose()?;
            let window = birth_date_range(today, lo_age, hi_age);
            let mut range = FilterExpression::range(document::BIRTH_DATETIME)
                .lte(ScalarValue::Date(window.hi_inclusive));
            if let Some(lo_date) = window.lo_exclusive {
                range = range.gt(ScalarValue::Date(lo_date));
            }
            Ok(range.build())
        }
        AttrName::AgeAtConsent | AttrName::AgeAtCdr => {
            let construct = attr_construct(attribute);
            if attribute.operator != Operator::Between {
                return Err(unsupported_operator(&construct, attribute.operator));
            }
            let lo = ScalarValue::Int(parse_operand(&construct, attribute.operands.first())?);
            let hi = ScalarValue::Int(parse_operand(&construct, attribute.operands.get(1))?);
            let field = if attribute.name == AttrName::AgeAtConsent {
                document::AGE_AT_CONSENT
            } else {
                document::AGE_AT_CDR
            };
            Ok(FilterExpression::range(field).gte(lo).lte(hi).build())
        }
    }
}

fn date_modifier_filter(modifier: &Modifier) -> Result<FilterExpression> {
    let construct = format!("{} modifier", modifier.name);
    let (field, lo, hi) = match modifier.name {
        ModifierName::EventDate => (
            event_field(document::START_DATE),
            // Event dates pass through as-is; the store parses them.
            ScalarValue::Str(required_operand(&construct, modifier.operands.first())?.clone()),
            modifier.operands.get(1).cloned().map(ScalarValue::Str),
        ),
        ModifierName::AgeAtEvent => (
            event_field(document::AGE_AT_START),
            ScalarValue::Int(parse_operand(&construct, modifier.operands.first())?),
            match modifier.operands.get(1) {
                Some(operand) => Some(ScalarValue::Int(parse_operand(
                    &construct,
                    Some(operand),
                )?)),
                None => None,
            },
        ),
        _ => unreachable!("only date-valued modifiers reach this point"),
    };

    let range = FilterExpression::range(field);
    Ok(match modifier.operator {
        Operator::LessThan => range.lt(lo).build(),
        Operator::GreaterThan => range.gt(lo).build(),
        Operator::LessThanOrEqualTo => range.lte(lo).build(),
        Operator::GreaterThanOrEqualTo => range.gte(lo).build(),
        Operator::Between => {
            let hi = hi.ok_or_else(|| CohortSearchError::InvalidOperand {
                construct: construct.clone(),
                operand: "<missing>".into(),
            })?;
            range.gte(lo).lte(hi).build()
        }
        other => return Err(unsupported_operator(&construct, other)),
    })
}

/// NUM_OF_OCCURRENCES takes exactly one positive integer operand
fn occurrence_threshold(modifier: &Modifier) -> Result<u32> {
    let construct = format!("{} modifier", ModifierName::NumOfOccurrences);
    let [operand] = modifier.operands.as_slice() else {
        return Err(CohortSearchError::InvalidOperand {
            construct,
            operand: modifier.operands.join(", "),
        });
    };
    parse_operand(&construct, Some(operand))
}

fn attr_construct(attribute: &Attribute) -> String {
    format!("{} attribute", attribute.name)
}

fn unsupported_operator(construct: &str, operator: Operator) -> CohortSearchError {
    CohortSearchError::UnsupportedOperator {
        construct: construct.to_string(),
        operator: operator.to_string(),
    }
}

fn required_operand<'a>(construct: &str, operand: Option<&'a String>) -> Result<&'a String> {
    operand.ok_or_else(|| CohortSearchError::InvalidOperand {
        construct: construct.to_string(),
        operand: "<missing>".into(),
    })
}

fn parse_operand<T: FromStr>(construct: &str, operand: Option<&String>) -> Result<T>
where
    T::Err: Display,
{
    let operand = required_operand(construct, operand)?;
    operand
        .parse()
        .map_err(|_| CohortSearchError::InvalidOperand {
            construct: construct.to_string(),
            operand: operand.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticCriteriaResolver;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn condition_leaf(concept_id: i64) -> SearchParameter {
        SearchParameter::new(Domain::Condition, CriteriaType::Icd9cm).concept_id(concept_id)
    }

    #[test]
    fn test_occurrence_threshold_requires_single_operand() {
        let err = occurrence_threshold(&Modifier::new(
            ModifierName::NumOfOccurrences,
            Operator::GreaterThanOrEqualTo,
            vec!["1", "2"],
        ))
        .unwrap_err();
        assert!(matches!(err, CohortSearchError::InvalidOperand { .. }));
    }

    #[test]
    fn test_duplicate_occurrence_modifiers_last_wins() {
        let item = SearchGroupItem::of(vec![condition_leaf(772)])
            .with_modifier(Modifier::new(
                ModifierName::NumOfOccurrences,
                Operator::GreaterThanOrEqualTo,
                vec!["2"],
            ))
            .with_modifier(Modifier::new(
                ModifierName::NumOfOccurrences,
                Operator::GreaterThanOrEqualTo,
                vec!["5"],
            ));
        let request = SearchRequest::includes(vec![SearchGroup::of(vec![item])]);
        let expr = compile_at(&request, &StaticCriteriaResolver::new(), today()).unwrap();

        let FilterExpression::And(clauses) = &expr else {
            panic!("expected top-level conjunction");
        };
        let FilterExpression::Or(alternatives) = &clauses[0] else {
            panic!("expected group disjunction");
        };
        let FilterExpression::NestedThreshold {
            min_occurrences, ..
        } = &alternatives[0]
        else {
            panic!("expected occurrence threshold");
        };
        assert_eq!(*min_occurrences, 5);
    }

    #[test]
    fn test_snomed_group_is_rejected() {
        let param = SearchParameter::new(Domain::Condition, CriteriaType::Snomed)
            .concept_id(477)
            .group(true);
        let request =
            SearchRequest::includes(vec![SearchGroup::of(vec![SearchGroupItem::of(vec![param])])]);
        let err = compile_at(&request, &StaticCriteriaResolver::new(), today()).unwrap_err();
        assert_eq!(
            err,
            CohortSearchError::InvalidCriteriaGroup {
                criteria_type: "SNOMED".into()
            }
        );
    }

    #[test]
    fn test_group_expansion_renders_sorted_concept_ids() {
        let resolver = StaticCriteriaResolver::new().with_children(771, [773, 772]);
        let param = SearchParameter::new(Domain::Condition, CriteriaType::Icd9cm)
            .concept_id(771)
            .group(true);
        let request =
            SearchRequest::includes(vec![SearchGroup::of(vec![SearchGroupItem::of(vec![param])])]);
        let expr = compile_at(&request, &resolver, today()).unwrap();

        let expected = FilterExpression::term(
            "events.source_concept_id",
            vec!["771".into(), "772".into(), "773".into()],
        );
        let FilterExpression::And(clauses) = &expr else {
            panic!("expected top-level conjunction");
        };
        let FilterExpression::Or(alternatives) = &clauses[0] else {
            panic!("expected group disjunction");
        };
        let FilterExpression::NestedThreshold { predicate, .. } = &alternatives[0] else {
            panic!("expected occurrence threshold");
        };
        let FilterExpression::And(conjuncts) = predicate.as_ref() else {
            panic!("expected predicate conjunction");
        };
        assert_eq!(conjuncts[0], expected);
    }

    #[test]
    fn test_num_attribute_rejects_like_operator() {
        let param = condition_leaf(772).attribute(Attribute::new(
            AttrName::Num,
            Operator::Like,
            vec!["1"],
        ));
        let request =
            SearchRequest::includes(vec![SearchGroup::of(vec![SearchGroupItem::of(vec![param])])]);
        let err = compile_at(&request, &StaticCriteriaResolver::new(), today()).unwrap_err();
        assert_eq!(
            err,
            CohortSearchError::UnsupportedOperator {
                construct: "NUM attribute".into(),
                operator: "LIKE".into()
            }
        );
    }

    #[test]
    fn test_num_attribute_rejects_non_numeric_operand() {
        let param = condition_leaf(772).attribute(Attribute::new(
            AttrName::Num,
            Operator::Equal,
            vec!["tall"],
        ));
        let request =
            SearchRequest::includes(vec![SearchGroup::of(vec![SearchGroupItem::of(vec![param])])]);
        let err = compile_at(&request, &StaticCriteriaResolver::new(), today()).unwrap_err();
        assert_eq!(
            err,
            CohortSearchError::InvalidOperand {
                construct: "NUM attribute".into(),
                operand: "tall".into()
            }
        );
    }

    #[test]
    fn test_person_criteria_without_field_mapping_is_rejected() {
        let param =
            SearchParameter::new(Domain::Person, CriteriaType::Deceased).concept_id(123);
        let request =
            SearchRequest::includes(vec![SearchGroup::of(vec![SearchGroupItem::of(vec![param])])]);
        let err = compile_at(&request, &StaticCriteriaResolver::new(), today()).unwrap_err();
        assert_eq!(
            err,
            CohortSearchError::UnsupportedCriteria {
                criteria_type: "DECEASED".into()
            }
        );
    }

    #[test]
    fn test_age_at_consent_requires_between() {
        let param = SearchParameter::new(Domain::Person, CriteriaType::Age).attribute(
            Attribute::new(AttrName::AgeAtConsent, Operator::Equal, vec!["30"]),
        );
        let request =
            SearchRequest::includes(vec![SearchGroup::of(vec![SearchGroupItem::of(vec![param])])]);
        let err = compile_at(&request, &StaticCriteriaResolver::new(), today()).unwrap_err();
        assert_eq!(
            err,
            CohortSearchError::UnsupportedOperator {
                construct: "AGE_AT_CONSENT attribute".into(),
                operator: "EQUAL".into()
            }
        );
    }
}
