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

//! Group-criteria expansion
//!
//! The criteria hierarchy lives in a large external table; the compiler only
//! consumes it through this seam. Resolver failures propagate unchanged into
//! compile failures, with no local retry.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::model::SearchParameter;

/// Expansion of a group criterion into its descendant leaf concept ids
pub trait CriteriaResolver {
    /// Return every descendant leaf concept id selectable under the given
    /// group criterion. An empty set is a valid answer, not an error.
    fn expand(&self, param: &SearchParameter) -> Result<BTreeSet<i64>>;
}

/// In-memory resolver backed by a parent-to-leaves map
///
/// Serves the test suite and the CLI; production callers wrap their
/// materialized hierarchy store instead.
#[derive(Debug, Clone, Default)]
pub struct StaticCriteriaResolver {
    children: FxHashMap<i64, BTreeSet<i64>>,
}

impl StaticCriteriaResolver {
    /// Empty resolver; every expansion yields no leaves
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the descendant leaves of a parent concept
    pub fn with_children(mut self, parent: i64, leaves: impl IntoIterator<Item = i64>) -> Self {
        self.children
            .entry(parent)
            .or_default()
            .extend(leaves);
        self
    }
}

impl CriteriaResolver for StaticCriteriaResolver {
    fn expand(&self, param: &SearchParameter) -> Result<BTreeSet<i64>> {
        let Some(concept_id) = param.concept_id else {
            return Ok(BTreeSet::new());
        };
        Ok(self.children.get(&concept_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CriteriaType, Domain};

    #[test]
    fn test_static_resolver_expands_registered_parents() {
        let resolver = StaticCriteriaResolver::new().with_children(771, [772, 773]);
        let param = SearchParameter::new(Domain::Condition, CriteriaType::Icd9cm)
            .concept_id(771)
            .group(true);
        let leaves = resolver.expand(&param).unwrap();
        assert_eq!(leaves.into_iter().collect::<Vec<_>>(), vec![772, 773]);
    }

    #[test]
    fn test_unregistered_parent_expands_to_empty() {
        let resolver = StaticCriteriaResolver::new();
        let param = SearchParameter::new(Domain::Drug, CriteriaType::Atc)
            .concept_id(5)
            .group(true);
        assert!(resolver.expand(&param).unwrap().is_empty());
    }
}
