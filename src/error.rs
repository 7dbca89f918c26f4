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

//! Error types for cohort search compilation
//!
//! All malformed-input errors are terminal for the compile call that raised
//! them and name the offending construct; there is no partial result.

use thiserror::Error;

/// Result type alias for cohort search operations
pub type Result<T> = std::result::Result<T, CohortSearchError>;

/// Error type covering request compilation and criteria resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CohortSearchError {
    /// An operator applied to a construct that does not support it
    #[error("Bad operator for {construct}: {operator}")]
    UnsupportedOperator {
        /// The attribute or modifier the operator was applied to
        construct: String,
        /// Wire name of the rejected operator
        operator: String,
    },

    /// An operand that is missing or failed to parse for its target type
    #[error("Bad operand for {construct}: {operand}")]
    InvalidOperand {
        /// The attribute or modifier carrying the operand
        construct: String,
        /// The offending operand text
        operand: String,
    },

    /// A group criterion that cannot be expanded into leaf concepts
    #[error("Invalid criteria group of type {criteria_type}")]
    InvalidCriteriaGroup {
        /// Wire name of the criteria type
        criteria_type: String,
    },

    /// A criteria type that has no person-level field mapping
    #[error("Unsupported person-level criteria type: {criteria_type}")]
    UnsupportedCriteria {
        /// Wire name of the criteria type
        criteria_type: String,
    },

    /// Failure propagated from the injected criteria resolver
    #[error("Criteria resolution failed: {message}")]
    Resolver {
        /// Human-readable description of the resolver failure
        message: String,
    },
}

impl CohortSearchError {
    /// Create a resolver failure error
    pub fn resolver(message: impl Into<String>) -> Self {
        Self::Resolver {
            message: message.into(),
        }
    }

    /// True for errors caused by malformed caller input, as opposed to
    /// resolver failures
    pub fn is_bad_request(&self) -> bool {
        !matches!(self, Self::Resolver { .. })
    }
}
