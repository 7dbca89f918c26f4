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

//! Typed model of the cohort-builder search request DSL
//!
//! The wire format is camelCase JSON authored by the cohort-builder UI; this
//! module is its already-deserialized form. Requests are immutable inputs,
//! owned by the caller for the duration of one compile call.

mod request;
mod types;

pub use request::*;
pub use types::*;
