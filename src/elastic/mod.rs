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

//! Nested-document backend: schema, query realizer, aggregations

pub mod aggregation;
pub mod document;
pub mod matcher;
pub mod query;

pub use aggregation::{DemoChartInfo, demo_chart_buckets, demo_chart_buckets_at, unwrap_demo_buckets};
pub use document::{EventDocument, PersonDocument};
pub use matcher::matches;
pub use query::realize;
