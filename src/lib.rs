//! Cohort search criteria compiler
//!
//! Translates structured cohort-builder search requests into
//! backend-neutral filter expressions over per-person documents with
//! nested clinical events, realizes them as executable queries for a
//! nested-document search engine, and plans the demographic breakdown
//! aggregations that ride along with a cohort count.

pub mod compiler;
pub mod elastic;
pub mod error;
pub mod filter;
pub mod model;
pub mod resolver;

// Re-export main types
pub use compiler::{compile, compile_at};
pub use elastic::{
    DemoChartInfo, EventDocument, PersonDocument, demo_chart_buckets, demo_chart_buckets_at,
    realize, unwrap_demo_buckets,
};
pub use error::{CohortSearchError, Result};
pub use filter::{FilterExpression, ScalarValue};
pub use model::{
    AttrName, Attribute, CriteriaType, Domain, Modifier, ModifierName, Operator, SearchGroup,
    SearchGroupItem, SearchParameter, SearchRequest,
};
pub use resolver::{CriteriaResolver, StaticCriteriaResolver};
