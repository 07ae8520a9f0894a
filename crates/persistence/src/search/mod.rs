//! Query-string filtering and query planning.
//!
//! This module turns untrusted query strings into storage-agnostic plans:
//!
//! - [`filter_parser`] - Parses `key=value` pairs into [`Filter`](crate::types::Filter)s
//! - [`coercion`] - Coerces raw values to schema [`FieldType`](crate::types::FieldType)s
//! - [`query_builder`] - Folds filters into an immutable [`QueryPlan`](crate::types::QueryPlan)
//! - [`evaluator`] - Evaluates plan predicates against JSON rows
//!
//! # Request Flow
//!
//! ```text
//! query string ──► FilterParser ──► Vec<Filter>
//!                                       │
//! AccessScope ───────────────────────► QueryPlanBuilder ──► QueryPlan ──► storage adapter
//! ```
//!
//! # Example
//!
//! ```
//! use taskdesk_persistence::search::{FilterParser, QueryPlanBuilder};
//! use taskdesk_persistence::tenant::{AccessScope, GroupId};
//! use taskdesk_persistence::types::{FieldType, Schema};
//!
//! let schema = Schema::new()
//!     .field("title", FieldType::String)
//!     .field("group_id", FieldType::String);
//! let filters = FilterParser::with_schema(&schema)
//!     .parse("title_startswith=Q&orderby=-title")
//!     .unwrap();
//! let scope: AccessScope = [GroupId::new("g-1")].into_iter().collect();
//!
//! let plan = QueryPlanBuilder::for_schema("task", &schema)
//!     .from_filters(filters)
//!     .restrict_to_scope("group_id", &scope)
//!     .build();
//!
//! assert_eq!(plan.predicates().len(), 2);
//! assert_eq!(plan.order().len(), 1);
//! ```

pub mod coercion;
pub mod evaluator;
pub mod filter_parser;
pub mod query_builder;

// Re-export main types
pub use coercion::{coerce_for_filter, is_null_sentinel, parse_datetime, try_coerce};
pub use evaluator::{compare_json, compare_value, lookup};
pub use filter_parser::{FilterParser, parse_filters};
pub use query_builder::QueryPlanBuilder;
