//! Core types for the persistence layer.
//!
//! This module provides the fundamental types used throughout the persistence layer:
//!
//! - [`Operation`] - The closed filter operator vocabulary and reserved keys
//! - [`Filter`], [`FilterValue`] - Parsed `(field, operation, value)` triples
//! - [`Schema`], [`FieldType`] - Declared field types used for coercion
//! - [`QueryPlan`], [`Predicate`] - Storage-agnostic query plans
//! - [`PageWindow`] - Effective `(offset, limit)` of a select plan
//!
//! # Examples
//!
//! ## Declaring a Schema
//!
//! ```
//! use taskdesk_persistence::types::{FieldType, Schema};
//!
//! let schema: Schema = [
//!     ("title", FieldType::String),
//!     ("age", FieldType::Int),
//!     ("valid_until", "datetime?".parse().unwrap()),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(schema.len(), 3);
//! assert!(schema.get("valid_until").unwrap().admits_null());
//! ```

mod filter;
mod operation;
mod pagination;
mod plan;
mod schema;

pub use filter::{Filter, FilterValue};
pub(crate) use filter::parse_bool;
pub use operation::{LIMIT_KEY, OFFSET_KEY, ORDER_BY_KEY, Operation, PAGE_KEY, RESERVED_KEYS};
pub use pagination::{DEFAULT_PAGE_SIZE, PageWindow};
pub use plan::{
    Assignment, CompareOp, Join, OrderBy, PlanKind, Predicate, QueryPlan, SortDirection,
    TextPattern,
};
pub use schema::{FieldType, Schema, SchemaField};
