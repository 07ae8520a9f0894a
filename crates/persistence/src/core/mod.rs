//! Core storage traits.
//!
//! This module provides the seams between the pure core and storage adapters:
//!
//! - [`RoleStore`] - Loads the role graph slice the access resolver needs
//! - [`PlanExecutor`] - Runs a [`QueryPlan`](crate::types::QueryPlan)
//!
//! Parsing, planning and access evaluation are synchronous; only these
//! traits perform I/O.
//!
//! ```text
//! AccessScopeResolver ──► RoleStore      (roles, role types, rights)
//! QueryPlanBuilder ─────► PlanExecutor   (rows or affected count)
//! ```
//!
//! See [`backends::memory`](crate::backends::memory) for the reference
//! implementations.

pub mod executor;
pub mod role_store;

// Re-export main types
pub use executor::{PlanExecutor, PlanOutcome};
pub use role_store::RoleStore;
