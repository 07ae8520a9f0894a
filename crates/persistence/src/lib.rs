//! TaskDesk Persistence Core
//!
//! This crate provides the storage-facing core of the TaskDesk multi-tenant
//! task backend: it turns untrusted query strings into typed filters, folds
//! them into storage-agnostic query plans, and decides which tenant groups a
//! user may touch.
//!
//! # Features
//!
//! - **Filter parsing**: `field_operator=value` query strings with schema-driven coercion
//! - **Query plans**: Immutable select/update/delete plans with ordering and paging
//! - **Permissions**: Wire-stable permission bit sets per resource
//! - **Tenant access**: Role-based access checks over groups, with global role types
//!
//! # Backend Features
//!
//! - `memory` (default) - In-memory role store and plan executor
//!
//! # Architecture
//!
//! - [`types`] - Filters, schemas, query plans and paging
//! - [`search`] - Filter parser, query-plan builder and row evaluator
//! - [`tenant`] - Permissions, the role graph and the access resolver
//! - [`core`] - Storage traits the pure core talks through
//! - [`backends`] - Backend implementations
//! - [`config`] - Paging configuration
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use taskdesk_persistence::search::{FilterParser, QueryPlanBuilder};
//! use taskdesk_persistence::types::{FieldType, Schema};
//!
//! let schema = Schema::new()
//!     .field("title", FieldType::String)
//!     .field("age", FieldType::Int);
//!
//! let filters = FilterParser::with_schema(&schema)
//!     .parse("age_gte=18&title_contains=report&page=2")
//!     .unwrap();
//!
//! let plan = QueryPlanBuilder::for_schema("task", &schema)
//!     .from_filters(filters)
//!     .build();
//!
//! assert_eq!(plan.predicates().len(), 2);
//! assert_eq!(plan.window().unwrap().offset, 20);
//! ```
//!
//! # Multitenancy
//!
//! Rows belong to groups. Before planning a read, resolve the groups the
//! caller may read and restrict the plan to them:
//!
//! ```
//! use std::sync::Arc;
//! use taskdesk_persistence::backends::memory::MemoryRoleStore;
//! use taskdesk_persistence::search::QueryPlanBuilder;
//! use taskdesk_persistence::tenant::{
//!     AccessScopeResolver, GroupId, Permission, Resource, Right, Role, RoleType, UserId,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryRoleStore::new());
//! let acme = GroupId::new("acme");
//! let member = RoleType::scoped("member", acme.clone());
//! store.add_right(Right::new(member.id.clone(), Resource::Task, Permission::READ))?;
//! store.add_role(Role::new(UserId::new("alice"), acme.clone(), member.id.clone()))?;
//! store.add_role_type(member)?;
//!
//! let resolver = AccessScopeResolver::new(store);
//! let scope = resolver
//!     .all_tenants_with_access(Permission::READ, &UserId::new("alice"), Resource::Task)
//!     .await?;
//!
//! let plan = QueryPlanBuilder::new("task", ["title", "group_id"])
//!     .restrict_to_scope("group_id", &scope)
//!     .build();
//! assert_eq!(plan.to_string(), "SELECT task WHERE (group_id IN (acme)) LIMIT 20 OFFSET 0");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod search;
pub mod tenant;
pub mod types;

// Re-export commonly used types at crate root
pub use config::PlanConfig;
pub use error::{StorageError, StorageResult};
pub use search::{FilterParser, QueryPlanBuilder};
pub use tenant::{AccessScope, AccessScopeResolver, Permission, Resource};
pub use types::{Filter, FilterValue, QueryPlan, Schema};

// Re-export core traits
pub use core::{PlanExecutor, RoleStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
