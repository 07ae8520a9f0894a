//! In-memory backend.
//!
//! [`MemoryRoleStore`] keeps a [`RoleGraph`](crate::tenant::RoleGraph) behind a
//! lock and answers [`RoleStore`](crate::core::RoleStore) queries from it.
//! [`MemoryTable`] holds the JSON rows of one entity and runs
//! [`QueryPlan`](crate::types::QueryPlan)s against them.
//!
//! Both are cheap to construct and need no setup, which makes them the
//! backend of choice for tests.
//!
//! # Example
//!
//! ```
//! use taskdesk_persistence::backends::memory::MemoryTable;
//! use taskdesk_persistence::core::PlanExecutor;
//! use taskdesk_persistence::search::{QueryPlanBuilder, parse_filters};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let table = MemoryTable::new("task");
//! table.insert(json!({"title": "a", "age": 17}));
//! table.insert(json!({"title": "b", "age": 30}));
//!
//! let plan = QueryPlanBuilder::new("task", ["title", "age"])
//!     .from_filters(parse_filters("age_gte=18", None).unwrap())
//!     .build();
//!
//! let outcome = table.execute(&plan).await.unwrap();
//! assert_eq!(outcome.rows().unwrap().len(), 1);
//! # }
//! ```

mod role_store;
mod table;

pub use role_store::MemoryRoleStore;
pub use table::MemoryTable;
