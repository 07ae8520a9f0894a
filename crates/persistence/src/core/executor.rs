//! Plan execution trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageResult;
use crate::types::QueryPlan;

/// Result of executing a [`QueryPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "lowercase")]
pub enum PlanOutcome {
    /// Rows returned by a select plan, in plan order.
    Rows(Vec<Value>),
    /// Number of rows changed by an update or delete plan.
    Affected(u64),
}

impl PlanOutcome {
    /// Returns the rows of a select outcome.
    pub fn rows(&self) -> Option<&[Value]> {
        match self {
            PlanOutcome::Rows(rows) => Some(rows),
            PlanOutcome::Affected(_) => None,
        }
    }

    /// Returns the affected count of an update or delete outcome.
    pub fn affected(&self) -> Option<u64> {
        match self {
            PlanOutcome::Rows(_) => None,
            PlanOutcome::Affected(n) => Some(*n),
        }
    }
}

/// Executes storage-agnostic plans against one entity store.
#[async_trait]
pub trait PlanExecutor: Send + Sync {
    /// Returns a short name for logs and errors.
    fn backend_name(&self) -> &'static str;

    /// Executes the plan.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnsupportedCapability`](crate::error::BackendError::UnsupportedCapability)
    /// when the plan uses a feature the backend cannot run (for example joins).
    async fn execute(&self, plan: &QueryPlan) -> StorageResult<PlanOutcome>;
}
