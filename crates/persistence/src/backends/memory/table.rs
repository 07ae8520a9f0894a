//! In-memory [`PlanExecutor`] over JSON rows.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Number, Value};

use crate::core::{PlanExecutor, PlanOutcome};
use crate::error::{BackendError, StorageResult, ValidationError};
use crate::search::compare_json;
use crate::search::lookup;
use crate::types::{Assignment, FilterValue, PlanKind, QueryPlan, SortDirection};

const BACKEND_NAME: &str = "memory";

/// The rows of one entity, kept in insertion order.
#[derive(Debug)]
pub struct MemoryTable {
    entity: String,
    rows: RwLock<Vec<Value>>,
}

impl MemoryTable {
    /// Creates an empty table for `entity`.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Creates a table holding `rows`.
    pub fn with_rows(entity: impl Into<String>, rows: impl IntoIterator<Item = Value>) -> Self {
        Self {
            entity: entity.into(),
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }

    /// The entity name plans must target.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Appends a row.
    pub fn insert(&self, row: Value) {
        self.rows.write().push(row);
    }

    /// Returns a copy of all rows.
    pub fn rows(&self) -> Vec<Value> {
        self.rows.read().clone()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns `true` if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn select(&self, plan: &QueryPlan) -> Vec<Value> {
        let rows = self.rows.read();
        let mut selected: Vec<&Value> = rows.iter().filter(|row| matches_all(plan, row)).collect();

        if !plan.order().is_empty() {
            // Stable sort keeps insertion order among equal keys
            selected.sort_by(|a, b| {
                plan.order()
                    .iter()
                    .map(|order| {
                        let ordering = compare_json(lookup(a, &order.field), lookup(b, &order.field));
                        match order.direction {
                            SortDirection::Ascending => ordering,
                            SortDirection::Descending => ordering.reverse(),
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let window = plan.window().unwrap_or_default();
        selected
            .into_iter()
            .skip(usize::try_from(window.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn update(&self, plan: &QueryPlan) -> u64 {
        let mut rows = self.rows.write();
        let mut affected = 0;
        for row in rows.iter_mut().filter(|row| matches_all(plan, row)) {
            for assignment in plan.assignments() {
                assign(row, assignment);
            }
            affected += 1;
        }
        affected
    }

    fn delete(&self, plan: &QueryPlan) -> u64 {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|row| !matches_all(plan, row));
        (before - rows.len()) as u64
    }
}

#[async_trait]
impl PlanExecutor for MemoryTable {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn execute(&self, plan: &QueryPlan) -> StorageResult<PlanOutcome> {
        if plan.entity() != self.entity {
            return Err(ValidationError::NotFound {
                entity: "entity".to_string(),
                id: plan.entity().to_string(),
            }
            .into());
        }
        if !plan.joins().is_empty() {
            return Err(BackendError::UnsupportedCapability {
                backend_name: BACKEND_NAME.to_string(),
                capability: "joins".to_string(),
            }
            .into());
        }

        tracing::debug!("Executing on {}: {}", BACKEND_NAME, plan);

        let outcome = match plan.kind() {
            PlanKind::Select => PlanOutcome::Rows(self.select(plan)),
            PlanKind::Update => PlanOutcome::Affected(self.update(plan)),
            PlanKind::Delete => PlanOutcome::Affected(self.delete(plan)),
        };
        Ok(outcome)
    }
}

fn matches_all(plan: &QueryPlan, row: &Value) -> bool {
    plan.predicates().iter().all(|p| p.matches(row))
}

/// Writes an assignment, creating intermediate objects for dotted paths.
fn assign(row: &mut Value, assignment: &Assignment) {
    let mut target = row;
    let mut segments = assignment.field.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Value::Object(map) = target else {
            tracing::warn!("Cannot assign {}: not an object", assignment.field);
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), to_json(&assignment.value));
            return;
        }
        target = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn to_json(value: &FilterValue) -> Value {
    match value {
        FilterValue::Null => Value::Null,
        FilterValue::Int(n) => Value::from(*n),
        FilterValue::Float(x) => Number::from_f64(*x).map_or(Value::Null, Value::Number),
        FilterValue::Bool(b) => Value::Bool(*b),
        FilterValue::Duration(d) => Value::from(d.num_seconds()),
        other => Value::String(other.to_string()),
    }
}
