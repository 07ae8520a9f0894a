//! Composable query-plan builder.
//!
//! [`QueryPlanBuilder`] accumulates parsed [`Filter`]s and direct calls into an
//! immutable [`QueryPlan`]. Building never mutates the builder, so the same
//! builder can produce the same plan any number of times.

use std::collections::HashSet;

use crate::config::PlanConfig;
use crate::tenant::AccessScope;
use crate::types::{
    Assignment, CompareOp, Filter, FilterValue, Join, Operation, OrderBy, PageWindow, PlanKind,
    Predicate, QueryPlan, Schema, TextPattern,
};

/// IN / NIN values collected for one field, merged across filters.
#[derive(Debug, Clone)]
struct Membership {
    field: String,
    negated: bool,
    values: Vec<FilterValue>,
}

/// Builds [`QueryPlan`]s for one entity.
///
/// The builder is bound to the entity's field set: filters on other fields are
/// skipped with a warning. Dotted fields (`project.name`) are accepted once
/// their relation has been joined, so call [`join`](Self::join) before
/// [`from_filters`](Self::from_filters).
///
/// # Examples
///
/// ```
/// use taskdesk_persistence::search::{FilterParser, QueryPlanBuilder};
/// use taskdesk_persistence::types::{FieldType, PageWindow, Schema};
///
/// let schema = Schema::new()
///     .field("title", FieldType::String)
///     .field("age", FieldType::Int);
/// let filters = FilterParser::with_schema(&schema)
///     .parse("age_in=18,19&title_contains=report&page=2")
///     .unwrap();
///
/// let plan = QueryPlanBuilder::for_schema("task", &schema)
///     .select()
///     .from_filters(filters)
///     .build();
///
/// assert_eq!(plan.predicates().len(), 2);
/// assert_eq!(plan.window(), Some(PageWindow::new(20, 20)));
/// ```
#[derive(Debug, Clone)]
pub struct QueryPlanBuilder {
    entity: String,
    fields: HashSet<String>,
    config: PlanConfig,
    kind: PlanKind,
    predicates: Vec<Predicate>,
    memberships: Vec<Membership>,
    order: Vec<OrderBy>,
    joins: Vec<Join>,
    assignments: Vec<Assignment>,
    limit: Option<u64>,
    offset: Option<u64>,
    page: Option<u64>,
}

impl QueryPlanBuilder {
    /// Creates a builder for `entity` with the given field set.
    pub fn new<I, S>(entity: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity: entity.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            config: PlanConfig::default(),
            kind: PlanKind::Select,
            predicates: Vec::new(),
            memberships: Vec::new(),
            order: Vec::new(),
            joins: Vec::new(),
            assignments: Vec::new(),
            limit: None,
            offset: None,
            page: None,
        }
    }

    /// Creates a builder whose field set is the schema's declared fields.
    pub fn for_schema(entity: impl Into<String>, schema: &Schema) -> Self {
        Self::new(entity, schema.field_names())
    }

    /// Replaces the paging configuration.
    pub fn with_config(mut self, config: PlanConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds a select plan.
    pub fn select(mut self) -> Self {
        self.kind = PlanKind::Select;
        self
    }

    /// Builds an update plan.
    pub fn update(mut self) -> Self {
        self.kind = PlanKind::Update;
        self
    }

    /// Builds a delete plan.
    pub fn delete(mut self) -> Self {
        self.kind = PlanKind::Delete;
        self
    }

    /// Assigns a value in an update plan. A later assignment to the same field wins.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.assignments.iter_mut().find(|a| a.field == field) {
            Some(existing) => existing.value = value,
            None => self.assignments.push(Assignment { field, value }),
        }
        self
    }

    /// Adds a predicate. All predicates are combined with AND.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Appends an ORDER BY entry.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    /// Sets an explicit page size.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of rows to skip. Ignored when a page is set.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets a 1-based page number. Takes precedence over [`offset`](Self::offset).
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page.max(1));
        self
    }

    /// Joins a relation, making `relation.field` paths valid.
    pub fn join(self, relation: impl Into<String>) -> Self {
        self.add_join(relation.into(), false)
    }

    /// Joins a relation, keeping rows without a related row.
    pub fn left_join(self, relation: impl Into<String>) -> Self {
        self.add_join(relation.into(), true)
    }

    fn add_join(mut self, relation: String, outer: bool) -> Self {
        if !self.joins.iter().any(|j| j.relation == relation) {
            self.joins.push(Join { relation, outer });
        }
        self
    }

    /// Restricts the plan to rows whose `field` lies in the tenant scope.
    ///
    /// An empty scope yields an empty membership predicate, which matches
    /// nothing.
    pub fn restrict_to_scope(self, field: impl Into<String>, scope: &AccessScope) -> Self {
        let values = scope
            .iter()
            .map(|group| FilterValue::String(group.as_str().to_string()));
        self.filter(Predicate::is_in(field, values))
    }

    /// Folds parsed filters into the plan.
    ///
    /// IN and NIN filters on the same field are merged into one membership
    /// predicate each, emitted after the other predicates. Repeated `limit`,
    /// `offset` or `page` filters overwrite each other.
    pub fn from_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        for filter in filters {
            self.apply_filter(filter);
        }
        self
    }

    fn apply_filter(&mut self, filter: Filter) {
        let operation = filter.operation();

        if operation.is_pagination() {
            self.apply_window(&filter);
            return;
        }

        if !self.knows_field(filter.field()) {
            tracing::warn!(
                "Skipping filter '{}' on entity '{}': unknown field",
                filter,
                self.entity
            );
            return;
        }

        let (field, operation, value) = filter.into_parts();
        if operation.is_ordering() {
            self.order.push(match operation {
                Operation::Desc => OrderBy::desc(field),
                _ => OrderBy::asc(field),
            });
            return;
        }
        if operation.is_membership() {
            self.add_membership(field, operation.is_negated(), value);
            return;
        }

        match operation {
            Operation::IsNull => match value.as_bool() {
                Some(true) => self.predicates.push(Predicate::is_null(field)),
                Some(false) => self.predicates.push(Predicate::is_null(field).negate()),
                None => tracing::warn!(
                    "Skipping {}_isnull: '{}' is not a boolean",
                    field,
                    value
                ),
            },
            Operation::Eq | Operation::Neq if value.is_null() => {
                let predicate = Predicate::is_null(field);
                self.predicates.push(if operation == Operation::Neq {
                    predicate.negate()
                } else {
                    predicate
                });
            }
            Operation::Eq => self.push_compare(field, CompareOp::Eq, value),
            Operation::Neq => self.push_compare(field, CompareOp::Ne, value),
            Operation::Lt => self.push_compare(field, CompareOp::Lt, value),
            Operation::Lte => self.push_compare(field, CompareOp::Le, value),
            Operation::Gt => self.push_compare(field, CompareOp::Gt, value),
            Operation::Gte => self.push_compare(field, CompareOp::Ge, value),
            Operation::Contains | Operation::NContains => {
                self.push_text(field, TextPattern::Contains, value, operation.is_negated())
            }
            Operation::StartsWith | Operation::NStartsWith => {
                self.push_text(field, TextPattern::StartsWith, value, operation.is_negated())
            }
            Operation::EndsWith | Operation::NEndsWith => {
                self.push_text(field, TextPattern::EndsWith, value, operation.is_negated())
            }
            Operation::Asc
            | Operation::Desc
            | Operation::In
            | Operation::Nin
            | Operation::Offset
            | Operation::Limit
            | Operation::Page => {}
        }
    }

    fn apply_window(&mut self, filter: &Filter) {
        let Some(n) = filter.value().as_i64() else {
            tracing::debug!("Ignoring {}: not an integer", filter);
            return;
        };
        match filter.operation() {
            Operation::Page => self.page = Some(n.max(1).unsigned_abs()),
            Operation::Limit | Operation::Offset if n < 0 => {
                tracing::debug!("Ignoring {}: negative", filter);
            }
            Operation::Limit => self.limit = Some(n.unsigned_abs()),
            Operation::Offset => self.offset = Some(n.unsigned_abs()),
            _ => {}
        }
    }

    fn push_compare(&mut self, field: String, op: CompareOp, value: FilterValue) {
        self.predicates.push(Predicate::Compare { field, op, value });
    }

    fn push_text(&mut self, field: String, pattern: TextPattern, value: FilterValue, negated: bool) {
        let predicate = Predicate::Text {
            field,
            pattern,
            value,
        };
        self.predicates.push(if negated {
            predicate.negate()
        } else {
            predicate
        });
    }

    fn add_membership(&mut self, field: String, negated: bool, value: FilterValue) {
        let existing = self
            .memberships
            .iter_mut()
            .find(|m| m.field == field && m.negated == negated);
        match existing {
            Some(membership) => {
                if !membership.values.contains(&value) {
                    membership.values.push(value);
                }
            }
            None => self.memberships.push(Membership {
                field,
                negated,
                values: vec![value],
            }),
        }
    }

    fn knows_field(&self, field: &str) -> bool {
        if self.fields.contains(field) {
            return true;
        }
        match field.split_once('.') {
            Some((relation, rest)) => {
                !rest.is_empty() && self.joins.iter().any(|j| j.relation == relation)
            }
            None => false,
        }
    }

    /// Returns the page window a select plan would use.
    pub fn window(&self) -> PageWindow {
        let limit = self
            .config
            .clamp_limit(self.limit.unwrap_or(self.config.default_page_size));
        match self.page {
            Some(page) => PageWindow::for_page(page, limit),
            None => PageWindow::new(self.offset.unwrap_or(0), limit),
        }
    }

    /// Produces the plan. Pure: repeated calls return equal plans.
    pub fn build(&self) -> QueryPlan {
        let mut predicates = self.predicates.clone();
        predicates.extend(self.memberships.iter().map(|m| {
            let predicate = Predicate::In {
                field: m.field.clone(),
                values: m.values.clone(),
            };
            if m.negated {
                predicate.negate()
            } else {
                predicate
            }
        }));

        let window = match self.kind {
            PlanKind::Select => Some(self.window()),
            PlanKind::Update | PlanKind::Delete => None,
        };

        let assignments = match self.kind {
            PlanKind::Update => self.assignments.clone(),
            PlanKind::Select | PlanKind::Delete => Vec::new(),
        };

        QueryPlan::new(
            self.entity.clone(),
            self.kind,
            predicates,
            self.order.clone(),
            self.joins.clone(),
            assignments,
            window,
        )
    }
}
