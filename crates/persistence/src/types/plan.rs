//! Storage-agnostic query plans.
//!
//! A [`QueryPlan`] is what the
//! [`QueryPlanBuilder`](crate::search::QueryPlanBuilder) produces: an
//! immutable description of predicates, ordering, joins and the page window.
//! Storage adapters translate it into their own query language. The `Display`
//! forms are readable summaries for logs, not executable statements.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::FilterValue;
use super::pagination::PageWindow;

/// The statement kind of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    /// Read rows.
    #[default]
    Select,
    /// Modify rows with the plan's assignments.
    Update,
    /// Remove rows.
    Delete,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::Select => write!(f, "select"),
            PlanKind::Update => write!(f, "update"),
            PlanKind::Delete => write!(f, "delete"),
        }
    }
}

/// Comparison operators of a [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    /// Equal. Against null this is a null test.
    Eq,
    /// Not equal. Against null this is a not-null test.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CompareOp {
    /// Returns the conventional symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Text matching patterns of a [`Predicate::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPattern {
    /// Substring.
    Contains,
    /// Prefix.
    StartsWith,
    /// Suffix.
    EndsWith,
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextPattern::Contains => write!(f, "CONTAINS"),
            TextPattern::StartsWith => write!(f, "STARTS WITH"),
            TextPattern::EndsWith => write!(f, "ENDS WITH"),
        }
    }
}

/// A boolean condition over one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// `field <op> value`.
    Compare {
        /// Field name, possibly dotted through a joined relation.
        field: String,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand side.
        value: FilterValue,
    },
    /// Text pattern match on the string form of the field.
    Text {
        /// Field name.
        field: String,
        /// Pattern kind.
        pattern: TextPattern,
        /// Pattern text.
        value: FilterValue,
    },
    /// Membership in a value set. An empty set matches nothing.
    In {
        /// Field name.
        field: String,
        /// Accepted values, without duplicates.
        values: Vec<FilterValue>,
    },
    /// Null test.
    IsNull {
        /// Field name.
        field: String,
    },
    /// Logical negation.
    Not {
        /// Negated predicate.
        predicate: Box<Predicate>,
    },
    /// Conjunction. Empty is true.
    And {
        /// Operands.
        predicates: Vec<Predicate>,
    },
    /// Disjunction. Empty is false.
    Or {
        /// Operands.
        predicates: Vec<Predicate>,
    },
}

impl Predicate {
    /// Creates a comparison predicate.
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<FilterValue>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Creates an equality predicate.
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Creates a text pattern predicate.
    pub fn text(field: impl Into<String>, pattern: TextPattern, value: impl Into<FilterValue>) -> Self {
        Predicate::Text {
            field: field.into(),
            pattern,
            value: value.into(),
        }
    }

    /// Creates a membership predicate.
    pub fn is_in<V: Into<FilterValue>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a null test.
    pub fn is_null(field: impl Into<String>) -> Self {
        Predicate::IsNull {
            field: field.into(),
        }
    }

    /// Wraps this predicate in a negation.
    pub fn negate(self) -> Self {
        Predicate::Not {
            predicate: Box::new(self),
        }
    }

    /// Returns the field a leaf predicate tests, or `None` for combinators.
    pub fn field(&self) -> Option<&str> {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::Text { field, .. }
            | Predicate::In { field, .. }
            | Predicate::IsNull { field } => Some(field),
            Predicate::Not { predicate } => predicate.field(),
            Predicate::And { .. } | Predicate::Or { .. } => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { field, op, value } => {
                write!(f, "{} {} {}", field, op.symbol(), value)
            }
            Predicate::Text {
                field,
                pattern,
                value,
            } => write!(f, "{} {} '{}'", field, pattern, value),
            Predicate::In { field, values } => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{} IN ({})", field, parts.join(", "))
            }
            Predicate::IsNull { field } => write!(f, "{} IS NULL", field),
            Predicate::Not { predicate } => write!(f, "NOT ({})", predicate),
            Predicate::And { predicates } => write_joined(f, predicates, " AND "),
            Predicate::Or { predicates } => write_joined(f, predicates, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, predicates: &[Predicate], sep: &str) -> fmt::Result {
    let parts: Vec<String> = predicates.iter().map(|p| format!("({})", p)).collect();
    write!(f, "{}", parts.join(sep))
}

/// Sort direction of an [`OrderBy`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl OrderBy {
    /// Creates an ascending entry.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Creates a descending entry.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{} ASC", self.field),
            SortDirection::Descending => write!(f, "{} DESC", self.field),
        }
    }
}

/// A relation joined into the plan, making `relation.field` paths valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Join {
    /// Relation name.
    pub relation: String,
    /// Keep rows without a related row.
    #[serde(default)]
    pub outer: bool,
}

/// A `field = value` assignment of an update plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Target field.
    pub field: String,
    /// New value.
    pub value: FilterValue,
}

/// An immutable, storage-agnostic query plan.
///
/// All predicates are conjunctive. Only select plans carry a page window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    entity: String,
    kind: PlanKind,
    predicates: Vec<Predicate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    order: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    joins: Vec<Join>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    window: Option<PageWindow>,
}

impl QueryPlan {
    pub(crate) fn new(
        entity: String,
        kind: PlanKind,
        predicates: Vec<Predicate>,
        order: Vec<OrderBy>,
        joins: Vec<Join>,
        assignments: Vec<Assignment>,
        window: Option<PageWindow>,
    ) -> Self {
        Self {
            entity,
            kind,
            predicates,
            order,
            joins,
            assignments,
            window,
        }
    }

    /// The entity (table, collection) the plan targets.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The statement kind.
    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    /// Conjunctive predicates in emission order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// ORDER BY entries in encounter order.
    pub fn order(&self) -> &[OrderBy] {
        &self.order
    }

    /// Joined relations.
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Assignments of an update plan.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// The page window of a select plan.
    pub fn window(&self) -> Option<PageWindow> {
        self.window
    }

    /// Returns `true` if no predicate restricts the plan.
    pub fn is_unrestricted(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.to_string().to_uppercase(), self.entity)?;
        for join in &self.joins {
            let kind = if join.outer { "LEFT JOIN" } else { "JOIN" };
            write!(f, " {} {}", kind, join.relation)?;
        }
        if !self.assignments.is_empty() {
            let parts: Vec<String> = self
                .assignments
                .iter()
                .map(|a| format!("{} = {}", a.field, a.value))
                .collect();
            write!(f, " SET {}", parts.join(", "))?;
        }
        if !self.predicates.is_empty() {
            write!(f, " WHERE ")?;
            write_joined(f, &self.predicates, " AND ")?;
        }
        if !self.order.is_empty() {
            let parts: Vec<String> = self.order.iter().map(ToString::to_string).collect();
            write!(f, " ORDER BY {}", parts.join(", "))?;
        }
        if let Some(window) = self.window {
            write!(f, " LIMIT {} OFFSET {}", window.limit, window.offset)?;
        }
        Ok(())
    }
}
