//! Filter operator vocabulary.
//!
//! This module defines the closed set of [`Operation`]s a query-string filter
//! can carry, together with the reserved keys that control ordering and
//! pagination.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reserved query key for ordering (`orderby=name` / `orderby=-name`).
pub const ORDER_BY_KEY: &str = "orderby";

/// Reserved query key for the result offset.
pub const OFFSET_KEY: &str = "offset";

/// Reserved query key for the page size.
pub const LIMIT_KEY: &str = "limit";

/// Reserved query key for the 1-based page number.
pub const PAGE_KEY: &str = "page";

/// All reserved keys, in the order they are documented.
pub const RESERVED_KEYS: [&str; 4] = [ORDER_BY_KEY, OFFSET_KEY, LIMIT_KEY, PAGE_KEY];

/// Operations a [`Filter`](super::Filter) can carry.
///
/// The first five variants come from reserved keys (`orderby`, `offset`,
/// `limit`, `page`); the rest come from `<field>_<suffix>` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Ascending order on the field.
    Asc,
    /// Descending order on the field.
    Desc,
    /// Result offset.
    Offset,
    /// Page size.
    Limit,
    /// Page number.
    Page,
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Member of a value set.
    In,
    /// Not a member of a value set.
    Nin,
    /// Substring match.
    Contains,
    /// Negated substring match.
    NContains,
    /// Prefix match.
    StartsWith,
    /// Negated prefix match.
    NStartsWith,
    /// Suffix match.
    EndsWith,
    /// Negated suffix match.
    NEndsWith,
    /// Null test (`true`) or not-null test (`false`).
    IsNull,
}

impl Operation {
    /// Operators that may appear as a `<field>_<suffix>` key suffix.
    pub const FIELD_OPERATORS: [Operation; 15] = [
        Operation::Eq,
        Operation::Neq,
        Operation::Lt,
        Operation::Lte,
        Operation::Gt,
        Operation::Gte,
        Operation::In,
        Operation::Nin,
        Operation::Contains,
        Operation::NContains,
        Operation::StartsWith,
        Operation::NStartsWith,
        Operation::EndsWith,
        Operation::NEndsWith,
        Operation::IsNull,
    ];

    /// Returns the lowercase name, which is also the key suffix for field operators.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Asc => "asc",
            Operation::Desc => "desc",
            Operation::Offset => "offset",
            Operation::Limit => "limit",
            Operation::Page => "page",
            Operation::Eq => "eq",
            Operation::Neq => "neq",
            Operation::Lt => "lt",
            Operation::Lte => "lte",
            Operation::Gt => "gt",
            Operation::Gte => "gte",
            Operation::In => "in",
            Operation::Nin => "nin",
            Operation::Contains => "contains",
            Operation::NContains => "ncontains",
            Operation::StartsWith => "startswith",
            Operation::NStartsWith => "nstartswith",
            Operation::EndsWith => "endswith",
            Operation::NEndsWith => "nendswith",
            Operation::IsNull => "isnull",
        }
    }

    /// Looks up a field operator by its key suffix.
    ///
    /// Returns `None` for unknown suffixes and for the reserved-key operations,
    /// which never appear as suffixes.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::FIELD_OPERATORS
            .iter()
            .copied()
            .find(|op| op.as_str() == suffix)
    }

    /// Looks up the operation of a bare reserved pagination key.
    pub fn from_window_key(key: &str) -> Option<Self> {
        match key {
            OFFSET_KEY => Some(Operation::Offset),
            LIMIT_KEY => Some(Operation::Limit),
            PAGE_KEY => Some(Operation::Page),
            _ => None,
        }
    }

    /// Returns `true` for `Offset`, `Limit` and `Page`.
    pub fn is_pagination(&self) -> bool {
        matches!(self, Operation::Offset | Operation::Limit | Operation::Page)
    }

    /// Returns `true` for `Asc` and `Desc`.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Operation::Asc | Operation::Desc)
    }

    /// Returns `true` for `In` and `Nin`.
    pub fn is_membership(&self) -> bool {
        matches!(self, Operation::In | Operation::Nin)
    }

    /// Returns `true` for the `N`-prefixed negated operators and `Neq`/`Nin`.
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Operation::Neq
                | Operation::Nin
                | Operation::NContains
                | Operation::NStartsWith
                | Operation::NEndsWith
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "asc" => Ok(Operation::Asc),
            "desc" => Ok(Operation::Desc),
            other => Operation::from_window_key(other)
                .or_else(|| Operation::from_suffix(other))
                .ok_or_else(|| ValidationError::InvalidText {
                    kind: "operation".to_string(),
                    value: s.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_suffix() {
        assert_eq!(Operation::from_suffix("eq"), Some(Operation::Eq));
        assert_eq!(
            Operation::from_suffix("nstartswith"),
            Some(Operation::NStartsWith)
        );
        assert_eq!(Operation::from_suffix("isnull"), Some(Operation::IsNull));
        assert_eq!(Operation::from_suffix("asc"), None);
        assert_eq!(Operation::from_suffix("limit"), None);
        assert_eq!(Operation::from_suffix("like"), None);
    }

    #[test]
    fn test_suffix_names_round_trip() {
        for op in Operation::FIELD_OPERATORS {
            assert_eq!(Operation::from_suffix(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_operation_parse() {
        assert_eq!("DESC".parse::<Operation>().unwrap(), Operation::Desc);
        assert_eq!("page".parse::<Operation>().unwrap(), Operation::Page);
        assert_eq!("gte".parse::<Operation>().unwrap(), Operation::Gte);
        assert!("between".parse::<Operation>().is_err());
    }

    #[test]
    fn test_classification() {
        assert!(Operation::Page.is_pagination());
        assert!(!Operation::Eq.is_pagination());
        assert!(Operation::Desc.is_ordering());
        assert!(Operation::Nin.is_membership());
        assert!(Operation::NEndsWith.is_negated());
        assert!(!Operation::EndsWith.is_negated());
    }
}
