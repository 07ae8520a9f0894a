//! In-process evaluation of predicates against JSON rows.
//!
//! Used by the in-memory backend. Comparisons are typed by the
//! [`FilterValue`]: a schemaless string filter such as `age_gte=18` still
//! compares numerically against a JSON number, and date-time filters compare
//! instants rather than text.
//!
//! Comparisons against a missing or null field are false, except for the
//! explicit null tests.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::types::{CompareOp, FilterValue, Predicate, TextPattern, parse_bool};

use super::coercion::{parse_datetime, parse_time};

impl Predicate {
    /// Returns `true` if `row` satisfies this predicate.
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Predicate::Compare { field, op, value } => {
                let actual = lookup(row, field);
                if value.is_null() {
                    return match op {
                        CompareOp::Eq => is_null(actual),
                        CompareOp::Ne => !is_null(actual),
                        _ => false,
                    };
                }
                let Some(actual) = actual.filter(|v| !v.is_null()) else {
                    return false;
                };
                let Some(ordering) = compare_value(actual, value) else {
                    return matches!(op, CompareOp::Ne);
                };
                match op {
                    CompareOp::Eq => ordering == Ordering::Equal,
                    CompareOp::Ne => ordering != Ordering::Equal,
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::Le => ordering != Ordering::Greater,
                    CompareOp::Gt => ordering == Ordering::Greater,
                    CompareOp::Ge => ordering != Ordering::Less,
                }
            }
            Predicate::Text {
                field,
                pattern,
                value,
            } => {
                let Some(text) = lookup(row, field).and_then(text_of) else {
                    return false;
                };
                let needle = value.to_string();
                match pattern {
                    TextPattern::Contains => text.contains(&needle),
                    TextPattern::StartsWith => text.starts_with(&needle),
                    TextPattern::EndsWith => text.ends_with(&needle),
                }
            }
            Predicate::In { field, values } => match lookup(row, field) {
                Some(actual) if !actual.is_null() => values
                    .iter()
                    .any(|v| compare_value(actual, v) == Some(Ordering::Equal)),
                _ => false,
            },
            Predicate::IsNull { field } => is_null(lookup(row, field)),
            Predicate::Not { predicate } => !predicate.matches(row),
            Predicate::And { predicates } => predicates.iter().all(|p| p.matches(row)),
            Predicate::Or { predicates } => predicates.iter().any(|p| p.matches(row)),
        }
    }
}

/// Resolves a dotted path (`project.name`) inside a JSON object.
pub fn lookup<'v>(row: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(row, |current, segment| current.get(segment))
}

fn is_null(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Compares a JSON value with a filter value, or `None` if they are not comparable.
pub fn compare_value(actual: &Value, expected: &FilterValue) -> Option<Ordering> {
    match expected {
        FilterValue::Null => None,
        FilterValue::Int(n) => match actual.as_i64() {
            Some(a) => Some(a.cmp(n)),
            None => number_of(actual)?.partial_cmp(&(*n as f64)),
        },
        FilterValue::Float(x) => number_of(actual)?.partial_cmp(x),
        FilterValue::String(s) => compare_with_text(actual, s),
        FilterValue::Bool(b) => {
            let a = match actual {
                Value::Bool(a) => *a,
                Value::String(s) => parse_bool(s)?,
                _ => return None,
            };
            Some(a.cmp(b))
        }
        FilterValue::Bytes(bytes) => Some(actual.as_str()?.as_bytes().cmp(bytes.as_slice())),
        FilterValue::Uuid(u) => Uuid::parse_str(actual.as_str()?).ok().map(|a| a.cmp(u)),
        FilterValue::Date(d) => {
            let s = actual.as_str()?;
            let a = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| parse_datetime(s).map(|dt| dt.date_naive()))?;
            Some(a.cmp(d))
        }
        FilterValue::DateTime(dt) => parse_datetime(actual.as_str()?).map(|a| a.cmp(dt)),
        FilterValue::Time(t) => parse_time(actual.as_str()?).map(|a| a.cmp(t)),
        FilterValue::Duration(d) => number_of(actual)?.partial_cmp(&(d.num_seconds() as f64)),
    }
}

// Untyped (schemaless) values adapt to the JSON side.
fn compare_with_text(actual: &Value, text: &str) -> Option<Ordering> {
    match actual {
        Value::String(a) => Some(a.as_str().cmp(text)),
        Value::Number(_) => number_of(actual)?.partial_cmp(&text.trim().parse::<f64>().ok()?),
        Value::Bool(a) => Some(a.cmp(&parse_bool(text)?)),
        _ => None,
    }
}

/// Total order over JSON values used for ORDER BY.
///
/// Nulls (and missing values) sort after every other value; numbers compare
/// numerically, strings lexicographically. Values of different JSON types
/// are ordered by type.
pub fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn row() -> Value {
        json!({
            "title": "Quarterly report",
            "age": 21,
            "score": 4.5,
            "done": false,
            "due": null,
            "created_at": "2023-04-01T12:00:00+00:00",
            "project": {"name": "apollo"}
        })
    }

    #[test]
    fn test_compare_numbers() {
        let row = row();
        assert!(Predicate::compare("age", CompareOp::Ge, 18_i64).matches(&row));
        assert!(Predicate::compare("age", CompareOp::Lt, "30").matches(&row));
        assert!(Predicate::compare("score", CompareOp::Gt, 4.0_f64).matches(&row));
        assert!(!Predicate::eq("age", 20_i64).matches(&row));
    }

    #[test]
    fn test_compare_datetime() {
        let row = row();
        let cutoff = Utc.with_ymd_and_hms(2023, 4, 2, 0, 0, 0).unwrap();
        assert!(Predicate::compare("created_at", CompareOp::Lt, cutoff).matches(&row));
        assert!(!Predicate::compare("created_at", CompareOp::Gt, cutoff).matches(&row));
    }

    #[test]
    fn test_null_semantics() {
        let row = row();
        assert!(Predicate::is_null("due").matches(&row));
        assert!(Predicate::is_null("missing").matches(&row));
        assert!(Predicate::eq("due", FilterValue::Null).matches(&row));
        assert!(Predicate::compare("age", CompareOp::Ne, FilterValue::Null).matches(&row));
        assert!(!Predicate::compare("due", CompareOp::Lt, 5_i64).matches(&row));
    }

    #[test]
    fn test_text_patterns() {
        let row = row();
        assert!(Predicate::text("title", TextPattern::Contains, "report").matches(&row));
        assert!(Predicate::text("title", TextPattern::StartsWith, "Quarter").matches(&row));
        assert!(!Predicate::text("title", TextPattern::EndsWith, "Report").matches(&row));
        assert!(Predicate::text("age", TextPattern::StartsWith, "2").matches(&row));
    }

    #[test]
    fn test_membership() {
        let row = row();
        assert!(Predicate::is_in("age", [20_i64, 21_i64]).matches(&row));
        assert!(Predicate::is_in("age", ["21"]).matches(&row));
        assert!(!Predicate::is_in("age", Vec::<FilterValue>::new()).matches(&row));
        assert!(Predicate::is_in("age", Vec::<FilterValue>::new()).negate().matches(&row));
    }

    #[test]
    fn test_dotted_path_and_bool() {
        let row = row();
        assert!(Predicate::eq("project.name", "apollo").matches(&row));
        assert!(Predicate::eq("done", false).matches(&row));
        assert!(Predicate::eq("done", "no").matches(&row));
    }

    #[test]
    fn test_combinators() {
        let row = row();
        let both = Predicate::And {
            predicates: vec![Predicate::eq("age", 21_i64), Predicate::is_null("due")],
        };
        let either = Predicate::Or {
            predicates: vec![Predicate::eq("age", 1_i64), Predicate::is_null("due")],
        };
        assert!(both.matches(&row));
        assert!(either.matches(&row));
        assert!(!Predicate::Or { predicates: vec![] }.matches(&row));
    }

    #[test]
    fn test_compare_json_nulls_last() {
        let mut values = vec![json!(3), Value::Null, json!(1), json!(2)];
        values.sort_by(|a, b| compare_json(Some(a), Some(b)));
        assert_eq!(values, vec![json!(1), json!(2), json!(3), Value::Null]);
    }
}
