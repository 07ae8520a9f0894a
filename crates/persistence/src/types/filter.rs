//! Parsed filter types.
//!
//! A [`Filter`] is one `(field, operation, value)` triple derived from a query
//! string. Its [`FilterValue`] is a plain string unless a schema coerced it
//! into a typed value.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operation::Operation;

/// A typed filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FilterValue {
    /// Explicit null (`none` / `null` under a nullable schema type).
    Null,
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text, also the value of every filter parsed without a schema.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UUID.
    Uuid(Uuid),
    /// Calendar date.
    Date(NaiveDate),
    /// Instant with its UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Time of day.
    Time(NaiveTime),
    /// Duration, carried on the wire as whole seconds.
    Duration(#[serde(with = "duration_seconds")] TimeDelta),
}

impl FilterValue {
    /// Returns `true` for [`FilterValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    /// Returns the text if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as an integer.
    ///
    /// Integers are returned directly; strings are parsed, which is what
    /// schemaless pagination values need.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FilterValue::Int(n) => Some(*n),
            FilterValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interprets the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Bool(b) => Some(*b),
            FilterValue::String(s) => parse_bool(s),
            _ => None,
        }
    }
}

/// Parses the boolean spellings accepted in query strings.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Null => write!(f, "null"),
            FilterValue::Int(n) => write!(f, "{}", n),
            FilterValue::Float(x) => write!(f, "{}", x),
            FilterValue::String(s) => write!(f, "{}", s),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Bytes(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            FilterValue::Uuid(u) => write!(f, "{}", u),
            FilterValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FilterValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            FilterValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            FilterValue::Duration(d) => write!(f, "{}", d.num_seconds()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

impl From<f64> for FilterValue {
    fn from(x: f64) -> Self {
        FilterValue::Float(x)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<Uuid> for FilterValue {
    fn from(u: Uuid) -> Self {
        FilterValue::Uuid(u)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(d: NaiveDate) -> Self {
        FilterValue::Date(d)
    }
}

impl From<DateTime<FixedOffset>> for FilterValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        FilterValue::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FilterValue::DateTime(dt.fixed_offset())
    }
}

impl From<NaiveTime> for FilterValue {
    fn from(t: NaiveTime) -> Self {
        FilterValue::Time(t)
    }
}

impl From<TimeDelta> for FilterValue {
    fn from(d: TimeDelta) -> Self {
        FilterValue::Duration(d)
    }
}

mod duration_seconds {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        TimeDelta::try_seconds(seconds)
            .ok_or_else(|| de::Error::custom(format!("duration out of range: {}s", seconds)))
    }
}

/// One `(field, operation, value)` predicate parsed from a query string.
///
/// Filters are immutable once created. For `orderby` filters the value is the
/// raw fragment (`-name` for a descending order on `name`); for `offset`,
/// `limit` and `page` the field is the reserved key itself.
///
/// # Examples
///
/// ```
/// use taskdesk_persistence::types::{Filter, FilterValue, Operation};
///
/// let filter = Filter::new("name", Operation::Desc, "-name");
/// assert_eq!(filter.field(), "name");
/// assert_eq!(filter.operation(), Operation::Desc);
/// assert_eq!(filter.value(), &FilterValue::String("-name".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    field: String,
    operation: Operation,
    value: FilterValue,
}

impl Filter {
    /// Creates a new filter.
    pub fn new(field: impl Into<String>, operation: Operation, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operation,
            value: value.into(),
        }
    }

    /// Returns the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the operation.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the value.
    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Splits the filter into its parts.
    pub fn into_parts(self) -> (String, Operation, FilterValue) {
        (self.field, self.operation, self.value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operation, self.value)
    }
}
