//! Field schemas used to validate and coerce filters.
//!
//! Each domain module declares a [`Schema`]: an ordered mapping from field
//! name to [`FieldType`]. The filter parser keeps only filters on schema
//! fields and coerces their values to the declared type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::operation::{LIMIT_KEY, OFFSET_KEY, ORDER_BY_KEY, PAGE_KEY};
use crate::error::ValidationError;

/// Semantic type of a schema field.
///
/// The text form is used in schema files and error messages: primitive names
/// (`int`, `datetime`, ...), a trailing `?` for optional types, and `|`
/// between union members (`int|string`, `int|null`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Text.
    String,
    /// Boolean.
    Bool,
    /// Raw bytes of the query value.
    Bytes,
    /// UUID.
    Uuid,
    /// ISO-8601 calendar date.
    Date,
    /// ISO-8601 date and time.
    DateTime,
    /// ISO-8601 time of day.
    Time,
    /// Whole seconds.
    Duration,
    /// The inner type, or null.
    Optional(Box<FieldType>),
    /// The first member type that accepts the value.
    Union(Vec<FieldType>),
}

impl FieldType {
    /// Wraps a type so that it also admits null.
    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    /// Returns `true` if the null sentinel coerces to null under this type.
    pub fn admits_null(&self) -> bool {
        match self {
            FieldType::Optional(_) => true,
            FieldType::Union(members) => members.iter().any(FieldType::admits_null),
            _ => false,
        }
    }

    /// Returns `true` for optional and union types.
    ///
    /// Values that fit none of their members are kept as raw strings instead
    /// of failing coercion.
    pub fn is_permissive(&self) -> bool {
        matches!(self, FieldType::Optional(_) | FieldType::Union(_))
    }

    fn parse_member(s: &str) -> Result<Self, ValidationError> {
        if let Some(inner) = s.strip_suffix('?') {
            return Ok(FieldType::optional(Self::parse_member(inner)?));
        }
        match s.trim().to_lowercase().as_str() {
            "int" | "integer" => Ok(FieldType::Int),
            "float" | "number" => Ok(FieldType::Float),
            "string" | "str" => Ok(FieldType::String),
            "bool" | "boolean" => Ok(FieldType::Bool),
            "bytes" => Ok(FieldType::Bytes),
            "uuid" => Ok(FieldType::Uuid),
            "date" => Ok(FieldType::Date),
            "datetime" => Ok(FieldType::DateTime),
            "time" => Ok(FieldType::Time),
            "duration" | "timedelta" => Ok(FieldType::Duration),
            _ => Err(ValidationError::InvalidText {
                kind: "field type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::String => write!(f, "string"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Bytes => write!(f, "bytes"),
            FieldType::Uuid => write!(f, "uuid"),
            FieldType::Date => write!(f, "date"),
            FieldType::DateTime => write!(f, "datetime"),
            FieldType::Time => write!(f, "time"),
            FieldType::Duration => write!(f, "duration"),
            FieldType::Optional(inner) => match inner.as_ref() {
                FieldType::Union(_) => write!(f, "{}|null", inner),
                other => write!(f, "{}?", other),
            },
            FieldType::Union(members) => {
                let parts: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join("|"))
            }
        }
    }
}

impl FromStr for FieldType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut nullable = false;
        let mut members = Vec::new();
        for part in s.split('|').map(str::trim) {
            if part.eq_ignore_ascii_case("null") || part.eq_ignore_ascii_case("none") {
                nullable = true;
            } else {
                members.push(Self::parse_member(part)?);
            }
        }

        let base = match members.len() {
            0 => {
                return Err(ValidationError::InvalidText {
                    kind: "field type".to_string(),
                    value: s.to_string(),
                });
            }
            1 => members.remove(0),
            _ => FieldType::Union(members),
        };

        if nullable && !base.admits_null() {
            Ok(FieldType::optional(base))
        } else {
            Ok(base)
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

static RESERVED_ORDER_BY: FieldType = FieldType::String;
static RESERVED_WINDOW: FieldType = FieldType::Int;

/// One declared schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name as it appears in query keys.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// An ordered `field -> type` mapping.
///
/// `orderby` (string) and `offset`, `limit`, `page` (int) are always
/// implicitly present; [`Schema::get`] answers for them even though they are
/// never listed by [`Schema::fields`].
///
/// # Examples
///
/// ```
/// use taskdesk_persistence::types::{FieldType, Schema};
///
/// let schema = Schema::new()
///     .field("title", FieldType::String)
///     .field("valid_until", FieldType::optional(FieldType::DateTime));
///
/// assert_eq!(schema.get("title"), Some(&FieldType::String));
/// assert_eq!(schema.get("limit"), Some(&FieldType::Int));
/// assert!(!schema.contains("owner"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SchemaField>", into = "Vec<SchemaField>")]
pub struct Schema {
    fields: Vec<SchemaField>,
}

impl Schema {
    /// Creates an empty schema (only the reserved keys).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field, replacing an earlier declaration of the same name in place.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.insert(name, field_type);
        self
    }

    /// Declares a field in place.
    pub fn insert(&mut self, name: impl Into<String>, field_type: FieldType) {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.field_type = field_type,
            None => self.fields.push(SchemaField { name, field_type }),
        }
    }

    /// Returns the type of a declared or reserved field.
    pub fn get(&self, name: &str) -> Option<&FieldType> {
        if let Some(field) = self.fields.iter().find(|f| f.name == name) {
            return Some(&field.field_type);
        }
        match name {
            ORDER_BY_KEY => Some(&RESERVED_ORDER_BY),
            OFFSET_KEY | LIMIT_KEY | PAGE_KEY => Some(&RESERVED_WINDOW),
            _ => None,
        }
    }

    /// Returns `true` if the field is declared or reserved.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldType)> {
        self.fields.iter().map(|f| (f.name.as_str(), &f.field_type))
    }

    /// Iterates over declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<SchemaField>> for Schema {
    fn from(fields: Vec<SchemaField>) -> Self {
        fields
            .into_iter()
            .map(|f| (f.name, f.field_type))
            .collect()
    }
}

impl From<Schema> for Vec<SchemaField> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

impl<S: Into<String>> FromIterator<(S, FieldType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, FieldType)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, field_type) in iter {
            schema.insert(name, field_type);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_parse() {
        assert_eq!("int".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!("DateTime".parse::<FieldType>().unwrap(), FieldType::DateTime);
        assert_eq!(
            "datetime?".parse::<FieldType>().unwrap(),
            FieldType::optional(FieldType::DateTime)
        );
        assert_eq!(
            "int|null".parse::<FieldType>().unwrap(),
            FieldType::optional(FieldType::Int)
        );
        assert_eq!(
            "int|string".parse::<FieldType>().unwrap(),
            FieldType::Union(vec![FieldType::Int, FieldType::String])
        );
        assert!("decimal".parse::<FieldType>().is_err());
        assert!("null".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_type_display_round_trip() {
        for text in ["int", "uuid?", "int|string", "int|bool|null", "duration"] {
            let parsed: FieldType = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_admits_null() {
        assert!(!FieldType::Int.admits_null());
        assert!(FieldType::optional(FieldType::Int).admits_null());
        assert!(
            FieldType::Union(vec![FieldType::Int, FieldType::optional(FieldType::String)])
                .admits_null()
        );
        assert!(FieldType::Union(vec![FieldType::Int]).is_permissive());
        assert!(!FieldType::Date.is_permissive());
    }

    #[test]
    fn test_schema_reserved_keys() {
        let schema = Schema::new().field("age", FieldType::Int);
        assert_eq!(schema.get("orderby"), Some(&FieldType::String));
        assert_eq!(schema.get("page"), Some(&FieldType::Int));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["age"]);
    }

    #[test]
    fn test_schema_redeclare_keeps_position() {
        let schema = Schema::new()
            .field("a", FieldType::Int)
            .field("b", FieldType::String)
            .field("a", FieldType::Float);
        let fields: Vec<_> = schema.fields().collect();
        assert_eq!(fields, vec![("a", &FieldType::Float), ("b", &FieldType::String)]);
    }

    #[test]
    fn test_schema_deserialize() {
        let schema: Schema = serde_json::from_value(serde_json::json!([
            {"name": "title", "type": "string"},
            {"name": "due", "type": "datetime?"}
        ]))
        .unwrap();
        assert_eq!(
            schema.get("due"),
            Some(&FieldType::optional(FieldType::DateTime))
        );
    }
}
