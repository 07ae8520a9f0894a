//! Query-string filter parsing.
//!
//! Turns an untrusted `key=value&key2=value2` query string into an ordered
//! list of [`Filter`]s.
//!
//! # Key Grammar
//!
//! | Key | Produces |
//! |-----|----------|
//! | `orderby=name,-title` | `Asc` on `name`, `Desc` on `title` |
//! | `offset=10`, `limit=5`, `page=2` | `Offset` / `Limit` / `Page` |
//! | `<field>_<suffix>=v1,v2` | one filter per comma fragment |
//!
//! The field/suffix split happens at the last underscore, so field names may
//! contain underscores (`valid_until_lt`). Keys that fit none of these forms
//! are dropped, never reported.

use url::form_urlencoded;

use crate::error::FilterResult;
use crate::types::{Filter, FilterValue, ORDER_BY_KEY, Operation, RESERVED_KEYS, Schema};

use super::coercion::coerce_for_filter;

const FRAGMENT_SEPARATOR: char = ',';

/// Parses query strings into filters, optionally validated against a [`Schema`].
///
/// Without a schema every syntactically valid pair is kept with its raw string
/// value. With a schema, pairs on undeclared fields are dropped and values are
/// coerced to the declared [`FieldType`](crate::types::FieldType).
///
/// # Examples
///
/// ```
/// use taskdesk_persistence::search::FilterParser;
/// use taskdesk_persistence::types::{FieldType, FilterValue, Operation, Schema};
///
/// let schema = Schema::new().field("age", FieldType::Int);
/// let filters = FilterParser::with_schema(&schema)
///     .parse("name_eq=x&age_gte=20&orderby=-age")
///     .unwrap();
///
/// assert_eq!(filters.len(), 2);
/// assert_eq!(filters[0].field(), "age");
/// assert_eq!(filters[0].value(), &FilterValue::Int(20));
/// assert_eq!(filters[1].operation(), Operation::Desc);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterParser<'a> {
    schema: Option<&'a Schema>,
}

impl<'a> FilterParser<'a> {
    /// Creates a parser without a schema.
    pub fn new() -> Self {
        Self { schema: None }
    }

    /// Creates a parser that validates and coerces against `schema`.
    pub fn with_schema(schema: &'a Schema) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// Returns the schema, if any.
    pub fn schema(&self) -> Option<&'a Schema> {
        self.schema
    }

    /// Parses a form-urlencoded query string. A leading `?` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ValueCoercion`](crate::error::FilterError::ValueCoercion)
    /// when a value cannot be coerced to a required schema type.
    pub fn parse(&self, query: &str) -> FilterResult<Vec<Filter>> {
        let query = query.strip_prefix('?').unwrap_or(query);
        self.parse_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    /// Parses already-decoded `(key, value)` pairs, in order.
    pub fn parse_pairs<I, K, V>(&self, pairs: I) -> FilterResult<Vec<Filter>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Vec::new();
        for (key, value) in pairs {
            self.parse_pair(key.as_ref(), value.as_ref(), &mut filters)?;
        }
        Ok(filters)
    }

    fn parse_pair(&self, key: &str, value: &str, out: &mut Vec<Filter>) -> FilterResult<()> {
        if key == ORDER_BY_KEY {
            self.parse_order(value, out)?;
            return Ok(());
        }

        if let Some(operation) = Operation::from_window_key(key) {
            for fragment in value.split(FRAGMENT_SEPARATOR) {
                let value = self.coerce(key, operation, fragment)?;
                out.push(Filter::new(key, operation, value));
            }
            return Ok(());
        }

        let Some((field, suffix)) = key.rsplit_once('_') else {
            tracing::debug!("Dropping query key '{}': no operator suffix", key);
            return Ok(());
        };

        let Some(operation) = Operation::from_suffix(suffix) else {
            tracing::debug!("Dropping query key '{}': unknown operator '{}'", key, suffix);
            return Ok(());
        };

        if field.is_empty() || RESERVED_KEYS.contains(&field) {
            tracing::debug!("Dropping query key '{}': invalid field name", key);
            return Ok(());
        }

        if let Some(schema) = self.schema {
            if !schema.contains(field) {
                tracing::debug!(
                    "Dropping query key '{}': field '{}' is not in the schema",
                    key,
                    field
                );
                return Ok(());
            }
        }

        for fragment in value.split(FRAGMENT_SEPARATOR) {
            let value = self.coerce(field, operation, fragment)?;
            out.push(Filter::new(field, operation, value));
        }
        Ok(())
    }

    fn parse_order(&self, value: &str, out: &mut Vec<Filter>) -> FilterResult<()> {
        for fragment in value.split(FRAGMENT_SEPARATOR) {
            let (field, operation) = match fragment.strip_prefix('-') {
                Some(rest) => (rest, Operation::Desc),
                None => (fragment, Operation::Asc),
            };
            if field.is_empty() {
                tracing::debug!("Dropping empty order fragment '{}'", fragment);
                continue;
            }
            let value = self.coerce(ORDER_BY_KEY, operation, fragment)?;
            out.push(Filter::new(field, operation, value));
        }
        Ok(())
    }

    fn coerce(&self, field: &str, operation: Operation, raw: &str) -> FilterResult<FilterValue> {
        let field_type = self.schema.and_then(|schema| schema.get(field));
        match field_type {
            Some(field_type) => coerce_for_filter(field, operation, raw, field_type),
            None => Ok(FilterValue::String(raw.to_string())),
        }
    }
}

/// Parses a query string with an optional schema.
pub fn parse_filters(query: &str, schema: Option<&Schema>) -> FilterResult<Vec<Filter>> {
    match schema {
        Some(schema) => FilterParser::with_schema(schema).parse(query),
        None => FilterParser::new().parse(query),
    }
}
