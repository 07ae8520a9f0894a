//! Coercion of raw query-string values to schema types.
//!
//! [`try_coerce`] is a pure match over [`FieldType`]; [`coerce_for_filter`]
//! adds the filter-level policy: `isnull` values are booleans, required types
//! fail with [`FilterError::ValueCoercion`], and optional or union types fall
//! back to the raw string.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use uuid::Uuid;

use crate::error::{FilterError, FilterResult};
use crate::types::{FieldType, FilterValue, Operation, parse_bool};

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Returns `true` for the null sentinels `none` and `null` (any case).
pub fn is_null_sentinel(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("null")
}

/// Coerces a raw value to a field type, or returns `None` if it does not fit.
///
/// Optional types map the null sentinels to [`FilterValue::Null`] before
/// trying their inner type. Union types try their members in declaration
/// order and return the first success.
pub fn try_coerce(raw: &str, field_type: &FieldType) -> Option<FilterValue> {
    match field_type {
        FieldType::Int => raw.trim().parse::<i64>().ok().map(FilterValue::Int),
        FieldType::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(FilterValue::Float),
        FieldType::String => Some(FilterValue::String(raw.to_string())),
        FieldType::Bool => parse_bool(raw).map(FilterValue::Bool),
        FieldType::Bytes => Some(FilterValue::Bytes(raw.as_bytes().to_vec())),
        FieldType::Uuid => Uuid::parse_str(raw.trim()).ok().map(FilterValue::Uuid),
        FieldType::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .ok()
            .map(FilterValue::Date),
        FieldType::DateTime => parse_datetime(raw).map(FilterValue::DateTime),
        FieldType::Time => parse_time(raw).map(FilterValue::Time),
        FieldType::Duration => raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(TimeDelta::try_seconds)
            .map(FilterValue::Duration),
        FieldType::Optional(inner) => {
            if is_null_sentinel(raw) {
                Some(FilterValue::Null)
            } else {
                try_coerce(raw, inner)
            }
        }
        FieldType::Union(members) => members.iter().find_map(|m| try_coerce(raw, m)),
    }
}

/// Coerces the value of one parsed filter.
///
/// `isnull` values are always coerced as booleans, whatever the field type.
/// On an optional or union field a value that fits nowhere is kept as the raw
/// string; on a required field it is a [`FilterError::ValueCoercion`].
pub fn coerce_for_filter(
    field: &str,
    operation: Operation,
    raw: &str,
    field_type: &FieldType,
) -> FilterResult<FilterValue> {
    let target = if operation == Operation::IsNull {
        &FieldType::Bool
    } else {
        field_type
    };

    if let Some(value) = try_coerce(raw, target) {
        return Ok(value);
    }

    // Nullable fields never fail coercion, not even for `isnull`
    if field_type.is_permissive() {
        tracing::warn!(
            "Value '{}' of {}_{} matches no member of {}; keeping raw string",
            raw,
            field,
            operation,
            target
        );
        return Ok(FilterValue::String(raw.to_string()));
    }

    Err(FilterError::ValueCoercion {
        field: field.to_string(),
        operation,
        value: raw.to_string(),
        expected: target.clone(),
    })
}

/// Parses an ISO-8601 date-time.
///
/// Accepts RFC 3339, `+HHMM` offsets, naive date-times (taken as UTC) and bare
/// dates (midnight UTC). Form decoding turns an unescaped `+` into a space, so
/// a space after the time part is read back as `+`.
pub fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Some(dt) = parse_with_offset(raw) {
        return Some(dt);
    }

    // "2023-04-02T00:00:00 00:00" was "2023-04-02T00:00:00+00:00" before decoding
    if let Some(idx) = raw.rfind(' ').filter(|idx| *idx > DATE_FORMAT_LEN) {
        let restored = format!("{}+{}", &raw[..idx], &raw[idx + 1..]);
        if let Some(dt) = parse_with_offset(&restored) {
            return Some(dt);
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().fixed_offset())
}

// Length of a "YYYY-MM-DD" date; the date/time separator sits at this index.
const DATE_FORMAT_LEN: usize = 10;

fn parse_with_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
}

pub(crate) fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}
