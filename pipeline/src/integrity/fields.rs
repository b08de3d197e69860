//! Field readers shared by the document validators.
//!
//! Each reader records an issue on failure and returns `None`, so a
//! validator can keep walking and report every problem in one pass.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::result::{ErrorCode, IssueSink};

pub(crate) type Object = Map<String, Value>;

pub(crate) fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Present and not JSON null.
pub(crate) fn present<'a>(obj: &'a Object, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

/// Exact decimal from a JSON number or numeric string.
pub(crate) fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

pub(crate) fn in_unit_interval(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

/// Required string field.
pub(crate) fn require_str<'a>(
    obj: &'a Object,
    field: &str,
    prefix: &str,
    sink: &mut IssueSink,
) -> Option<&'a str> {
    let path = join(prefix, field);
    match present(obj, field) {
        None => {
            sink.error(ErrorCode::MissingField, &path, &format!("{} is required", field));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            sink.error(ErrorCode::MissingField, &path, &format!("{} is empty", field));
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            sink.error(ErrorCode::InvalidType, &path, &format!("{} must be a string", field));
            None
        }
    }
}

/// Check a string value is a UUID, recording `INVALID_UUID` otherwise.
pub(crate) fn check_uuid(value: &Value, path: &str, sink: &mut IssueSink) -> Option<Uuid> {
    match value {
        Value::String(s) => match Uuid::parse_str(s) {
            Ok(id) => Some(id),
            Err(_) => {
                sink.error(ErrorCode::InvalidUuid, path, &format!("{:?} is not a valid UUID", s));
                None
            }
        },
        _ => {
            sink.error(ErrorCode::InvalidUuid, path, "expected a UUID string");
            None
        }
    }
}

/// Required UUID field.
pub(crate) fn require_uuid(
    obj: &Object,
    field: &str,
    prefix: &str,
    sink: &mut IssueSink,
) -> Option<Uuid> {
    let path = join(prefix, field);
    match present(obj, field) {
        None => {
            sink.error(ErrorCode::MissingField, &path, &format!("{} is required", field));
            None
        }
        Some(value) => check_uuid(value, &path, sink),
    }
}

/// Optional UUID field: null or absent is fine, anything else must parse.
pub(crate) fn optional_uuid(
    obj: &Object,
    field: &str,
    prefix: &str,
    sink: &mut IssueSink,
) -> Option<Uuid> {
    present(obj, field).and_then(|v| check_uuid(v, &join(prefix, field), sink))
}

/// Parse a closed-set field through its serde representation.
pub(crate) fn parse_enum<T: DeserializeOwned>(
    obj: &Object,
    field: &str,
    prefix: &str,
    required: bool,
    sink: &mut IssueSink,
) -> Option<T> {
    let path = join(prefix, field);
    let value = match present(obj, field) {
        Some(v) => v,
        None => {
            if required {
                sink.error(ErrorCode::MissingField, &path, &format!("{} is required", field));
            }
            return None;
        }
    };
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            sink.error(
                ErrorCode::InvalidEnum,
                &path,
                &format!("{} is not a recognised {}", value, field),
            );
            None
        }
    }
}

/// Decimal field that must lie in [0, 1].
pub(crate) fn unit_decimal(
    obj: &Object,
    field: &str,
    prefix: &str,
    required: bool,
    sink: &mut IssueSink,
) -> Option<Decimal> {
    let path = join(prefix, field);
    let value = match present(obj, field) {
        Some(v) => v,
        None => {
            if required {
                sink.error(ErrorCode::MissingField, &path, &format!("{} is required", field));
            }
            return None;
        }
    };
    match as_decimal(value) {
        Some(d) if in_unit_interval(d) => Some(d),
        Some(d) => {
            sink.error(
                ErrorCode::InvalidConfidence,
                &path,
                &format!("{} = {} is outside [0, 1]", field, d),
            );
            None
        }
        None => {
            sink.error(ErrorCode::InvalidType, &path, &format!("{} must be a number", field));
            None
        }
    }
}
