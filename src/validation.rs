/*
 * Responsibility
 * - Request-body field checks shared by handlers
 * - Required-field / updateable-field / allowed-value validation
 */
use serde_json::{Map, Value};

use crate::error::AppError;

/// Check that every required field is present and non-empty.
///
/// Fields holding an empty string count as missing (clients routinely send
/// `""` for untouched form fields). Returns the body untouched on success.
pub fn check_required_values<'a>(
    required: &[&str],
    body: &'a Map<String, Value>,
) -> Result<&'a Map<String, Value>, AppError> {
    if body.is_empty() {
        return Err(AppError::validation("Body is empty"));
    }

    let missing: Vec<String> = required
        .iter()
        .filter(|field| match body.get(**field) {
            None => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(AppError::ParamMissing { params: missing });
    }

    Ok(body)
}

/// Project the body down to the fields a handler allows to be updated.
pub fn updateable_fields(
    updateable: &[&str],
    body: &Map<String, Value>,
) -> Result<Map<String, Value>, AppError> {
    if body.is_empty() {
        return Err(AppError::validation("Body is empty, no field(s) to update"));
    }

    let mut projected = Map::new();
    for field in updateable {
        if let Some(value) = body.get(*field) {
            projected.insert((*field).to_string(), value.clone());
        }
    }

    Ok(projected)
}

/// Check that `value` is one of the allowed values for `field`.
pub fn check_possible_values(
    field: &str,
    value: &Value,
    possible: &[Value],
) -> Result<(), AppError> {
    if possible.contains(value) {
        return Ok(());
    }

    Err(AppError::Field {
        message: format!("'{value}' is not a possible value for '{field}'"),
    })
}
