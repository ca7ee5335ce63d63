/// Upstream payload parsing
///
/// Accepted shapes:
/// - `[ {pool}, {pool}, ... ]`
/// - `{ "status": "...", "data": [ {pool}, ... ] }`
///
/// Anything else is rejected as a whole; a single bad entry rejects the
/// whole payload so a partial snapshot is never produced.
use super::types::{PoolRecord, RawPool};
use crate::errors::DataError;
use crate::logger::{self, LogTag};
use serde_json::Value;

/// Parse a raw response body into normalized records
pub fn parse_pools_payload(body: &str) -> Result<Vec<PoolRecord>, DataError> {
    let root: Value =
        serde_json::from_str(body).map_err(|e| DataError::InvalidJson(e.to_string()))?;
    parse_pools_value(root)
}

/// Same as [`parse_pools_payload`] for an already-decoded JSON value
pub fn parse_pools_value(root: Value) -> Result<Vec<PoolRecord>, DataError> {
    let entries = match root {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(DataError::UnexpectedShape(format!(
                    "'data' is {}, expected an array",
                    json_type_name(&other)
                )))
            }
            None => {
                return Err(DataError::UnexpectedShape(
                    "object without a 'data' field".to_string(),
                ))
            }
        },
        other => {
            return Err(DataError::UnexpectedShape(format!(
                "top-level {}, expected an array or an object with 'data'",
                json_type_name(&other)
            )))
        }
    };

    let records = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<RawPool>(entry)
                .map(PoolRecord::from)
                .map_err(|e| DataError::InvalidRecord {
                    index,
                    message: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let unnamed = records.iter().filter(|r| !r.has_project()).count();
    logger::debug(
        LogTag::Pools,
        &format!(
            "Parsed {} pool records ({} without a project)",
            records.len(),
            unnamed
        ),
    );

    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
