use serde_json::Value;

use super::error::truncate_body;
use super::{DecodeError, GtpServiceError};

/// Message the API gateway puts in a successful response when the upstream
/// computation did not finish in time.
pub(crate) const ENDPOINT_TIMEOUT_MESSAGE: &str = "Endpoint request timed out";

const ERROR_KEY: &str = "error";
const MESSAGE_KEY: &str = "message";

/// Decodes a successful response body.
pub(crate) fn decode(operation: &str, body: String) -> Result<Value, GtpServiceError> {
    serde_json::from_str(&body).map_err(|error| {
        DecodeError::InvalidJson {
            operation: operation.to_string(),
            error,
            body: truncate_body(body),
        }
        .into()
    })
}

/// Classifies a decoded body before any field access.
///
/// The gateway timeout signal wins over an `error` field.
pub(crate) fn classify(operation: &str, payload: Value) -> Result<Value, GtpServiceError> {
    let Some(object) = payload.as_object() else {
        return Ok(payload);
    };

    if object.get(MESSAGE_KEY).and_then(Value::as_str) == Some(ENDPOINT_TIMEOUT_MESSAGE) {
        return Err(GtpServiceError::GatewayTimeout {
            operation: operation.to_string(),
        });
    }

    if let Some(error) = object.get(ERROR_KEY) {
        let message = match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };
        return Err(GtpServiceError::Remote {
            operation: operation.to_string(),
            message,
            error: error.clone(),
        });
    }

    Ok(payload)
}

/// Splits a `describe` payload into its elements.
pub(crate) fn into_array(operation: &str, payload: Value) -> Result<Vec<Value>, GtpServiceError> {
    match payload {
        Value::Array(items) => Ok(items),
        _ => Err(DecodeError::UnexpectedShape {
            operation: operation.to_string(),
            expected: "a JSON array of results",
        }
        .into()),
    }
}
