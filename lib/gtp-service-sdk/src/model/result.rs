use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Geophires, HipRa, SimulationFamily};
use crate::client::DecodeError;

/// Key of the result identifier returned by `create` operations.
const RESULT_ID_KEY: &str = "ResultId";

/// Key of the result identifier echoed back by `update`/`delete` operations.
const RESULT_ID_SNAKE_KEY: &str = "result_id";

/// A decoded response of the simulation service.
///
/// The raw JSON payload is kept as received; accessors read well-known fields
/// without copying or filtering the rest.
///
/// # Example
///
/// ```rust
/// use gtp_service_sdk::GeophiresResult;
/// use serde_json::json;
///
/// let result = GeophiresResult::new(json!({ "ResultId": "abc123" }));
/// assert_eq!(result.result_id()?, "abc123");
/// # Ok::<(), gtp_service_sdk::DecodeError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult<F> {
    raw: Value,
    family: PhantomData<F>,
}

/// A GEOPHIRES simulation result.
pub type GeophiresResult = SimulationResult<Geophires>;

/// A HIP-RA analysis result.
pub type HipRaResult = SimulationResult<HipRa>;

impl<F: SimulationFamily> SimulationResult<F> {
    /// Wraps a decoded JSON payload.
    pub fn new(raw: Value) -> Self {
        Self {
            raw,
            family: PhantomData,
        }
    }

    /// Returns the stored result identifier.
    ///
    /// Reads `"ResultId"`, falling back to `"result_id"`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingField`] if neither key is present and
    /// [`DecodeError::UnexpectedType`] if the identifier is not a string.
    pub fn result_id(&self) -> Result<&str, DecodeError> {
        let value = self
            .raw
            .get(RESULT_ID_KEY)
            .map(|value| (RESULT_ID_KEY, value))
            .or_else(|| {
                self.raw
                    .get(RESULT_ID_SNAKE_KEY)
                    .map(|value| (RESULT_ID_SNAKE_KEY, value))
            });

        match value {
            Some((_, Value::String(id))) => Ok(id),
            Some((field, _)) => Err(DecodeError::UnexpectedType {
                field: field.to_string(),
                expected: "string",
            }),
            None => Err(DecodeError::MissingField {
                field: RESULT_ID_KEY,
            }),
        }
    }

    /// Returns a top-level field of the payload.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Returns the raw payload.
    pub fn as_json(&self) -> &Value {
        &self.raw
    }

    /// Consumes the result and returns the raw payload.
    pub fn into_json(self) -> Value {
        self.raw
    }

    /// Deserializes the payload into a typed structure.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Deserialize`] with the JSON path of the first
    /// mismatch.
    pub fn deserialize<T>(&self) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        serde_path_to_error::deserialize(&self.raw).map_err(|err| {
            let path = err.path().to_string();
            DecodeError::Deserialize {
                path,
                error: err.into_inner(),
            }
        })
    }
}

impl SimulationResult<Geophires> {
    /// Returns the GEOPHIRES simulation output.
    pub fn simulation_result(&self) -> &Value {
        &self.raw
    }
}

impl SimulationResult<HipRa> {
    /// Returns the HIP-RA analysis output.
    pub fn hip_ra_result(&self) -> &Value {
        &self.raw
    }
}
