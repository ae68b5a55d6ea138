use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Geophires, HipRa, Parameters, SimulationFamily};

/// A simulation request wrapping one parameter set.
///
/// The request body is `{ "<family>_input_parameters": { ... } }`, with the
/// parameters embedded verbatim.
///
/// # Example
///
/// ```rust
/// use gtp_service_sdk::{GeophiresParameters, GeophiresRequest};
///
/// let request = GeophiresRequest::new(
///     GeophiresParameters::new()
///         .with_gradient_1(50)
///         .with_maximum_temperature(300),
/// );
/// assert_eq!(request.parameters().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest<F: SimulationFamily> {
    parameters: Parameters<F>,
}

/// A GEOPHIRES simulation request.
pub type GeophiresRequest = SimulationRequest<Geophires>;

/// A HIP-RA analysis request.
pub type HipRaRequest = SimulationRequest<HipRa>;

impl<F: SimulationFamily> SimulationRequest<F> {
    /// Creates a request from a parameter set.
    pub fn new(parameters: Parameters<F>) -> Self {
        Self { parameters }
    }

    /// Returns the wrapped parameters.
    pub fn parameters(&self) -> &Parameters<F> {
        &self.parameters
    }

    /// Consumes the request and returns the wrapped parameters.
    pub fn into_parameters(self) -> Parameters<F> {
        self.parameters
    }

    pub(crate) fn to_body(&self) -> Result<Value, serde_json::Error> {
        let mut body = Map::new();
        body.insert(
            F::INPUT_KEY.to_string(),
            serde_json::to_value(&self.parameters)?,
        );
        Ok(Value::Object(body))
    }
}

impl<F: SimulationFamily> From<Parameters<F>> for SimulationRequest<F> {
    fn from(parameters: Parameters<F>) -> Self {
        Self::new(parameters)
    }
}

/// Filter for listing stored results.
///
/// Without a result id every result of the caller is described.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DescribeResultsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    result_id: Option<String>,
}

impl DescribeResultsRequest {
    /// Describes all results.
    pub fn all() -> Self {
        Self::default()
    }

    /// Describes a single result.
    pub fn for_result(result_id: impl Into<String>) -> Self {
        Self {
            result_id: Some(result_id.into()),
        }
    }

    /// Returns the result id filter, if any.
    pub fn result_id(&self) -> Option<&str> {
        self.result_id.as_deref()
    }
}

/// Request addressing one stored result by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultIdRequest {
    result_id: String,
}

impl ResultIdRequest {
    /// Creates a request for the given result id.
    pub fn new(result_id: impl Into<String>) -> Self {
        Self {
            result_id: result_id.into(),
        }
    }

    /// Returns the result id.
    pub fn result_id(&self) -> &str {
        &self.result_id
    }
}

impl From<&str> for ResultIdRequest {
    fn from(result_id: &str) -> Self {
        Self::new(result_id)
    }
}

impl From<String> for ResultIdRequest {
    fn from(result_id: String) -> Self {
        Self::new(result_id)
    }
}

/// Visibility of a stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SharePolicy {
    /// Anyone with the result id can read it (`"*"` on the wire).
    #[serde(rename = "*")]
    Public,
    /// Only the owner can read it (`""` on the wire).
    #[serde(rename = "")]
    Private,
}

impl SharePolicy {
    /// Returns the wire value of the policy.
    pub fn as_wire_value(self) -> &'static str {
        match self {
            Self::Public => "*",
            Self::Private => "",
        }
    }
}

/// Update of a stored result's description and/or share policy.
///
/// Unset optional fields are left out of the request body.
///
/// ```rust
/// use gtp_service_sdk::{SharePolicy, UpdateResultRequest};
///
/// let update = UpdateResultRequest::new("abc123")
///     .with_description("Fervo Cape Station")
///     .with_share_policy(SharePolicy::Public);
/// assert_eq!(update.share_policy(), Some(SharePolicy::Public));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResultRequest {
    result_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    share_policy: Option<SharePolicy>,
}

impl UpdateResultRequest {
    /// Creates an update that changes nothing yet.
    pub fn new(result_id: impl Into<String>) -> Self {
        Self {
            result_id: result_id.into(),
            description: None,
            share_policy: None,
        }
    }

    /// Sets the new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the new share policy.
    #[must_use]
    pub fn with_share_policy(mut self, share_policy: SharePolicy) -> Self {
        self.share_policy = Some(share_policy);
        self
    }

    /// Returns the result id.
    pub fn result_id(&self) -> &str {
        &self.result_id
    }

    /// Returns the new description, if set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the new share policy, if set.
    pub fn share_policy(&self) -> Option<SharePolicy> {
        self.share_policy
    }
}
