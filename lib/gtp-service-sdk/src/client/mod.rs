use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use backon::Retryable;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::model::{
    DescribeResultsRequest, Geophires, GeophiresRequest, GeophiresResult, HipRa, HipRaRequest,
    HipRaResult, ResultIdRequest, SimulationFamily, SimulationRequest, SimulationResult,
    UpdateResultRequest,
};

mod builder;
pub use self::builder::{
    DEFAULT_PATH_PREFIX, DEFAULT_TIMEOUT, ENDPOINT_VAR, GtpServiceClientBuilder,
};

mod auth;
pub use self::auth::{Authentication, DEFAULT_API_KEY_HEADER, SecureString};

pub mod credentials;
use self::credentials::CredentialProvider;

mod error;
pub use self::error::{DecodeError, GtpServiceError, TransportError};

mod response;

mod retry;
pub use self::retry::{RetryPolicy, is_retryable_status};

const DESCRIBE_GEOPHIRES_RESULTS: &str = "describe-geophires-results";
const GET_SHARED_GEOPHIRES_RESULT: &str = "get-shared-geophires-result";
const UPDATE_GEOPHIRES_RESULT: &str = "update-geophires-result";
const DELETE_GEOPHIRES_RESULT: &str = "delete-geophires-result";

/// Async client of the GTP simulation service.
///
/// Every operation posts a JSON body to `{endpoint}{prefix}/{operation}` with
/// the resolved credentials, retries gateway failures according to the
/// [`RetryPolicy`], then classifies the decoded body: an in-body timeout
/// becomes [`GtpServiceError::GatewayTimeout`] and an in-body `error` becomes
/// [`GtpServiceError::Remote`]. Bodies of non-retryable error statuses are
/// classified the same way before falling back to
/// [`TransportError::UnexpectedStatusCode`].
///
/// Clones share the connection pool and the cached credentials.
///
/// # Example
///
/// ```rust,no_run
/// use gtp_service_sdk::{GeophiresParameters, GeophiresRequest, GtpServiceClient, ReservoirModel};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GtpServiceClient::builder()
///     .with_endpoint("https://gtp.example.com")
///     .with_bearer_token("my-access-token")
///     .build()?;
///
/// let request = GeophiresRequest::new(
///     GeophiresParameters::new()
///         .with_reservoir_model(ReservoirModel::SingleFractureDrawdown)
///         .with_gradient_1(50)
///         .with_maximum_temperature(300),
/// );
/// let result = client.get_geophires_result(&request).await?;
/// println!("{}", result.simulation_result());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GtpServiceClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    retry_policy: RetryPolicy,
    credentials: CredentialProvider,
}

impl GtpServiceClient {
    /// Creates a builder, see [`GtpServiceClientBuilder`].
    pub fn builder() -> GtpServiceClientBuilder {
        GtpServiceClientBuilder::default()
    }

    /// Returns the URL operations are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Returns the credential provider.
    pub fn credentials(&self) -> &CredentialProvider {
        &self.credentials
    }

    /// Runs a simulation of any family through `get-{family}-result`.
    ///
    /// # Errors
    ///
    /// See [`GtpServiceError`].
    pub async fn get_result<F>(
        &self,
        request: &SimulationRequest<F>,
    ) -> Result<SimulationResult<F>, GtpServiceError>
    where
        F: SimulationFamily,
    {
        let operation = format!("get-{}-result", F::PATH_NAME);
        let body = request_body(&operation, request.to_body())?;
        let payload = self.post_json(&operation, &body).await?;
        Ok(SimulationResult::new(payload))
    }

    /// Runs a GEOPHIRES simulation.
    ///
    /// # Errors
    ///
    /// See [`GtpServiceError`].
    pub async fn get_geophires_result(
        &self,
        request: &GeophiresRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        self.get_result::<Geophires>(request).await
    }

    /// Runs a HIP-RA analysis.
    ///
    /// # Errors
    ///
    /// See [`GtpServiceError`].
    pub async fn get_hip_ra_result(
        &self,
        request: &HipRaRequest,
    ) -> Result<HipRaResult, GtpServiceError> {
        self.get_result::<HipRa>(request).await
    }

    /// Runs a GEOPHIRES simulation and stores its result.
    ///
    /// # Errors
    ///
    /// Besides the errors of every call, returns [`DecodeError::MissingField`]
    /// if the response carries no `ResultId`.
    pub async fn create_geophires_result(
        &self,
        request: &GeophiresRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        let operation = format!("create-{}-result", Geophires::PATH_NAME);
        let body = request_body(&operation, request.to_body())?;
        let payload = self.post_json(&operation, &body).await?;
        with_result_id(GeophiresResult::new(payload))
    }

    /// Lists stored GEOPHIRES results, optionally filtered by id.
    ///
    /// # Errors
    ///
    /// Besides the errors of every call, returns
    /// [`DecodeError::UnexpectedShape`] if the response is not a JSON array.
    pub async fn describe_geophires_results(
        &self,
        request: &DescribeResultsRequest,
    ) -> Result<Vec<GeophiresResult>, GtpServiceError> {
        let body = request_body(DESCRIBE_GEOPHIRES_RESULTS, serde_json::to_value(request))?;
        let payload = self.post_json(DESCRIBE_GEOPHIRES_RESULTS, &body).await?;
        let items = response::into_array(DESCRIBE_GEOPHIRES_RESULTS, payload)?;
        Ok(items.into_iter().map(GeophiresResult::new).collect())
    }

    /// Fetches a GEOPHIRES result shared by its owner.
    ///
    /// # Errors
    ///
    /// See [`GtpServiceError`].
    pub async fn get_shared_geophires_result(
        &self,
        request: &ResultIdRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        self.post_result(GET_SHARED_GEOPHIRES_RESULT, request).await
    }

    /// Updates the description or share policy of a stored GEOPHIRES result.
    ///
    /// # Errors
    ///
    /// Besides the errors of every call, returns [`DecodeError::MissingField`]
    /// if the response does not echo the result id.
    pub async fn update_geophires_result(
        &self,
        request: &UpdateResultRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        let result = self.post_result(UPDATE_GEOPHIRES_RESULT, request).await?;
        with_result_id(result)
    }

    /// Deletes a stored GEOPHIRES result.
    ///
    /// # Errors
    ///
    /// Besides the errors of every call, returns [`DecodeError::MissingField`]
    /// if the response does not echo the result id.
    pub async fn delete_geophires_result(
        &self,
        request: &ResultIdRequest,
    ) -> Result<GeophiresResult, GtpServiceError> {
        let result = self.post_result(DELETE_GEOPHIRES_RESULT, request).await?;
        with_result_id(result)
    }

    async fn post_result<T>(
        &self,
        operation: &str,
        request: &T,
    ) -> Result<GeophiresResult, GtpServiceError>
    where
        T: Serialize,
    {
        let body = request_body(operation, serde_json::to_value(request))?;
        let payload = self.post_json(operation, &body).await?;
        Ok(GeophiresResult::new(payload))
    }

    /// Posts `body` to `operation`, retrying gateway failures, then decodes
    /// and classifies the response.
    async fn post_json(&self, operation: &str, body: &Value) -> Result<Value, GtpServiceError> {
        let url = self.base_url.join(operation)?;
        let (auth_header, auth_value) = self.credentials.resolve().await?.to_header()?;
        let attempts = AtomicUsize::new(0);

        let send = || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(%url, operation, attempt, "sending request");
            let request = self
                .client
                .post(url.clone())
                .timeout(self.timeout)
                .header(auth_header.clone(), auth_value.clone())
                .json(body);

            async move {
                let response = request.send().await.map_err(AttemptError::Network)?;
                let status = response.status();
                let text = response.text().await.map_err(AttemptError::Network)?;
                debug!(operation, %status, attempt, "received response");

                if is_retryable_status(status) {
                    return Err(AttemptError::Status { status, body: text });
                }
                Ok((status, text))
            }
        };

        let (status, text) = send
            .retry(self.retry_policy.backoff())
            .when(AttemptError::is_retryable)
            .notify(|err, delay| warn!(operation, ?delay, %err, "retrying request"))
            .await
            .map_err(|err| err.into_transport_error(attempts.load(Ordering::Relaxed)))?;

        if !status.is_success() {
            return Err(unexpected_status(operation, status, text));
        }

        let payload = response::decode(operation, text)?;
        response::classify(operation, payload)
    }
}

/// Failure of a single attempt, before retries are exhausted.
#[derive(Debug)]
enum AttemptError {
    Network(reqwest::Error),
    Status { status: StatusCode, body: String },
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network(err) => err.is_connect(),
            Self::Status { .. } => true,
        }
    }

    fn into_transport_error(self, attempts: usize) -> TransportError {
        match self {
            Self::Network(err) => TransportError::Network(err),
            Self::Status { status, body } => TransportError::RetriesExhausted {
                status_code: status.as_u16(),
                attempts,
                body: error::truncate_body(body),
            },
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(err) => write!(f, "{err}"),
            Self::Status { status, .. } => write!(f, "status {status}"),
        }
    }
}

/// Classifies the body of a non-retryable error status.
///
/// The in-body signals win; anything else is an unexpected status.
fn unexpected_status(operation: &str, status: StatusCode, text: String) -> GtpServiceError {
    if let Ok(payload) = serde_json::from_str::<Value>(&text)
        && let Err(err) = response::classify(operation, payload)
    {
        return err;
    }

    TransportError::UnexpectedStatusCode {
        status_code: status.as_u16(),
        body: error::truncate_body(text),
    }
    .into()
}

fn request_body(
    operation: &str,
    body: Result<Value, serde_json::Error>,
) -> Result<Value, GtpServiceError> {
    body.map_err(|err| GtpServiceError::Configuration {
        reason: format!("cannot serialize the '{operation}' request: {err}"),
    })
}

fn with_result_id(result: GeophiresResult) -> Result<GeophiresResult, GtpServiceError> {
    result.result_id()?;
    Ok(result)
}
