//! # GTP Service SDK
//!
//! Client library for the GTP geothermal simulation service.
//!
//! The service runs two simulation families:
//! - **GEOPHIRES** - techno-economic simulation of geothermal plants, with
//!   stored results that can be listed, shared, updated and deleted
//! - **HIP-RA** - heat-in-place resource assessment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gtp_service_sdk::{GeophiresParameters, GeophiresRequest, GtpServiceClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GtpServiceClient::builder()
//!     .with_endpoint("https://gtp.example.com")
//!     .build()?; // logs in with GTP_SERVICE_USERNAME / GTP_SERVICE_PASSWORD on first call
//!
//! let request = GeophiresRequest::new(
//!     GeophiresParameters::new()
//!         .with_reservoir_model(1)
//!         .with_reservoir_depth(3)
//!         .with_gradient_1(50)
//!         .with_maximum_temperature(400),
//! );
//!
//! let result = client.create_geophires_result(&request).await?;
//! println!("stored as {}", result.result_id()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Parameters
//!
//! [`Parameters`] keeps insertion order and last-write-wins semantics. Named
//! setters are shorthands for [`Parameters::with_parameter`]; the
//! [`parameters!`] macro builds a set in one expression:
//!
//! ```rust
//! use gtp_service_sdk::{GeophiresParameters, parameters};
//!
//! let from_macro: GeophiresParameters = parameters! {
//!     "Gradient 1" => 50,
//!     "Maximum Temperature" => 300,
//! };
//! let from_setters = GeophiresParameters::new()
//!     .with_gradient_1(50)
//!     .with_maximum_temperature(300);
//! assert_eq!(from_macro, from_setters);
//! ```
//!
//! ## Authentication
//!
//! - [`GtpServiceClientBuilder::with_bearer_token`] - `Authorization: Bearer <token>`
//! - [`GtpServiceClientBuilder::with_api_key`] - legacy `x-api-key: <key>`
//! - [`GtpServiceClientBuilder::with_login`] - Cognito SRP login with
//!   credentials read from the environment, see [`credentials`]
//!
//! ## Errors
//!
//! Every operation returns a [`GtpServiceError`]. Besides transport and
//! decoding failures, the service reports two failures inside successful
//! responses: [`GtpServiceError::GatewayTimeout`] and [`GtpServiceError::Remote`].
//!
//! ## Blocking API
//!
//! With the `blocking` feature, [`blocking::GtpServiceClient`] exposes the
//! same operations as blocking calls.

mod client;
pub use self::client::{
    Authentication, DEFAULT_API_KEY_HEADER, DEFAULT_PATH_PREFIX, DEFAULT_TIMEOUT, DecodeError,
    ENDPOINT_VAR, GtpServiceClient, GtpServiceClientBuilder, GtpServiceError, RetryPolicy,
    SecureString, TransportError, is_retryable_status,
};

pub use self::client::credentials;
pub use self::client::credentials::{
    CognitoSrpLogin, CredentialError, CredentialProvider, IdentityProvider, LoginConfig,
    LoginRequest,
};

mod model;
pub use self::model::{
    DescribeResultsRequest, Geophires, GeophiresParameters, GeophiresRequest, GeophiresResult,
    HipRa, HipRaParameters, HipRaRequest, HipRaResult, ParameterValue, Parameters,
    ReservoirModel, ResultIdRequest, SharePolicy, SimulationFamily, SimulationRequest,
    SimulationResult, UpdateResultRequest,
};

#[cfg(feature = "blocking")]
pub mod blocking;

/// Builds a [`Parameters`] set from `name => value` pairs.
///
/// Values go through [`ParameterValue::from`], so any type accepted by
/// [`Parameters::with_parameter`] works. The family is inferred from the
/// context.
///
/// # Examples
///
/// ```rust
/// use gtp_service_sdk::{HipRaRequest, ParameterValue, parameters};
///
/// let request = HipRaRequest::new(parameters! {
///     "Reservoir Temperature" => 250.0,
///     "Rejection Temperature" => 60.0,
///     "Reservoir Porosity" => 10.0,
/// });
/// assert_eq!(
///     request.parameters().get("Reservoir Porosity"),
///     Some(&ParameterValue::Float(10.0))
/// );
/// ```
#[macro_export]
macro_rules! parameters {
    () => {
        $crate::Parameters::new()
    };

    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut parameters = $crate::Parameters::new();
        $(
            parameters.set_parameter($name, $value);
        )+
        parameters
    }};
}
