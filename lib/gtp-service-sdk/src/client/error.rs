use super::credentials::CredentialError;

/// Maximum length of a response body embedded in an error.
pub(crate) const BODY_MAX_LENGTH: usize = 1024;

/// Errors that can occur when calling the GTP service.
///
/// The variants follow how the failure was detected: local configuration,
/// credential exchange, transport, and the two failure signals the service
/// encodes inside successful responses.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum GtpServiceError {
    /// The client is misconfigured.
    ///
    /// Occurs when credentials are missing from the environment, when the
    /// endpoint is not a valid URL, or when a header cannot be built.
    #[display("Configuration error: {reason}")]
    #[from(skip)]
    Configuration {
        /// Description of the configuration issue.
        reason: String,
    },

    /// A parameter value cannot be sent to the service.
    #[display("Invalid parameter '{name}': {reason}")]
    #[from(skip)]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The identity provider rejected the login exchange.
    #[display("Authentication failed: {_0}")]
    #[from(skip)]
    Authentication(CredentialError),

    /// The HTTP call failed, including after exhausting retries.
    #[display("Transport error: {_0}")]
    Transport(TransportError),

    /// The service answered with a success status but reported that the
    /// upstream computation timed out.
    #[display("Gateway timeout on '{operation}': Endpoint request timed out")]
    #[from(skip)]
    GatewayTimeout {
        /// The operation path that timed out.
        operation: String,
    },

    /// The service reported an error in the response body.
    #[display("Remote error on '{operation}': {message}")]
    #[from(skip)]
    Remote {
        /// The operation path that failed.
        operation: String,
        /// The error message, verbatim when the service sent a string.
        message: String,
        /// The raw `error` value.
        error: serde_json::Value,
    },

    /// The response could not be decoded.
    #[display("Decode error: {_0}")]
    Decode(DecodeError),
}

impl GtpServiceError {
    /// Returns `true` for per-call timeouts and in-body gateway timeouts.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::GatewayTimeout { .. } => true,
            Self::Transport(TransportError::Network(err)) => err.is_timeout(),
            _ => false,
        }
    }

    /// Returns the remote error message, if this is a [`GtpServiceError::Remote`].
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GtpServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(TransportError::Network(err))
    }
}

impl From<url::ParseError> for GtpServiceError {
    fn from(err: url::ParseError) -> Self {
        Self::Configuration {
            reason: format!("invalid URL: {err}"),
        }
    }
}

impl From<CredentialError> for GtpServiceError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Configuration { reason } => Self::Configuration { reason },
            CredentialError::Network(err) => Self::Transport(TransportError::Network(err)),
            other => Self::Authentication(other),
        }
    }
}

/// HTTP-level failures.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum TransportError {
    /// Network failure or per-call timeout from the underlying reqwest client.
    #[display("{_0}")]
    Network(reqwest::Error),

    /// The service kept answering with a retryable status.
    #[display("Status code {status_code} after {attempts} attempts: {body}")]
    RetriesExhausted {
        /// The last status code received.
        status_code: u16,
        /// Number of attempts made.
        attempts: usize,
        /// The last response body, truncated.
        body: String,
    },

    /// The service answered with a status that is neither a success nor retryable.
    #[display("Unexpected status code {status_code}: {body}")]
    UnexpectedStatusCode {
        /// The status code received.
        status_code: u16,
        /// The response body, truncated.
        body: String,
    },
}

impl TransportError {
    /// Returns the HTTP status code, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Network(err) => err.status().map(|status| status.as_u16()),
            Self::RetriesExhausted { status_code, .. }
            | Self::UnexpectedStatusCode { status_code, .. } => Some(*status_code),
        }
    }
}

/// Failures decoding a response body or reading a typed field.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[display("Invalid JSON from '{operation}': {error}\n{body}")]
    InvalidJson {
        /// The operation path.
        operation: String,
        /// The underlying JSON error.
        error: serde_json::Error,
        /// The body that failed to parse, truncated.
        body: String,
    },

    /// An expected field is absent.
    #[display("Missing field '{field}'")]
    MissingField {
        /// The field name.
        field: &'static str,
    },

    /// A field has an unexpected JSON type.
    #[display("Field '{field}' should be a {expected}")]
    UnexpectedType {
        /// The field name.
        field: String,
        /// The expected JSON type.
        expected: &'static str,
    },

    /// The payload does not have the expected overall shape.
    #[display("Unexpected payload from '{operation}': expected {expected}")]
    UnexpectedShape {
        /// The operation path.
        operation: String,
        /// Description of the expected shape.
        expected: &'static str,
    },

    /// The payload does not match the requested type.
    #[display("Failed to deserialize at '{path}': {error}")]
    Deserialize {
        /// JSON path of the mismatch.
        path: String,
        /// The underlying error.
        error: serde_json::Error,
    },
}

/// Truncates a response body before embedding it in an error.
pub(crate) fn truncate_body(body: String) -> String {
    if body.len() > BODY_MAX_LENGTH {
        let mut end = BODY_MAX_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body
    }
}
