use std::fmt;

use http::HeaderValue;
use reqwest::header::{AUTHORIZATION, HeaderName};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::GtpServiceError;

/// Header used by the legacy API key scheme.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Secure wrapper for tokens, keys and passwords.
///
/// Memory is zeroed on drop, `Debug` output is redacted and `Display` output
/// is masked, so credentials never leak into logs.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// The returned reference should not be stored for extended periods.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if the secure string equals the given string slice.
    pub fn equals_str(&self, other: &str) -> bool {
        self.0 == other
    }

    /// Returns `true` if the value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn mask_sensitive(value: &str) -> String {
        if value.len() <= 8
            || !value.is_char_boundary(4)
            || !value.is_char_boundary(value.len() - 4)
        {
            "***".to_string()
        } else {
            format!("{}...{}", &value[..4], &value[value.len() - 4..])
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// How requests to the service are authenticated.
///
/// # Examples
///
/// ```rust
/// use gtp_service_sdk::Authentication;
///
/// // Current scheme: `Authorization: Bearer <token>`
/// let auth = Authentication::Bearer("my-access-token".into());
///
/// // Legacy scheme: `x-api-key: <key>`
/// let auth = Authentication::api_key("my-api-key");
/// ```
#[derive(Clone)]
pub enum Authentication {
    /// Adds an `Authorization: Bearer <token>` header.
    Bearer(SecureString),

    /// Adds a `<header_name>: <key>` header.
    ApiKey {
        /// The header name, `x-api-key` by default.
        header_name: String,
        /// The API key value.
        key: SecureString,
    },
}

impl Authentication {
    /// Creates an API key authentication using the `x-api-key` header.
    pub fn api_key(key: impl Into<SecureString>) -> Self {
        Self::ApiKey {
            header_name: DEFAULT_API_KEY_HEADER.to_string(),
            key: key.into(),
        }
    }

    /// Converts the authentication into an HTTP header.
    ///
    /// # Errors
    ///
    /// Returns [`GtpServiceError::Configuration`] if the header name or value
    /// contains characters not allowed in HTTP headers.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), GtpServiceError> {
        match self {
            Self::Bearer(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|err| GtpServiceError::Configuration {
                        reason: format!("bearer token contains invalid characters: {err}"),
                    })?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }
            Self::ApiKey { header_name, key } => {
                let header = HeaderName::from_bytes(header_name.as_bytes()).map_err(|err| {
                    GtpServiceError::Configuration {
                        reason: format!("invalid API key header name '{header_name}': {err}"),
                    }
                })?;
                let mut value = HeaderValue::from_str(key.as_str()).map_err(|err| {
                    GtpServiceError::Configuration {
                        reason: format!("API key contains invalid characters: {err}"),
                    }
                })?;
                value.set_sensitive(true);
                Ok((header, value))
            }
        }
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::ApiKey { header_name, .. } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("key", &"[REDACTED]")
                .finish(),
        }
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => write!(f, "Bearer {token}"),
            Self::ApiKey { header_name, key } => write!(f, "ApiKey ({header_name}: {key})"),
        }
    }
}
