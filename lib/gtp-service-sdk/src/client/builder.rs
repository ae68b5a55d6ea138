use std::time::Duration;

use url::Url;

use super::auth::DEFAULT_API_KEY_HEADER;
use super::credentials::{CredentialProvider, LoginConfig};
use super::{Authentication, GtpServiceClient, GtpServiceError, RetryPolicy, SecureString};

/// Environment variable read by [`GtpServiceClientBuilder::from_env`].
pub const ENDPOINT_VAR: &str = "GTP_SERVICE_ENDPOINT";

/// Path prefix of the versioned API.
pub const DEFAULT_PATH_PREFIX: &str = "/v1";

/// Per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
enum CredentialSetting {
    Login(LoginConfig),
    Bearer(SecureString),
    ApiKey(SecureString),
    Provider(CredentialProvider),
}

/// Builder for [`GtpServiceClient`].
///
/// # Default Configuration
///
/// - **Endpoint**: none, it must be set with [`with_endpoint`](Self::with_endpoint)
///   or read from `GTP_SERVICE_ENDPOINT` by [`from_env`](Self::from_env)
/// - **Path prefix**: `/v1`
/// - **Timeout**: 30 seconds per call
/// - **Retry policy**: [`RetryPolicy::default`], 3 attempts
/// - **Credentials**: login with `GTP_SERVICE_USERNAME` / `GTP_SERVICE_PASSWORD`
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use gtp_service_sdk::GtpServiceClient;
///
/// # fn example() -> Result<(), gtp_service_sdk::GtpServiceError> {
/// let client = GtpServiceClient::builder()
///     .with_endpoint("https://gtp.example.com")
///     .with_timeout(Duration::from_secs(60))
///     .with_bearer_token("my-access-token")
///     .build()?;
/// assert_eq!(client.base_url().as_str(), "https://gtp.example.com/v1/");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GtpServiceClientBuilder {
    client: Option<reqwest::Client>,
    endpoint: Option<String>,
    path_prefix: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
    credentials: CredentialSetting,
    api_key_header: String,
}

impl Default for GtpServiceClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            endpoint: None,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            credentials: CredentialSetting::Login(LoginConfig::default()),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }
}

impl GtpServiceClientBuilder {
    /// Creates a builder with the endpoint read from `GTP_SERVICE_ENDPOINT`, if set.
    pub fn from_env() -> Self {
        let builder = Self::default();
        match std::env::var(ENDPOINT_VAR) {
            Ok(endpoint) if !endpoint.is_empty() => builder.with_endpoint(endpoint),
            _ => builder,
        }
    }

    /// Sets the service endpoint, e.g. `https://gtp.example.com`.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the path prefix, `/v1` by default.
    ///
    /// Use an empty prefix for the unversioned API.
    #[must_use]
    pub fn with_path_prefix(mut self, path_prefix: impl Into<String>) -> Self {
        self.path_prefix = path_prefix.into();
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Authenticates with `Authorization: Bearer <token>`, skipping the login.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<SecureString>) -> Self {
        self.credentials = CredentialSetting::Bearer(token.into());
        self
    }

    /// Authenticates with the legacy `x-api-key: <key>` header, skipping the login.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<SecureString>) -> Self {
        self.credentials = CredentialSetting::ApiKey(key.into());
        self
    }

    /// Changes the header used by [`with_api_key`](Self::with_api_key).
    #[must_use]
    pub fn with_api_key_header(mut self, header_name: impl Into<String>) -> Self {
        self.api_key_header = header_name.into();
        self
    }

    /// Logs in with the given configuration on first use.
    #[must_use]
    pub fn with_login(mut self, login: LoginConfig) -> Self {
        self.credentials = CredentialSetting::Login(login);
        self
    }

    /// Uses an existing credential provider, sharing its token cache.
    #[must_use]
    pub fn with_credential_provider(mut self, provider: CredentialProvider) -> Self {
        self.credentials = CredentialSetting::Provider(provider);
        self
    }

    /// Uses the given HTTP client, sharing its connection pool.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the client.
    ///
    /// No network call is made: the login, if any, happens on first use.
    ///
    /// # Errors
    ///
    /// Returns [`GtpServiceError::Configuration`] if no endpoint is set or if
    /// the endpoint and path prefix do not form a valid URL.
    pub fn build(self) -> Result<GtpServiceClient, GtpServiceError> {
        let Self {
            client,
            endpoint,
            path_prefix,
            timeout,
            retry_policy,
            credentials,
            api_key_header,
        } = self;

        let endpoint = endpoint.ok_or_else(|| GtpServiceError::Configuration {
            reason: format!(
                "no service endpoint configured, use `with_endpoint` or set {ENDPOINT_VAR}"
            ),
        })?;
        let base_url = base_url(&endpoint, &path_prefix)?;

        let client = client.unwrap_or_default();
        let credentials = match credentials {
            CredentialSetting::Login(login) => CredentialProvider::login(login, client.clone()),
            CredentialSetting::Bearer(token) => {
                CredentialProvider::explicit(Authentication::Bearer(token))
            }
            CredentialSetting::ApiKey(key) => CredentialProvider::explicit(Authentication::ApiKey {
                header_name: api_key_header,
                key,
            }),
            CredentialSetting::Provider(provider) => provider,
        };

        Ok(GtpServiceClient {
            client,
            base_url,
            timeout,
            retry_policy,
            credentials,
        })
    }
}

/// Joins the endpoint and the prefix into a base URL ending with `/`.
fn base_url(endpoint: &str, path_prefix: &str) -> Result<Url, GtpServiceError> {
    let endpoint = endpoint.trim_end_matches('/');
    let prefix = path_prefix.trim_matches('/');
    let raw = if prefix.is_empty() {
        format!("{endpoint}/")
    } else {
        format!("{endpoint}/{prefix}/")
    };

    let url = Url::parse(&raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GtpServiceError::Configuration {
            reason: format!("endpoint '{endpoint}' should use http or https"),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::versioned("https://gtp.example.com", "/v1", "https://gtp.example.com/v1/")]
    #[case::trailing_slash("https://gtp.example.com/", "/v1", "https://gtp.example.com/v1/")]
    #[case::bare_prefix("https://gtp.example.com", "v1/", "https://gtp.example.com/v1/")]
    #[case::unversioned("https://gtp.example.com/prod", "", "https://gtp.example.com/prod/")]
    #[case::local("http://127.0.0.1:8080", "/v2", "http://127.0.0.1:8080/v2/")]
    fn should_build_base_url(#[case] endpoint: &str, #[case] prefix: &str, #[case] expected: &str) {
        let url = base_url(endpoint, prefix).expect("valid base url");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    #[case::not_a_url("gtp.example.com")]
    #[case::ftp("ftp://gtp.example.com")]
    fn should_reject_invalid_endpoint(#[case] endpoint: &str) {
        let error = base_url(endpoint, DEFAULT_PATH_PREFIX).expect_err("invalid endpoint");
        assert!(matches!(error, GtpServiceError::Configuration { .. }));
    }

    #[test]
    fn should_require_endpoint() {
        let error = GtpServiceClientBuilder::default()
            .with_bearer_token("T")
            .build()
            .expect_err("no endpoint");

        assert!(matches!(error, GtpServiceError::Configuration { .. }));
    }

    #[test]
    fn should_apply_defaults() {
        let client = GtpServiceClientBuilder::default()
            .with_endpoint("https://gtp.example.com")
            .build()
            .expect("client");

        assert_eq!(client.base_url().as_str(), "https://gtp.example.com/v1/");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.retry_policy(), &RetryPolicy::default());
    }

    #[tokio::test]
    async fn should_use_custom_api_key_header() {
        let client = GtpServiceClientBuilder::default()
            .with_endpoint("https://gtp.example.com")
            .with_api_key_header("X-Gtp-Key")
            .with_api_key("secret-key")
            .build()
            .expect("client");

        let authentication = client.credentials().resolve().await.expect("api key");

        match authentication {
            Authentication::ApiKey { header_name, key } => {
                assert_eq!(header_name, "X-Gtp-Key");
                assert!(key.equals_str("secret-key"));
            }
            other => panic!("Expected ApiKey, got {other:?}"),
        }
    }
}
