//! Credential resolution for the GTP service.
//!
//! A [`CredentialProvider`] turns the configured credentials into the
//! [`Authentication`] attached to every service call:
//!
//! - an explicit bearer token or API key is used as is, without any network call;
//! - otherwise the username and password are read from the environment and
//!   exchanged for an access token through an [`IdentityProvider`], by default
//!   [`CognitoSrpLogin`].
//!
//! The login happens on first use and its result is cached for the lifetime of
//! the provider, shared by every clone. Tokens are never refreshed; call
//! [`CredentialProvider::invalidate`] to force a new login.
//!
//! # Example
//!
//! ```rust
//! use gtp_service_sdk::{GtpServiceClient, LoginConfig};
//!
//! # fn example() -> Result<(), gtp_service_sdk::GtpServiceError> {
//! let client = GtpServiceClient::builder()
//!     .with_endpoint("https://gtp.example.com")
//!     .with_login(
//!         LoginConfig::new()
//!             .with_user_pool_id("eu-west-1_AbCdEf123")
//!             .with_client_id("my-app-client-id"),
//!     )
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info};

use super::{Authentication, GtpServiceError, SecureString};

mod cognito;
mod error;
mod srp;
mod token;

pub use self::cognito::CognitoSrpLogin;
pub use self::error::CredentialError;
use self::token::TokenCache;

/// Environment variable holding the login username.
pub const DEFAULT_USERNAME_VAR: &str = "GTP_SERVICE_USERNAME";

/// Environment variable holding the login password.
pub const DEFAULT_PASSWORD_VAR: &str = "GTP_SERVICE_PASSWORD";

/// Environment variable holding the user pool id, used when none is configured.
pub const USER_POOL_ID_VAR: &str = "GTP_SERVICE_USER_POOL_ID";

/// Environment variable holding the app client id, used when none is configured.
pub const CLIENT_ID_VAR: &str = "GTP_SERVICE_CLIENT_ID";

/// A boxed future returned by [`IdentityProvider::login`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Looks up a variable by name, `std::env::var` by default.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Exchanges a username and password for an access token.
///
/// Implement this trait to plug another identity provider, or a fake one in
/// tests.
pub trait IdentityProvider: fmt::Debug + Send + Sync {
    /// Performs the login exchange and returns the access token.
    fn login<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> BoxFuture<'a, Result<SecureString, CredentialError>>;
}

/// Everything an [`IdentityProvider`] needs to log in.
#[derive(Clone)]
pub struct LoginRequest {
    /// The login username.
    pub username: String,
    /// The login password.
    pub password: SecureString,
    /// The user pool id, `<region>_<id>`.
    pub user_pool_id: String,
    /// The app client id.
    pub client_id: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// Configuration of the login flow used when no explicit credential is given.
#[derive(Clone)]
pub struct LoginConfig {
    username_var: String,
    password_var: String,
    user_pool_id: Option<String>,
    client_id: Option<String>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    env: EnvLookup,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            username_var: DEFAULT_USERNAME_VAR.to_string(),
            password_var: DEFAULT_PASSWORD_VAR.to_string(),
            user_pool_id: None,
            client_id: None,
            identity_provider: None,
            env: Arc::new(|name: &str| std::env::var(name).ok()),
        }
    }
}

impl LoginConfig {
    /// Creates a configuration reading `GTP_SERVICE_USERNAME` and
    /// `GTP_SERVICE_PASSWORD`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the username from another environment variable.
    #[must_use]
    pub fn with_username_var(mut self, name: impl Into<String>) -> Self {
        self.username_var = name.into();
        self
    }

    /// Reads the password from another environment variable.
    #[must_use]
    pub fn with_password_var(mut self, name: impl Into<String>) -> Self {
        self.password_var = name.into();
        self
    }

    /// Sets the user pool id instead of reading `GTP_SERVICE_USER_POOL_ID`.
    #[must_use]
    pub fn with_user_pool_id(mut self, user_pool_id: impl Into<String>) -> Self {
        self.user_pool_id = Some(user_pool_id.into());
        self
    }

    /// Sets the app client id instead of reading `GTP_SERVICE_CLIENT_ID`.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Uses another identity provider than [`CognitoSrpLogin`].
    #[must_use]
    pub fn with_identity_provider(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.identity_provider = Some(Arc::new(provider));
        self
    }

    /// Replaces the process environment lookup.
    #[must_use]
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    fn lookup(&self, name: &str) -> Result<String, CredentialError> {
        (self.env)(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CredentialError::Configuration {
                reason: format!("environment variable '{name}' is not set"),
            })
    }

    fn login_request(&self) -> Result<LoginRequest, CredentialError> {
        let username = self.lookup(&self.username_var)?;
        let password = SecureString::new(self.lookup(&self.password_var)?);
        let user_pool_id = match &self.user_pool_id {
            Some(id) => id.clone(),
            None => self.lookup(USER_POOL_ID_VAR)?,
        };
        let client_id = match &self.client_id {
            Some(id) => id.clone(),
            None => self.lookup(CLIENT_ID_VAR)?,
        };

        Ok(LoginRequest {
            username,
            password,
            user_pool_id,
            client_id,
        })
    }
}

impl fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginConfig")
            .field("username_var", &self.username_var)
            .field("password_var", &self.password_var)
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("identity_provider", &self.identity_provider)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
enum CredentialSource {
    Explicit(Authentication),
    Login {
        config: LoginConfig,
        identity_provider: Arc<dyn IdentityProvider>,
    },
}

/// Resolves the [`Authentication`] used by the service client.
#[derive(Debug, Clone)]
pub struct CredentialProvider {
    source: CredentialSource,
    cache: TokenCache,
}

impl CredentialProvider {
    /// Uses the given authentication as is.
    pub fn explicit(authentication: Authentication) -> Self {
        Self {
            source: CredentialSource::Explicit(authentication),
            cache: TokenCache::new(),
        }
    }

    /// Logs in on first use.
    ///
    /// The login goes through the identity provider of `config`, or a
    /// [`CognitoSrpLogin`] sharing `http_client` when none is configured.
    pub fn login(config: LoginConfig, http_client: reqwest::Client) -> Self {
        let identity_provider = config
            .identity_provider
            .clone()
            .unwrap_or_else(|| Arc::new(CognitoSrpLogin::new(http_client)));

        Self {
            source: CredentialSource::Login {
                config,
                identity_provider,
            },
            cache: TokenCache::new(),
        }
    }

    /// Returns the authentication to attach to service calls.
    ///
    /// # Errors
    ///
    /// - [`GtpServiceError::Configuration`] if a login value is missing from
    ///   the configuration and the environment
    /// - [`GtpServiceError::Authentication`] if the identity provider rejects
    ///   the login
    /// - [`GtpServiceError::Transport`] if the identity provider is unreachable
    pub async fn resolve(&self) -> Result<Authentication, GtpServiceError> {
        let (config, identity_provider) = match &self.source {
            CredentialSource::Explicit(authentication) => return Ok(authentication.clone()),
            CredentialSource::Login {
                config,
                identity_provider,
            } => (config, identity_provider),
        };

        if let Some(authentication) = self.cache.get().await {
            debug!("reusing cached access token");
            return Ok(authentication);
        }

        let request = config.login_request()?;
        debug!(username = %request.username, user_pool_id = %request.user_pool_id, "logging in");
        let token = identity_provider.login(&request).await?;
        info!(username = %request.username, "logged in to the GTP service");

        let authentication = Authentication::Bearer(token);
        self.cache.set(authentication.clone()).await;
        Ok(authentication)
    }

    /// Drops the cached access token so the next call logs in again.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
    }

    impl IdentityProvider for CountingProvider {
        fn login<'a>(
            &'a self,
            request: &'a LoginRequest,
        ) -> BoxFuture<'a, Result<SecureString, CredentialError>> {
            Box::pin(async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(SecureString::new(format!("{}-token-{call}", request.username)))
            })
        }
    }

    #[derive(Debug)]
    struct RejectingProvider;

    impl IdentityProvider for RejectingProvider {
        fn login<'a>(
            &'a self,
            _request: &'a LoginRequest,
        ) -> BoxFuture<'a, Result<SecureString, CredentialError>> {
            Box::pin(async {
                Err(CredentialError::Rejected {
                    code: "NotAuthorizedException".to_string(),
                    message: "Incorrect username or password.".to_string(),
                })
            })
        }
    }

    fn env<const N: usize>(
        vars: [(&'static str, &'static str); N],
    ) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
        let vars = vars
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |name: &str| vars.get(name).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
        env([
            (DEFAULT_USERNAME_VAR, "ada"),
            (DEFAULT_PASSWORD_VAR, "s3cret"),
            (USER_POOL_ID_VAR, "eu-west-1_AbCdEf123"),
            (CLIENT_ID_VAR, "client-42"),
        ])
    }

    fn bearer_value(authentication: &Authentication) -> &str {
        match authentication {
            Authentication::Bearer(token) => token.as_str(),
            other => panic!("Expected bearer authentication, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_return_explicit_token_unchanged() {
        let provider = CredentialProvider::explicit(Authentication::Bearer("T".into()));

        let authentication = provider.resolve().await.expect("explicit token");

        assert_eq!(bearer_value(&authentication), "T");
    }

    #[tokio::test]
    async fn should_login_once_and_reuse_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = LoginConfig::new()
            .with_env_lookup(full_env())
            .with_identity_provider(CountingProvider {
                calls: Arc::clone(&calls),
            });
        let provider = CredentialProvider::login(config, reqwest::Client::new());
        let clone = provider.clone();

        let first = provider.resolve().await.expect("first login");
        let second = clone.resolve().await.expect("cached token");

        assert_eq!(bearer_value(&first), "ada-token-1");
        assert_eq!(bearer_value(&second), "ada-token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_login_again_after_invalidate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = LoginConfig::new()
            .with_env_lookup(full_env())
            .with_identity_provider(CountingProvider {
                calls: Arc::clone(&calls),
            });
        let provider = CredentialProvider::login(config, reqwest::Client::new());

        provider.resolve().await.expect("first login");
        provider.invalidate().await;
        let second = provider.resolve().await.expect("second login");

        assert_eq!(bearer_value(&second), "ada-token-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_read_custom_variables_and_configured_ids() {
        let config = LoginConfig::new()
            .with_username_var("MY_USER")
            .with_password_var("MY_PASSWORD")
            .with_user_pool_id("us-east-2_Z9")
            .with_client_id("configured-client")
            .with_env_lookup(env([("MY_USER", "grace"), ("MY_PASSWORD", "hopper")]));

        let request = config.login_request().expect("login request");

        assert_eq!(request.username, "grace");
        assert!(request.password.equals_str("hopper"));
        assert_eq!(request.user_pool_id, "us-east-2_Z9");
        assert_eq!(request.client_id, "configured-client");
    }

    #[tokio::test]
    async fn should_fail_when_password_is_missing() {
        let config = LoginConfig::new()
            .with_env_lookup(env([(DEFAULT_USERNAME_VAR, "ada")]))
            .with_identity_provider(CountingProvider::default());
        let provider = CredentialProvider::login(config, reqwest::Client::new());

        let error = provider.resolve().await.expect_err("missing password");

        match error {
            GtpServiceError::Configuration { reason } => {
                assert!(reason.contains(DEFAULT_PASSWORD_VAR), "{reason}");
            }
            other => panic!("Expected Configuration, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_report_rejected_login() {
        let config = LoginConfig::new()
            .with_env_lookup(full_env())
            .with_identity_provider(RejectingProvider);
        let provider = CredentialProvider::login(config, reqwest::Client::new());

        let error = provider.resolve().await.expect_err("rejected login");

        assert!(matches!(
            error,
            GtpServiceError::Authentication(CredentialError::Rejected { .. })
        ));
    }

    #[test]
    fn should_redact_password_in_debug() {
        let request = LoginRequest {
            username: "ada".to_string(),
            password: "s3cret".into(),
            user_pool_id: "eu-west-1_AbCdEf123".to_string(),
            client_id: "client-42".to_string(),
        };

        let debug = format!("{request:?}");

        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
