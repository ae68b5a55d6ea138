//! Cognito user pool login using the `USER_SRP_AUTH` flow.

use std::collections::HashMap;

use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use super::srp::SrpClient;
use super::{BoxFuture, CredentialError, IdentityProvider, LoginRequest};
use crate::client::SecureString;
use crate::client::error::truncate_body;

const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const AMZ_TARGET_HEADER: &str = "X-Amz-Target";
const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const RESPOND_TO_AUTH_CHALLENGE_TARGET: &str =
    "AWSCognitoIdentityProviderService.RespondToAuthChallenge";

const USER_SRP_AUTH: &str = "USER_SRP_AUTH";
const PASSWORD_VERIFIER: &str = "PASSWORD_VERIFIER";

/// Logs in against a Cognito user pool with the Secure Remote Password flow.
///
/// The password never leaves the process: `InitiateAuth` sends the SRP public
/// value, and `RespondToAuthChallenge` answers the `PASSWORD_VERIFIER`
/// challenge with an HMAC signature derived from it. The resulting access
/// token is used as the bearer token.
///
/// The regional endpoint `https://cognito-idp.{region}.amazonaws.com/` is
/// derived from the user pool id unless [`CognitoSrpLogin::with_endpoint`]
/// overrides it.
#[derive(Debug, Clone, Default)]
pub struct CognitoSrpLogin {
    http_client: reqwest::Client,
    endpoint: Option<Url>,
}

impl CognitoSrpLogin {
    /// Creates a login flow using the given HTTP client.
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            endpoint: None,
        }
    }

    /// Sends identity provider calls to `endpoint` instead of the regional one.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    fn endpoint_for(&self, region: &str) -> Result<Url, CredentialError> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }
        let url = format!("https://cognito-idp.{region}.amazonaws.com/");
        Url::parse(&url).map_err(|err| CredentialError::Configuration {
            reason: format!("invalid identity provider endpoint '{url}': {err}"),
        })
    }

    async fn call<T>(
        &self,
        endpoint: &Url,
        target: &str,
        body: &Value,
    ) -> Result<T, CredentialError>
    where
        T: DeserializeOwned,
    {
        debug!(%endpoint, amz_target = target, "calling identity provider");
        let response = self
            .http_client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, AMZ_JSON_CONTENT_TYPE)
            .header(AMZ_TARGET_HEADER, target)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(amz_target = target, %status, "identity provider responded");

        if !status.is_success() {
            let error = serde_json::from_str::<CognitoErrorBody>(&text).unwrap_or_default();
            return Err(CredentialError::Rejected {
                code: error
                    .code()
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
                message: error.message.unwrap_or_else(|| truncate_body(text)),
            });
        }

        serde_json::from_str(&text).map_err(|err| CredentialError::InvalidResponse {
            reason: format!("cannot decode {target} response: {err}"),
        })
    }

    async fn login_srp(&self, request: &LoginRequest) -> Result<SecureString, CredentialError> {
        let (region, pool_name) = split_user_pool_id(&request.user_pool_id)?;
        let endpoint = self.endpoint_for(region)?;
        let srp = SrpClient::new()?;

        let initiate = json!({
            "AuthFlow": USER_SRP_AUTH,
            "ClientId": request.client_id,
            "AuthParameters": {
                "USERNAME": request.username,
                "SRP_A": srp.public_value_hex(),
            },
        });
        let challenge: ChallengeResponse = self
            .call(&endpoint, INITIATE_AUTH_TARGET, &initiate)
            .await?;

        let challenge_name = challenge.challenge_name.unwrap_or_default();
        if challenge_name != PASSWORD_VERIFIER {
            return Err(CredentialError::UnsupportedChallenge {
                challenge: challenge_name,
            });
        }

        let parameters = &challenge.challenge_parameters;
        let user_id = challenge_parameter(parameters, "USER_ID_FOR_SRP")?;
        let claim = srp.password_claim(
            pool_name,
            user_id,
            request.password.as_str(),
            challenge_parameter(parameters, "SRP_B")?,
            challenge_parameter(parameters, "SALT")?,
            challenge_parameter(parameters, "SECRET_BLOCK")?,
            Utc::now(),
        )?;

        let mut respond = json!({
            "ChallengeName": PASSWORD_VERIFIER,
            "ClientId": request.client_id,
            "ChallengeResponses": {
                "USERNAME": user_id,
                "TIMESTAMP": claim.timestamp,
                "PASSWORD_CLAIM_SECRET_BLOCK": claim.secret_block,
                "PASSWORD_CLAIM_SIGNATURE": claim.signature,
            },
        });
        if let (Some(session), Some(body)) = (challenge.session, respond.as_object_mut()) {
            body.insert("Session".to_string(), Value::String(session));
        }

        let response: AuthenticationResponse = self
            .call(&endpoint, RESPOND_TO_AUTH_CHALLENGE_TARGET, &respond)
            .await?;

        match response.authentication_result {
            Some(result) => Ok(SecureString::new(result.access_token)),
            None => Err(CredentialError::UnsupportedChallenge {
                challenge: response
                    .challenge_name
                    .unwrap_or_else(|| "<none>".to_string()),
            }),
        }
    }
}

impl IdentityProvider for CognitoSrpLogin {
    fn login<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> BoxFuture<'a, Result<SecureString, CredentialError>> {
        Box::pin(self.login_srp(request))
    }
}

/// Splits `eu-west-1_AbCdEf123` into the region and the pool name.
fn split_user_pool_id(user_pool_id: &str) -> Result<(&str, &str), CredentialError> {
    user_pool_id
        .split_once('_')
        .filter(|(region, pool_name)| !region.is_empty() && !pool_name.is_empty())
        .ok_or_else(|| CredentialError::Configuration {
            reason: format!("user pool id '{user_pool_id}' should look like '<region>_<id>'"),
        })
}

fn challenge_parameter<'a>(
    parameters: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, CredentialError> {
    parameters
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| CredentialError::InvalidResponse {
            reason: format!("challenge parameter '{name}' is missing"),
        })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ChallengeResponse {
    challenge_name: Option<String>,
    #[serde(default)]
    challenge_parameters: HashMap<String, String>,
    session: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResponse {
    challenge_name: Option<String>,
    authentication_result: Option<AuthenticationResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct CognitoErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl CognitoErrorBody {
    /// Error type without the optional `namespace#` prefix.
    fn code(&self) -> Option<String> {
        self.kind
            .as_deref()
            .map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_string())
    }
}
