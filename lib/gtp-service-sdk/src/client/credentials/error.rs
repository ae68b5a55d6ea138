//! Credential resolution error types.

use std::fmt;

/// Errors that can occur while resolving credentials.
#[derive(Debug)]
pub enum CredentialError {
    /// A required value is missing or malformed.
    Configuration {
        /// Description of the configuration issue.
        reason: String,
    },

    /// The identity provider rejected the login.
    Rejected {
        /// Error code returned by the identity provider.
        code: String,
        /// Error message returned by the identity provider.
        message: String,
    },

    /// The identity provider asked for a challenge this client cannot answer.
    UnsupportedChallenge {
        /// The challenge name.
        challenge: String,
    },

    /// The identity provider returned a response that cannot be used.
    InvalidResponse {
        /// Description of what was invalid.
        reason: String,
    },

    /// Network error while talking to the identity provider.
    Network(reqwest::Error),
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => {
                write!(f, "Credential configuration error: {reason}")
            }
            Self::Rejected { code, message } => {
                write!(f, "Login rejected ({code}): {message}")
            }
            Self::UnsupportedChallenge { challenge } => {
                write!(f, "Unsupported login challenge '{challenge}'")
            }
            Self::InvalidResponse { reason } => {
                write!(f, "Invalid identity provider response: {reason}")
            }
            Self::Network(err) => {
                write!(f, "Network error during login: {err}")
            }
        }
    }
}

impl From<reqwest::Error> for CredentialError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err)
    }
}
