//! Token issuance boundary.

use async_trait::async_trait;
use thiserror::Error;

use storefront_core::DomainError;

use crate::credentials::Credentials;
use crate::session::SessionToken;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("authentication service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Validation(#[from] DomainError),
}

/// External collaborator that turns credentials into a session token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken, AuthError>;
}

/// Stub collaborator accepting exactly one username/password pair.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    accepted: Credentials,
    token: SessionToken,
}

impl StaticAuthenticator {
    pub fn new(accepted: Credentials, token: SessionToken) -> Self {
        Self { accepted, token }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        if *credentials == self.accepted {
            Ok(self.token.clone())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
