use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::authenticator::{AuthError, Authenticator};
use crate::credentials::Credentials;

/// Opaque token granting access to protected views.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("not signed in")]
    Unauthenticated,
}

/// Zero-or-one token. Absence means protected views are off limits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<SessionToken>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session restored from a previously issued token.
    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Gate check for protected views.
    pub fn require(&self) -> Result<&SessionToken, AccessError> {
        self.token.as_ref().ok_or(AccessError::Unauthenticated)
    }

    /// Exchange credentials for a token via the collaborator.
    ///
    /// On failure the session keeps whatever token it held before.
    pub async fn login(
        &mut self,
        authenticator: &dyn Authenticator,
        credentials: &Credentials,
    ) -> Result<&SessionToken, AuthError> {
        credentials.validate()?;
        let token = authenticator.authenticate(credentials).await?;
        tracing::info!(username = %credentials.username, "signed in");
        let token: &SessionToken = self.token.insert(token);
        Ok(token)
    }

    /// Drop the token unconditionally.
    pub fn logout(&mut self) {
        if self.token.take().is_some() {
            tracing::info!("signed out");
        }
    }
}
