//! Login against the catalog service's auth endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use storefront_auth::{AuthError, Authenticator, Credentials, SessionToken};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// `POST /auth/login` with `{username, password}`, answered by `{token}`.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthenticator {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        let url = format!("{}/auth/login", self.base_url);

        let resp = self
            .http
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        match resp.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                tracing::info!(username = %credentials.username, "login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            status if !status.is_success() => {
                return Err(AuthError::Unavailable(format!("login responded with status {status}")));
            }
            _ => {}
        }

        let body: LoginResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("malformed login response: {e}")))?;

        if body.token.is_empty() {
            return Err(AuthError::Unavailable("login response carried an empty token".to_string()));
        }
        Ok(SessionToken::new(body.token))
    }
}
