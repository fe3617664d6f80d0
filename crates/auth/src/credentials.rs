use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult};

/// Username/password pair submitted on the login page.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject blank fields before anything leaves the process.
    pub fn validate(&self) -> DomainResult<()> {
        if self.username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        Ok(())
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_username_is_rejected() {
        let err = Credentials::new("  ", "secret").validate().unwrap_err();
        assert_eq!(err, DomainError::validation("username cannot be empty"));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(Credentials::new("mor_2314", "").validate().is_err());
        assert!(Credentials::new("mor_2314", "83r5^_").validate().is_ok());
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", Credentials::new("mor_2314", "83r5^_"));
        assert!(rendered.contains("mor_2314"));
        assert!(!rendered.contains("83r5^_"));
    }

    #[test]
    fn serializes_as_login_payload() {
        let json = serde_json::to_value(Credentials::new("u", "p")).unwrap();
        assert_eq!(json, serde_json::json!({ "username": "u", "password": "p" }));
    }
}
