use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::suap::{AuthError, NormalizedProfile};

pub mod user_record;

pub use user_record::UserRecord;

/// Login credentials as typed by the user
///
/// Both fields are trimmed on construction. The secret never leaves this
/// struct except as the `password` field of a token request.
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    secret: String,
}

impl Credentials {
    /// Build credentials from raw form input
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyCredentials` if either field is empty after trimming.
    pub fn new(identifier: &str, secret: &str) -> Result<Self, AuthError> {
        let identifier = identifier.trim();
        let secret = secret.trim();
        if identifier.is_empty() || secret.is_empty() {
            return Err(AuthError::EmptyCredentials);
        }
        Ok(Self {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
        })
    }

    /// Institutional registration id (matrícula)
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// Tokens issued by the identity provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResult {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl TokenResult {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

impl fmt::Debug for TokenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResult")
            .field("access_token", &format!("[{} chars]", self.access_token.len()))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[present]"),
            )
            .finish()
    }
}

/// Successful result of a full login
#[derive(Debug, Clone)]
pub struct AuthenticationOutcome {
    /// Identifier the user logged in with; the provider's id is on `profile`
    pub registration: String,
    pub is_student: bool,
    pub profile: NormalizedProfile,
    pub raw_profile: Value,
    pub token: TokenResult,
    pub authenticated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_are_trimmed() {
        let credentials = Credentials::new("  20231041110013 ", " s3cret\n").unwrap();
        assert_eq!(credentials.identifier(), "20231041110013");
        assert_eq!(credentials.secret(), "s3cret");
    }

    #[test]
    fn test_blank_credentials_rejected() {
        assert!(matches!(
            Credentials::new("   ", "secret"),
            Err(AuthError::EmptyCredentials)
        ));
        assert!(matches!(
            Credentials::new("20231041110013", ""),
            Err(AuthError::EmptyCredentials)
        ));
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let credentials = Credentials::new("2023", "hunter2").unwrap();
        let token = TokenResult::new("abc.def.ghi", Some("refresh".to_string()));

        let rendered = format!("{credentials:?} {token:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("abc.def.ghi"));
        assert!(!rendered.contains("\"refresh\""));
        assert!(rendered.contains("11 chars"));
    }
}
