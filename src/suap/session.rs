//! Per-login session record
//!
//! The web layer stores this in its session state after a successful login.
//! The normalized profile is cached here for the lifetime of the session and
//! re-fetched with the stored token when it is missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::AuthError;
use super::normalize::NormalizedProfile;
use super::service::SuapClient;
use crate::models::{AuthenticationOutcome, TokenResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuapSession {
    pub registration: String,
    pub token: TokenResult,
    pub profile: Option<NormalizedProfile>,
    pub is_student: bool,
    pub is_admin: bool,
    pub authenticated_at: DateTime<Utc>,
}

impl SuapSession {
    /// Session for a completed login
    #[must_use]
    pub fn from_outcome(outcome: &AuthenticationOutcome, is_admin: bool) -> Self {
        Self {
            registration: outcome.registration.clone(),
            token: outcome.token.clone(),
            profile: Some(outcome.profile.clone()),
            is_student: outcome.is_student,
            is_admin,
            authenticated_at: outcome.authenticated_at,
        }
    }

    /// Session for a login whose profile lookup failed; the profile is
    /// fetched later by [`SuapSession::ensure_profile`]
    #[must_use]
    pub fn pending_profile(registration: impl Into<String>, token: TokenResult, is_admin: bool) -> Self {
        Self {
            registration: registration.into(),
            token,
            profile: None,
            is_student: false,
            is_admin,
            authenticated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn has_profile(&self) -> bool {
        self.profile.is_some()
    }

    /// Drop the cached profile so the next access re-fetches it
    pub fn invalidate_profile(&mut self) {
        self.profile = None;
    }

    /// Return the cached profile, fetching and classifying it if absent
    ///
    /// # Errors
    ///
    /// Returns `ProfileUnavailable` if the profile cannot be fetched.
    pub async fn ensure_profile(&mut self, client: &SuapClient) -> Result<&NormalizedProfile, AuthError> {
        if self.profile.is_none() {
            let raw = client
                .fetch_profile(&self.token)
                .await
                .ok_or_else(|| AuthError::ProfileUnavailable(self.token.clone()))?;
            let profile = client.normalize(&raw);
            self.is_student = client.classify(&profile);
            self.profile = Some(profile);
        }

        self.profile
            .as_ref()
            .ok_or_else(|| AuthError::ProfileUnavailable(self.token.clone()))
    }
}
