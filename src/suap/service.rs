//! SUAP authentication service
//!
//! Wires token acquisition, profile retrieval, normalization and
//! classification into the single login pipeline used by the web layer.

use chrono::Utc;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::classify::{explain, ClassificationPolicy};
use super::errors::AuthError;
use super::normalize::{normalize_with_origin, NormalizedProfile};
use super::transport::{HttpTransport, ReqwestTransport, TransportError};
use super::{profile, token};
use crate::models::{AuthenticationOutcome, Credentials, TokenResult};
use crate::settings::SuapSettings;
use crate::utils::logging::LoggingHelper;

/// Client for the SUAP identity provider
#[derive(Clone)]
pub struct SuapClient {
    transport: Arc<dyn HttpTransport>,
    origin: String,
    token_urls: Vec<String>,
    profile_urls: Vec<String>,
    policy: ClassificationPolicy,
}

impl SuapClient {
    /// Create a client backed by `reqwest` with the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &SuapSettings) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(settings.provider.timeout())?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    /// Create a client that sends requests through `transport`
    #[must_use]
    pub fn with_transport(settings: &SuapSettings, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            origin: settings.provider.base_url.clone(),
            token_urls: settings.provider.token_urls(),
            profile_urls: settings.provider.profile_urls(),
            policy: settings.classification,
        }
    }

    /// Obtain an access token for the credentials
    ///
    /// # Errors
    ///
    /// See [`token::acquire_token`].
    pub async fn acquire_token(&self, credentials: &Credentials) -> Result<TokenResult, AuthError> {
        token::acquire_token(self.transport.as_ref(), &self.token_urls, credentials).await
    }

    /// Fetch the raw profile for a token, `None` if no endpoint answered
    pub async fn fetch_profile(&self, token: &TokenResult) -> Option<Value> {
        profile::fetch_profile(self.transport.as_ref(), &self.profile_urls, &token.access_token).await
    }

    /// Normalize a raw profile against this provider's origin
    #[must_use]
    pub fn normalize(&self, raw: &Value) -> NormalizedProfile {
        normalize_with_origin(raw, &self.origin)
    }

    /// Apply the configured classification policy
    #[must_use]
    pub fn classify(&self, profile: &NormalizedProfile) -> bool {
        explain(profile, &self.policy).is_student
    }

    /// Run the full login pipeline
    ///
    /// # Errors
    ///
    /// Returns any token acquisition error, or `ProfileUnavailable` carrying
    /// the token when no profile endpoint answered.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticationOutcome, AuthError> {
        let token = self.acquire_token(credentials).await?;
        self.complete(credentials.identifier(), token).await
    }

    /// Finish a login whose profile lookup failed earlier, reusing its token
    ///
    /// The outcome is keyed on `registration`, the identifier used to log in;
    /// the provider's own id stays on the profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileUnavailable` if the profile still cannot be fetched.
    pub async fn complete(
        &self,
        registration: &str,
        token: TokenResult,
    ) -> Result<AuthenticationOutcome, AuthError> {
        let Some(raw_profile) = self.fetch_profile(&token).await else {
            return Err(AuthError::ProfileUnavailable(token));
        };

        let profile = self.normalize(&raw_profile);
        let classification = explain(&profile, &self.policy);
        LoggingHelper::log_classification(
            registration,
            classification.is_student,
            classification.rule.as_str(),
        );

        Ok(AuthenticationOutcome {
            registration: registration.to_string(),
            is_student: classification.is_student,
            profile,
            raw_profile,
            token,
            authenticated_at: Utc::now(),
        })
    }
}

impl fmt::Debug for SuapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuapClient")
            .field("origin", &self.origin)
            .field("token_urls", &self.token_urls)
            .field("profile_urls", &self.profile_urls)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::TestFixtures;
    use crate::testing::mock::ScriptedTransport;

    fn client(transport: ScriptedTransport) -> SuapClient {
        SuapClient::with_transport(&TestFixtures::settings(), Arc::new(transport))
    }

    #[tokio::test]
    async fn test_authenticate_active_student() {
        let transport = ScriptedTransport::new()
            .respond(&TestFixtures::token_url(0), 200, TestFixtures::token_body())
            .respond(
                &TestFixtures::profile_url(0),
                200,
                TestFixtures::student_profile().to_string(),
            );

        let credentials = Credentials::new("20231041110013", "senha").unwrap();
        let outcome = client(transport).authenticate(&credentials).await.unwrap();

        assert!(outcome.is_student);
        assert_eq!(outcome.registration, "20231041110013");
        assert_eq!(outcome.profile.display_name, "Maria Souza");
        assert_eq!(outcome.profile.course_name.as_deref(), Some("Tecnologia em Redes de Computadores"));
        assert_eq!(outcome.token.access_token, "access-token");
        assert_eq!(outcome.raw_profile["matricula"], "20231041110013");
    }

    #[tokio::test]
    async fn test_profile_unavailable_keeps_token() {
        let transport = ScriptedTransport::new()
            .respond(&TestFixtures::token_url(0), 200, TestFixtures::token_body());

        let credentials = Credentials::new("20231041110013", "senha").unwrap();
        match client(transport).authenticate(&credentials).await {
            Err(AuthError::ProfileUnavailable(token)) => {
                assert_eq!(token.access_token, "access-token");
                assert_eq!(token.refresh_token.as_deref(), Some("refresh-token"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registration_falls_back_to_credentials() {
        let transport = ScriptedTransport::new()
            .respond(&TestFixtures::profile_url(2), 200, r#"{"nome":"Sem Matrícula"}"#);

        let outcome = client(transport)
            .complete("2023", TokenResult::new("tok", None))
            .await
            .unwrap();
        assert_eq!(outcome.registration, "2023");
        assert!(outcome.is_student);
    }

    #[tokio::test]
    async fn test_registration_is_login_identifier() {
        let transport = ScriptedTransport::new()
            .respond(&TestFixtures::profile_url(0), 200, r#"{"matricula":"1234567"}"#);

        let outcome = client(transport)
            .complete("2023", TokenResult::new("tok", None))
            .await
            .unwrap();
        assert_eq!(outcome.registration, "2023");
        assert_eq!(outcome.profile.registration.as_deref(), Some("1234567"));
    }

    #[tokio::test]
    async fn test_strict_policy_is_applied() {
        let mut settings = TestFixtures::settings();
        settings.classification.allow_unrecognized = false;
        let transport = ScriptedTransport::new()
            .respond(&TestFixtures::profile_url(0), 200, r#"{"nome":"Servidor X"}"#);

        let outcome = SuapClient::with_transport(&settings, Arc::new(transport))
            .complete("1234", TokenResult::new("tok", None))
            .await
            .unwrap();
        assert!(!outcome.is_student);
    }

    #[test]
    fn test_normalize_uses_configured_origin() {
        let client = client(ScriptedTransport::new());
        let profile = client.normalize(&serde_json::json!({"foto": "/media/x.jpg"}));
        assert_eq!(
            profile.photo_url.as_deref(),
            Some("https://suap.test/media/x.jpg")
        );
    }

    #[test]
    fn test_debug_omits_transport() {
        let rendered = format!("{:?}", client(ScriptedTransport::new()));
        assert!(rendered.contains("https://suap.test"));
    }
}
