// End-to-end login pipeline against a scripted provider
use std::sync::Arc;
use suap_auth::suap::TransportError;
use suap_auth::testing::constants::{TEST_PASSWORD, TEST_REGISTRATION};
use suap_auth::testing::{ScriptedTransport, TestFixtures};
use suap_auth::{AuthError, Credentials, SuapClient};

fn credentials() -> Credentials {
    Credentials::new(TEST_REGISTRATION, TEST_PASSWORD).expect("fixture credentials are valid")
}

fn client(transport: &Arc<ScriptedTransport>) -> SuapClient {
    SuapClient::with_transport(&TestFixtures::settings(), transport.clone())
}

#[tokio::test]
async fn test_login_survives_endpoint_drift() {
    // Old token endpoint removed, new one answers; first two profile
    // endpoints gone, the student endpoint answers
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(&TestFixtures::token_url(0), 404, "")
            .respond(&TestFixtures::token_url(1), 200, TestFixtures::token_body())
            .respond(&TestFixtures::profile_url(0), 403, "")
            .fail(
                &TestFixtures::profile_url(1),
                TransportError::Timeout("deadline".to_string()),
            )
            .respond(
                &TestFixtures::profile_url(2),
                200,
                TestFixtures::student_profile().to_string(),
            ),
    );

    let outcome = client(&transport)
        .authenticate(&credentials())
        .await
        .expect("login should succeed");

    assert!(outcome.is_student);
    assert_eq!(outcome.profile.display_name, "Maria Souza");
    assert_eq!(outcome.profile.campus_name.as_deref(), Some("Natal-Central"));
    assert_eq!(
        outcome.profile.photo_url.as_deref(),
        Some("https://suap.test/media/alunos/150x200/maria.jpg")
    );
    assert_eq!(outcome.token.refresh_token.as_deref(), Some("refresh-token"));

    // The third token endpoint and later profile endpoints were never needed
    assert!(transport.requests_to(&TestFixtures::token_url(2)).is_empty());
    assert!(transport.requests_to(&TestFixtures::profile_url(3)).is_empty());
}

#[tokio::test]
async fn test_cancelled_student_is_not_authorized() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(&TestFixtures::token_url(0), 200, TestFixtures::token_body())
            .respond(
                &TestFixtures::profile_url(0),
                200,
                TestFixtures::cancelled_student_profile().to_string(),
            ),
    );

    let outcome = client(&transport)
        .authenticate(&credentials())
        .await
        .expect("credentials are valid even if the enrollment is not");

    assert!(!outcome.is_student);
    assert_eq!(outcome.profile.raw_affiliation_status.as_deref(), Some("Cancelado"));
}

#[tokio::test]
async fn test_flat_profile_without_vinculo_is_admitted() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(&TestFixtures::token_url(0), 201, r#"{"token":"legacy"}"#)
            .respond(
                &TestFixtures::profile_url(0),
                200,
                TestFixtures::flat_student_profile().to_string(),
            ),
    );

    let outcome = client(&transport).authenticate(&credentials()).await.unwrap();

    // No `vinculo` evidence: admitted by the default policy despite the
    // top-level status
    assert!(outcome.is_student);
    assert_eq!(outcome.profile.display_name, "Alex");
    assert_eq!(outcome.profile.course_name.as_deref(), Some("Técnico em Informática"));
    assert_eq!(outcome.profile.campus_name.as_deref(), Some("Parnamirim"));
    assert_eq!(
        outcome.profile.photo_url.as_deref(),
        Some("https://suap.test/media/alunos/alex.jpg")
    );
}

#[tokio::test]
async fn test_staff_with_unrecognized_affiliations() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(&TestFixtures::token_url(0), 200, TestFixtures::token_body())
            .respond(
                &TestFixtures::profile_url(0),
                200,
                TestFixtures::staff_profile().to_string(),
            ),
    );

    let outcome = client(&transport).authenticate(&credentials()).await.unwrap();
    assert!(outcome.is_student);
    assert_eq!(outcome.profile.display_name, "Carlos Pereira");
    assert_eq!(outcome.registration, TEST_REGISTRATION);
    assert_eq!(outcome.profile.registration.as_deref(), Some("1234567"));
    assert_eq!(
        outcome.profile.photo_url.as_deref(),
        Some("https://cdn.suap.test/fotos/carlos.jpg")
    );

    let mut strict = TestFixtures::settings();
    strict.classification.allow_unrecognized = false;
    let strict_client = SuapClient::with_transport(&strict, transport.clone());
    let outcome = strict_client.authenticate(&credentials()).await.unwrap();
    assert!(!outcome.is_student);
}

#[tokio::test]
async fn test_wrong_password() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(&TestFixtures::token_url(0), 401, r#"{"detail":"No active account"}"#),
    );

    let err = client(&transport)
        .authenticate(&credentials())
        .await
        .expect_err("login must fail");

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(
        err.user_message(),
        "Credenciais inválidas. Verifique sua matrícula e senha."
    );
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_provider_offline() {
    let transport = Arc::new(ScriptedTransport::new());

    let err = client(&transport)
        .authenticate(&credentials())
        .await
        .expect_err("nothing is scripted");

    assert!(matches!(err, AuthError::NoEndpointReachable(_)));
    assert!(err.is_retryable());
    // One form request per token candidate, no profile requests
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_profile_retry_after_outage() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(&TestFixtures::token_url(0), 200, TestFixtures::token_body()),
    );
    let token = match client(&transport).authenticate(&credentials()).await {
        Err(AuthError::ProfileUnavailable(token)) => token,
        other => panic!("expected ProfileUnavailable, got {other:?}"),
    };

    let recovered = Arc::new(ScriptedTransport::new().respond(
        &TestFixtures::profile_url(0),
        200,
        TestFixtures::student_profile().to_string(),
    ));
    let outcome = client(&recovered)
        .complete(TEST_REGISTRATION, token)
        .await
        .expect("profile is back");

    assert!(outcome.is_student);
    assert_eq!(outcome.token.access_token, "access-token");
    // No new token request was needed
    assert!(recovered.requests_to(&TestFixtures::token_url(0)).is_empty());
}
