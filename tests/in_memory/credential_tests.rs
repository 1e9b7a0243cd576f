//! Credential store and verifier behaviour through the wired services.

use crate::test_helpers::{HIGH_THREE_HOURS, PASSWORD, TestApp};
use rstest::{fixture, rstest};
use taskwright::enrichment::adapters::scripted::ScriptedInferenceClient;
use taskwright::identity::services::{CredentialError, RegisterRequest};

#[fixture]
fn app() -> TestApp {
    TestApp::new(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).expect("test app")
}

#[rstest]
#[case("a@x.com")]
#[case("first.last+tag@sub.example.org")]
#[tokio::test(flavor = "multi_thread")]
async fn stored_hash_never_equals_plaintext(app: TestApp, #[case] email: &str) {
    let identity = app
        .state
        .credentials
        .register(RegisterRequest::new(email, PASSWORD))
        .await
        .expect("registration succeeds");

    assert_ne!(identity.password_hash().as_str(), PASSWORD);
    assert!(identity.password_hash().as_str().starts_with("pbkdf2_sha256$"));

    let authenticated = app
        .state
        .credentials
        .authenticate(email, PASSWORD)
        .await
        .expect("original plaintext authenticates");
    assert_eq!(authenticated.id(), identity.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_registration_with_same_email_conflicts(app: TestApp) {
    app.state
        .credentials
        .register(RegisterRequest::new("dup@x.com", PASSWORD))
        .await
        .expect("first registration succeeds");

    let result = app
        .state
        .credentials
        .register(RegisterRequest::new("  DUP@X.com ", PASSWORD))
        .await;

    assert!(matches!(result, Err(CredentialError::Conflict)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_identity_cannot_log_in_or_refresh(app: TestApp) {
    let credentials = &app.state.credentials;
    let identity = credentials
        .register(RegisterRequest::new("gone@x.com", PASSWORD))
        .await
        .expect("registration succeeds");
    let tokens = credentials.issue_token(&identity).expect("tokens");

    credentials
        .deactivate(identity.id())
        .await
        .expect("deactivation succeeds");

    let login = credentials.authenticate("gone@x.com", PASSWORD).await;
    assert!(matches!(login, Err(CredentialError::InvalidCredentials)));

    let refresh = credentials.refresh(&tokens.refresh_token).await;
    assert!(matches!(refresh, Err(CredentialError::Unauthenticated(_))));

    let me = credentials.current_identity(identity.id()).await;
    assert!(matches!(me, Err(CredentialError::Unauthenticated(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tokens_resolve_to_their_identity_by_kind(app: TestApp) {
    let credentials = &app.state.credentials;
    let identity = credentials
        .register(RegisterRequest::new("tok@x.com", PASSWORD))
        .await
        .expect("registration succeeds");
    let tokens = credentials.issue_token(&identity).expect("tokens");

    assert_eq!(
        credentials
            .verify_token(&tokens.access_token)
            .expect("access token verifies"),
        identity.id()
    );
    assert!(matches!(
        credentials.verify_token(&tokens.refresh_token),
        Err(CredentialError::Unauthenticated(_))
    ));
}
