//! Identity persistence against `PostgreSQL`.

use super::helpers::{harness, unique_email};
use crate::test_helpers::{HIGH_THREE_HOURS, PASSWORD};
use mockable::DefaultClock;
use rstest::rstest;
use taskwright::enrichment::adapters::scripted::ScriptedInferenceClient;
use taskwright::identity::{
    domain::{EmailAddress, Identity, PasswordHash},
    ports::IdentityRepositoryError,
    services::{CredentialError, RegisterRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs TASKWRIGHT_TEST_DATABASE_URL"]
async fn registered_identity_round_trips() -> eyre::Result<()> {
    let pg = harness(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).await?;
    let email = unique_email();

    let registered = pg
        .state
        .credentials
        .register(RegisterRequest::new(email.as_str(), PASSWORD).with_display_name("Pat"))
        .await?;
    let authenticated = pg
        .state
        .credentials
        .authenticate(&email.to_uppercase(), PASSWORD)
        .await?;

    assert_eq!(authenticated, registered);
    assert_eq!(authenticated.display_name().as_str(), "Pat");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs TASKWRIGHT_TEST_DATABASE_URL"]
async fn email_unique_index_maps_to_duplicate_email() -> eyre::Result<()> {
    let pg = harness(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).await?;
    let email = EmailAddress::new(unique_email())?;
    let hash = PasswordHash::from_encoded("pbkdf2_sha256$1$00$00".to_owned());
    let first = Identity::register(email.clone(), hash.clone(), None, &DefaultClock);
    let second = Identity::register(email, hash, None, &DefaultClock);

    pg.backends.identities.store(&first).await?;
    let result = pg.backends.identities.store(&second).await;

    assert!(matches!(
        result,
        Err(IdentityRepositoryError::DuplicateEmail(_))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs TASKWRIGHT_TEST_DATABASE_URL"]
async fn deactivation_persists() -> eyre::Result<()> {
    let pg = harness(ScriptedInferenceClient::replying(HIGH_THREE_HOURS)).await?;
    let email = unique_email();
    let identity = pg
        .state
        .credentials
        .register(RegisterRequest::new(email.as_str(), PASSWORD))
        .await?;

    pg.state.credentials.deactivate(identity.id()).await?;

    let stored = pg.backends.identities.find_by_id(identity.id()).await?;
    assert_eq!(stored.map(|i| i.is_active()), Some(false));
    let login = pg.state.credentials.authenticate(&email, PASSWORD).await;
    assert!(matches!(login, Err(CredentialError::InvalidCredentials)));
    Ok(())
}
