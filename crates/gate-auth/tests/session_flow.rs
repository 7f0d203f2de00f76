//! # Session acquisition against a mock identity provider
//!
//! Every test runs its own `mockito` server. Tokens follow one convention:
//! `valid` is accepted, `invalid` is rejected with a recoverable error,
//! `disabled` resolves to a disabled profile.

use gate_auth::{
    AuthError, BrowserNavigator, CredentialKind, CredentialStore, LogOptions, LoginOptions,
    MemoryStore, SessionConfig, SessionMachine, SessionOutcome,
};
use mockito::{Matcher, Mock, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const VALID_PROFILE: &str = include_str!("fixtures/valid_user_info.json");
const DISABLED_PROFILE: &str = include_str!("fixtures/disabled_user_info.json");
const VALID_TOKENS: &str = include_str!("fixtures/valid_token_data.json");

const PAGE: &str = "https://app.test/dashboard";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn refresh_body(token: &str) -> Value {
    json!({"grant_type": "refresh_token", "refresh_token": token})
}

fn code_body(code: &str) -> Value {
    json!({"grant_type": "authorization_code", "code": code})
}

async fn userdata(
    server: &mut ServerGuard,
    token: &str,
    status: usize,
    body: &str,
    hits: usize,
) -> Mock {
    server
        .mock("GET", "/example/userdata")
        .match_header("authorization", format!("Bearer {token}").as_str())
        .with_status(status)
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

async fn token(
    server: &mut ServerGuard,
    request: Value,
    status: usize,
    body: &str,
    hits: usize,
) -> Mock {
    server
        .mock("POST", "/example/token")
        .match_body(Matcher::Json(request))
        .with_status(status)
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

/// Token endpoint mock that must never be called.
async fn no_token_calls(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/example/token")
        .expect(0)
        .create_async()
        .await
}

fn store(access: Option<&str>, refresh: Option<&str>) -> MemoryStore {
    let mut store = MemoryStore::new();
    if let Some(access) = access {
        store = store.with(CredentialKind::Access, access);
    }
    if let Some(refresh) = refresh {
        store = store.with(CredentialKind::Refresh, refresh);
    }
    store
}

fn machine(
    server: &ServerGuard,
    store: MemoryStore,
    location: &str,
) -> SessionMachine<MemoryStore, BrowserNavigator> {
    let config = SessionConfig {
        sso_path: server.url(),
        ..Default::default()
    };
    let navigator = BrowserNavigator::parse(location)
        .expect("test location should parse")
        .headless();
    SessionMachine::new(config, store, navigator)
}

fn credentials(machine: &SessionMachine<MemoryStore, BrowserNavigator>) -> (Option<String>, Option<String>) {
    let store = machine.store();
    (
        store.get(CredentialKind::Access).unwrap(),
        store.get(CredentialKind::Refresh).unwrap(),
    )
}

fn assert_authenticated(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Authenticated(profile) => {
            assert_eq!(profile.email.as_deref(), Some("correoTest@correoTest.com"));
        }
        other => panic!("expected authenticated session, got {other:?}"),
    }
}

fn assert_redirect(outcome: &SessionOutcome, machine: &SessionMachine<MemoryStore, BrowserNavigator>) {
    assert!(
        matches!(outcome, SessionOutcome::RedirectRequired { .. }),
        "expected redirect, got {outcome:?}"
    );
    assert_eq!(machine.navigator().history().len(), 1, "exactly one navigation");
}

// ---------------------------------------------------------------------------
// No authorization code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_store_redirects_once() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = no_token_calls(&mut server).await;

    let mut machine = machine(&server, store(None, None), PAGE);
    let outcome = machine.acquire(None).await.unwrap();

    assert_redirect(&outcome, &machine);
    assert_eq!(
        outcome,
        SessionOutcome::RedirectRequired {
            route: "EMPTY".into()
        }
    );
    assert_eq!(
        machine.navigator().history(),
        ["EMPTY/oauth2/auth?redirect_uri=https://app.test/dashboard"]
    );
    token_mock.assert_async().await;
}

#[tokio::test]
async fn valid_access_only_fetches_profile() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = no_token_calls(&mut server).await;
    let profile_mock = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut machine = machine(&server, store(Some("valid"), None), PAGE);
    let outcome = machine.acquire(None).await.unwrap();

    assert_authenticated(&outcome);
    assert!(machine.navigator().history().is_empty());
    token_mock.assert_async().await;
    profile_mock.assert_async().await;
}

#[tokio::test]
async fn valid_refresh_mints_access_then_reuses_it() {
    let mut server = mockito::Server::new_async().await;
    let refresh_mock = token(&mut server, refresh_body("valid"), 200, VALID_TOKENS, 1).await;
    let profile_mock = userdata(&mut server, "valid", 200, VALID_PROFILE, 2).await;

    let mut machine = machine(&server, store(None, Some("valid")), PAGE);

    let first = machine.acquire(None).await.unwrap();
    assert_authenticated(&first);
    assert_eq!(
        credentials(&machine),
        (Some("valid".into()), Some("valid".into()))
    );

    // second call goes straight to the profile with the stored access credential
    let second = machine.acquire(None).await.unwrap();
    assert_authenticated(&second);

    refresh_mock.assert_async().await;
    profile_mock.assert_async().await;
}

#[tokio::test]
async fn refresh_without_rotation_keeps_refresh_credential() {
    let mut server = mockito::Server::new_async().await;
    let refresh_mock = token(
        &mut server,
        refresh_body("long-lived"),
        200,
        r#"{"access_token":"valid","expires_in":3600,"token_type":"Bearer"}"#,
        1,
    )
    .await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut machine = machine(&server, store(None, Some("long-lived")), PAGE);
    assert_authenticated(&machine.acquire(None).await.unwrap());

    assert_eq!(
        credentials(&machine),
        (Some("valid".into()), Some("long-lived".into()))
    );
    refresh_mock.assert_async().await;
}

#[tokio::test]
async fn access_takes_priority_over_refresh() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = no_token_calls(&mut server).await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut machine = machine(&server, store(Some("valid"), Some("valid")), PAGE);
    assert_authenticated(&machine.acquire(None).await.unwrap());
    token_mock.assert_async().await;
}

#[tokio::test]
async fn invalid_access_clears_both_and_redirects() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = no_token_calls(&mut server).await;
    let profile_mock = userdata(&mut server, "invalid", 500, "Error: invalid_request", 1).await;

    let mut machine = machine(&server, store(Some("invalid"), Some("valid")), PAGE);
    let outcome = machine.acquire(None).await.unwrap();

    assert_redirect(&outcome, &machine);
    assert_eq!(credentials(&machine), (None, None));
    token_mock.assert_async().await;
    profile_mock.assert_async().await;
}

#[tokio::test]
async fn invalid_refresh_is_cleared_then_redirects() {
    let mut server = mockito::Server::new_async().await;
    let refresh_mock = token(&mut server, refresh_body("invalid"), 500, "Error: invalid code", 1).await;

    let mut machine = machine(&server, store(None, Some("invalid")), PAGE);
    let outcome = machine.acquire(None).await.unwrap();

    assert_redirect(&outcome, &machine);
    assert_eq!(credentials(&machine), (None, None));
    refresh_mock.assert_async().await;
}

#[tokio::test]
async fn json_error_body_is_classified_too() {
    let mut server = mockito::Server::new_async().await;
    let _refresh = token(
        &mut server,
        refresh_body("expired"),
        401,
        r#"{"message":"token expired","name":"Error","status":401}"#,
        1,
    )
    .await;

    let mut machine = machine(&server, store(None, Some("expired")), PAGE);
    let outcome = machine.acquire(None).await.unwrap();
    assert_redirect(&outcome, &machine);
}

// ---------------------------------------------------------------------------
// Authorization code present
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_code_stores_both_credentials() {
    let mut server = mockito::Server::new_async().await;
    let code_mock = token(&mut server, code_body("valid"), 200, VALID_TOKENS, 1).await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut machine = machine(&server, store(None, None), &format!("{PAGE}?code=valid"));
    assert_authenticated(&machine.acquire(None).await.unwrap());

    assert_eq!(
        credentials(&machine),
        (Some("valid".into()), Some("valid".into()))
    );
    code_mock.assert_async().await;
}

#[tokio::test]
async fn access_takes_priority_over_code() {
    let mut server = mockito::Server::new_async().await;
    let token_mock = no_token_calls(&mut server).await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut machine = machine(
        &server,
        store(Some("valid"), Some("valid")),
        &format!("{PAGE}?code=valid"),
    );
    assert_authenticated(&machine.acquire(None).await.unwrap());
    token_mock.assert_async().await;
}

#[tokio::test]
async fn invalid_code_redirects_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let code_mock = token(&mut server, code_body("invalid"), 500, "Error: invalid code", 1).await;

    let mut machine = machine(&server, store(None, None), &format!("{PAGE}?code=invalid"));
    let outcome = machine.acquire(None).await.unwrap();

    assert_redirect(&outcome, &machine);
    assert_eq!(
        machine.navigator().history(),
        ["EMPTY/oauth2/auth?redirect_uri=https://app.test/dashboard"]
    );
    assert_eq!(credentials(&machine), (None, None));
    code_mock.assert_async().await;
}

#[tokio::test]
async fn invalid_refresh_falls_through_to_valid_code() {
    let mut server = mockito::Server::new_async().await;
    let refresh_mock = token(&mut server, refresh_body("invalid"), 500, "Error: invalid code", 1).await;
    let code_mock = token(&mut server, code_body("valid"), 200, VALID_TOKENS, 1).await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut machine = machine(&server, store(None, Some("invalid")), &format!("{PAGE}?code=valid"));
    assert_authenticated(&machine.acquire(None).await.unwrap());

    assert_eq!(
        credentials(&machine),
        (Some("valid".into()), Some("valid".into()))
    );
    refresh_mock.assert_async().await;
    code_mock.assert_async().await;
}

#[tokio::test]
async fn invalid_access_and_refresh_recover_with_valid_code() {
    let mut server = mockito::Server::new_async().await;
    let rejected = userdata(&mut server, "invalid", 500, "Error: invalid_request", 1).await;
    let code_mock = token(&mut server, code_body("valid"), 200, VALID_TOKENS, 1).await;
    let accepted = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut machine = machine(
        &server,
        store(Some("invalid"), Some("invalid")),
        &format!("{PAGE}?code=valid"),
    );
    assert_authenticated(&machine.acquire(None).await.unwrap());

    rejected.assert_async().await;
    code_mock.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn retries_are_bounded_when_every_credential_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    // the code grant hands out an access credential the profile endpoint rejects again
    let code_mock = token(
        &mut server,
        code_body("valid"),
        200,
        r#"{"access_token":"invalid","refresh_token":"invalid"}"#,
        1,
    )
    .await;
    let rejected = userdata(&mut server, "invalid", 500, "Error: token revoked", 2).await;

    let mut machine = machine(&server, store(Some("invalid"), None), &format!("{PAGE}?code=valid"));
    let outcome = machine.acquire(None).await.unwrap();

    assert_redirect(&outcome, &machine);
    assert_eq!(credentials(&machine), (None, None));
    code_mock.assert_async().await;
    rejected.assert_async().await;
}

// ---------------------------------------------------------------------------
// Fatal errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unclassified_profile_error_clears_both_and_propagates() {
    let mut server = mockito::Server::new_async().await;
    let _profile = userdata(&mut server, "boom", 500, "Error: server exploded", 1).await;

    let mut machine = machine(&server, store(Some("boom"), Some("valid")), PAGE);
    let err = machine.acquire(None).await.unwrap_err();

    assert!(
        matches!(&err, AuthError::Upstream { status: 500, body, .. } if body == "Error: server exploded"),
        "unexpected error: {err:?}"
    );
    assert!(!err.is_credential_invalid());
    assert_eq!(credentials(&machine), (None, None));
    assert!(machine.navigator().history().is_empty());
}

#[tokio::test]
async fn profile_without_permissions_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let body = r#"{"enabled": true, "email": "correoTest@correoTest.com"}"#;
    let _profile = userdata(&mut server, "valid", 200, body, 1).await;

    let mut machine = machine(&server, store(Some("valid"), Some("valid")), PAGE);
    let err = machine.acquire(None).await.unwrap_err();

    assert!(matches!(err, AuthError::Decode(_)), "unexpected error: {err:?}");
    assert_eq!(credentials(&machine), (None, None));
    assert!(machine.navigator().history().is_empty());
}

#[tokio::test]
async fn unclassified_refresh_error_clears_refresh_and_propagates() {
    let mut server = mockito::Server::new_async().await;
    let _refresh = token(&mut server, refresh_body("valid"), 503, "Error: maintenance", 1).await;

    let mut machine = machine(&server, store(None, Some("valid")), &format!("{PAGE}?code=valid"));
    let err = machine.acquire(None).await.unwrap_err();

    assert!(matches!(err, AuthError::Upstream { status: 503, .. }));
    assert_eq!(credentials(&machine), (None, None));
    assert!(machine.navigator().history().is_empty());
}

#[tokio::test]
async fn unclassified_code_error_propagates_without_redirect() {
    let mut server = mockito::Server::new_async().await;
    let _code = token(&mut server, code_body("valid"), 500, r#"{"message":"database down"}"#, 1).await;

    let mut machine = machine(&server, store(None, None), &format!("{PAGE}?code=valid"));
    let err = machine.acquire(None).await.unwrap_err();

    assert!(matches!(err, AuthError::Upstream { .. }));
    assert!(machine.navigator().history().is_empty());
}

#[tokio::test]
async fn transport_failure_is_never_retried() {
    let config = SessionConfig {
        sso_path: "http://127.0.0.1:1".into(),
        ..Default::default()
    };
    let navigator = BrowserNavigator::parse(PAGE).unwrap().headless();
    let mut machine = SessionMachine::new(config, store(None, Some("valid")), navigator);

    let err = machine.acquire(None).await.unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)), "unexpected error: {err:?}");
    assert_eq!(
        machine.store().get(CredentialKind::Refresh).unwrap(),
        None,
        "refresh credential is cleared after a failed grant"
    );
}

// ---------------------------------------------------------------------------
// Disabled accounts, overrides, audit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn disabled_account_keeps_credentials() {
    let mut server = mockito::Server::new_async().await;
    let _profile = userdata(&mut server, "disabled", 200, DISABLED_PROFILE, 1).await;

    let mut machine = machine(&server, store(Some("disabled"), Some("valid")), PAGE);
    let err = machine.acquire_profile(None).await.unwrap_err();

    assert!(matches!(err, AuthError::AccountDisabled));
    assert_eq!(
        credentials(&machine),
        (Some("disabled".into()), Some("valid".into()))
    );
    assert!(machine.navigator().history().is_empty());
}

#[tokio::test]
async fn sso_route_override_is_the_redirect_payload() {
    let mut server = mockito::Server::new_async().await;
    let _profile = userdata(&mut server, "invalid", 500, "Error: invalid_request", 1).await;

    let mut machine = machine(&server, store(Some("invalid"), None), PAGE);
    let options = LoginOptions {
        sso_route: Some("https://sso.test".into()),
        ..Default::default()
    };
    let err = machine.acquire_profile(Some(&options)).await.unwrap_err();

    match err {
        AuthError::RedirectInitiated { route } => assert_eq!(route, "https://sso.test"),
        other => panic!("expected redirect, got {other:?}"),
    }
    assert_eq!(
        machine.navigator().history(),
        ["https://sso.test/oauth2/auth?redirect_uri=https://app.test/dashboard"]
    );
}

#[tokio::test]
async fn overrides_persist_across_calls() {
    let mut server = mockito::Server::new_async().await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let config = SessionConfig::default();
    let navigator = BrowserNavigator::parse(PAGE).unwrap().headless();
    let mut machine = SessionMachine::new(config, store(Some("valid"), None), navigator);

    let options = LoginOptions {
        sso_path: Some(server.url()),
        sso_route: Some("https://sso.test".into()),
        ..Default::default()
    };
    assert_authenticated(&machine.acquire(Some(&options)).await.unwrap());

    // no options on the second call: the previous endpoints are still in effect
    machine.store().remove(CredentialKind::Access).unwrap();
    let outcome = machine.acquire(None).await.unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::RedirectRequired {
            route: "https://sso.test".into()
        }
    );
    assert_eq!(machine.config().sso_path, server.url());
}

fn log_options(path: &str) -> LoginOptions {
    LoginOptions {
        logs: Some(LogOptions {
            namespace: Some("validNamespace".into()),
            kind: Some("validType".into()),
            token: Some("validToken".into()),
            path: Some(path.into()),
        }),
        ..Default::default()
    }
}

fn expected_audit_record() -> Value {
    json!({
        "enabled": true,
        "client_id": "6bb04601-eb41-5cb9-sdfa-c08da7229ae0",
        "email": "correoTest@correoTest.com",
        "fullname": "NombrePrueba Apellido1Prueba Apellido2Prueba",
        "name": "NombrePrueba",
        "surname": "Apellido1Prueba Apellido2Prueba",
        "source": "360"
    })
}

#[tokio::test]
async fn audit_record_is_sent_after_success() {
    let mut server = mockito::Server::new_async().await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut logs = mockito::Server::new_async().await;
    let ingest = logs
        .mock("POST", "/ingest/validNamespace/validType")
        .match_header("x-api-key", "validToken")
        .match_body(Matcher::Json(expected_audit_record()))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let mut machine = machine(&server, store(Some("valid"), None), PAGE);
    let profile = machine
        .acquire_profile(Some(&log_options(&logs.url())))
        .await
        .unwrap();

    assert_eq!(profile.source, "360");
    assert_eq!(machine.config().log_path, logs.url());
    ingest.assert_async().await;
}

#[tokio::test]
async fn incomplete_log_options_skip_audit() {
    let mut server = mockito::Server::new_async().await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut logs = mockito::Server::new_async().await;
    let ingest = logs
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut options = log_options(&logs.url());
    if let Some(logs) = options.logs.as_mut() {
        logs.token = None;
    }

    let mut machine = machine(&server, store(Some("valid"), None), PAGE);
    assert_authenticated(&machine.acquire(Some(&options)).await.unwrap());
    ingest.assert_async().await;
}

#[tokio::test]
async fn audit_failure_propagates_and_keeps_credentials() {
    let mut server = mockito::Server::new_async().await;
    let _profile = userdata(&mut server, "valid", 200, VALID_PROFILE, 1).await;

    let mut logs = mockito::Server::new_async().await;
    let ingest = logs
        .mock("POST", "/ingest/validNamespace/validType")
        .with_status(500)
        .with_body("Error: token expired")
        .expect(1)
        .create_async()
        .await;

    let mut machine = machine(&server, store(Some("valid"), None), PAGE);
    let err = machine
        .acquire(Some(&log_options(&logs.url())))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Upstream { status: 500, .. }));
    assert_eq!(credentials(&machine), (Some("valid".into()), None));
    ingest.assert_async().await;
}
