//! Integration test: the token refresh/retry protocol against a live
//! (in-process) stub backend.
//!
//! Verifies that:
//! 1. An expired-token 401 triggers exactly one refresh and one retry,
//!    and the caller receives the retried response's data.
//! 2. Refresh failure clears every session key and surfaces
//!    `SessionExpired`.
//! 3. A 401 that is not about tokens never triggers a refresh.
//! 4. Concurrent expired requests share a single refresh.

mod common;

use common::{client_for, start, StubOptions};
use presenta_client::ApiError;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn expired_token_refreshes_once_and_retries_once() {
    let stub = start(StubOptions::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);
    client.store().store_tokens("stale-token", Some("ref-1")).unwrap();

    let rows = client.recent_analyses().await.expect("retried request succeeds");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].address, "1428 Elm Street, Springwood");

    assert_eq!(stub.state.refresh_calls.load(Ordering::SeqCst), 1);
    // First attempt + retry, nothing more.
    assert_eq!(stub.state.recent_calls.load(Ordering::SeqCst), 2);

    // Both tokens were overwritten by the refresh.
    assert_eq!(
        client.store().access_token().unwrap().as_deref(),
        Some("fresh-token")
    );
    assert_eq!(
        client.store().refresh_token().unwrap().as_deref(),
        Some("rotated-refresh")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_failure_clears_session_and_reports_expiry() {
    let stub = start(StubOptions {
        fail_refresh: true,
        ..Default::default()
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);
    client.store().store_tokens("stale-token", Some("ref-1")).unwrap();

    let err = client.recent_analyses().await.expect_err("must fail");
    assert!(matches!(err, ApiError::SessionExpired), "got {err:?}");

    assert_eq!(stub.state.refresh_calls.load(Ordering::SeqCst), 1);
    // No retry after a failed refresh.
    assert_eq!(stub.state.recent_calls.load(Ordering::SeqCst), 1);

    // The whole session is gone: access, refresh, legacy alias, user.
    assert!(!client.store().has_auth_material().unwrap());
    assert!(client.store().access_token().unwrap().is_none());
    assert!(client.store().refresh_token().unwrap().is_none());
    assert!(client.store().load_user().unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn non_token_401_does_not_refresh() {
    let stub = start(StubOptions {
        plain_401: true,
        ..Default::default()
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);
    client.store().store_tokens("stale-token", Some("ref-1")).unwrap();

    let err = client.recent_analyses().await.expect_err("must fail");
    assert!(matches!(err, ApiError::Auth(_)), "got {err:?}");

    assert_eq!(stub.state.refresh_calls.load(Ordering::SeqCst), 0);
    // The session is untouched by a plain auth failure.
    assert!(client.store().has_auth_material().unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_refresh_token_fails_without_calling_refresh() {
    let stub = start(StubOptions::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);
    client.store().store_tokens("stale-token", None).unwrap();

    let err = client.recent_analyses().await.expect_err("must fail");
    assert!(matches!(err, ApiError::SessionExpired), "got {err:?}");
    assert_eq!(stub.state.refresh_calls.load(Ordering::SeqCst), 0);
    assert!(!client.store().has_auth_material().unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_expiries_share_one_refresh() {
    let stub = start(StubOptions {
        refresh_delay_ms: 100,
        ..Default::default()
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(client_for(stub.addr, &dir));
    client.store().store_tokens("stale-token", Some("ref-1")).unwrap();

    let a = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.recent_analyses().await })
    };
    let b = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.recent_analyses().await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(a.is_ok() && b.is_ok(), "both callers succeed: {a:?} {b:?}");

    // Single-flight: the second caller reused the first one's refresh.
    assert_eq!(stub.state.refresh_calls.load(Ordering::SeqCst), 1);
}
