//! Integration test: session bootstrap ladder.
//!
//! Verifies that:
//! 1. No stored token → unauthenticated with zero network calls.
//! 2. A valid token → Ready, with the nested profile merged (nested
//!    media preferred, top-level fallback) and completeness persisted.
//! 3. A profile failure after validation clears the session instead of
//!    leaving a half-authenticated state.

mod common;

use common::{client_for, start, StubOptions};
use presenta_client::{bootstrap, BootOutcome};
use std::sync::atomic::Ordering;

#[tokio::test(flavor = "multi_thread")]
async fn no_token_means_no_network() {
    let stub = start(StubOptions::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);

    let outcome = bootstrap(&client).await;
    assert!(matches!(outcome, BootOutcome::Unauthenticated));
    assert_eq!(stub.state.total_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn valid_token_boots_ready_with_merged_profile() {
    let stub = start(StubOptions::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);
    client.store().store_tokens("good-token", Some("ref-1")).unwrap();

    let BootOutcome::Ready {
        user,
        profile_complete,
    } = bootstrap(&client).await
    else {
        panic!("expected a Ready bootstrap");
    };

    assert!(profile_complete);
    assert_eq!(user.company_name.as_deref(), Some("Reyes Realty"));
    // Nested profile media wins over the stale top-level URL.
    assert_eq!(user.headshot.as_deref(), Some("/media/new-headshot.jpg"));

    // The derived user and flag were persisted for the next start.
    assert!(client.store().profile_complete().unwrap());
    assert_eq!(
        client.store().load_user().unwrap().unwrap().company_name.as_deref(),
        Some("Reyes Realty")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_token_refreshes_then_boots_ready() {
    let stub = start(StubOptions::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);
    client.store().store_tokens("stale-token", Some("ref-1")).unwrap();

    let outcome = bootstrap(&client).await;
    assert!(matches!(outcome, BootOutcome::Ready { .. }));
    assert_eq!(stub.state.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        client.store().access_token().unwrap().as_deref(),
        Some("fresh-token")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_token_with_failing_refresh_boots_unauthenticated() {
    let stub = start(StubOptions {
        fail_refresh: true,
        ..Default::default()
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);
    client.store().store_tokens("stale-token", Some("ref-1")).unwrap();

    let outcome = bootstrap(&client).await;
    assert!(matches!(outcome, BootOutcome::Unauthenticated));
    assert!(!client.store().has_auth_material().unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn profile_failure_after_validation_clears_session() {
    // The probe is the profile endpoint's first hit; the real fetch is
    // the second, which this stub fails.
    let stub = start(StubOptions {
        fail_profile_after: Some(1),
        ..Default::default()
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(stub.addr, &dir);
    client.store().store_tokens("good-token", Some("ref-1")).unwrap();

    let outcome = bootstrap(&client).await;
    assert!(matches!(outcome, BootOutcome::Unauthenticated));
    assert!(!client.store().has_auth_material().unwrap());
}
