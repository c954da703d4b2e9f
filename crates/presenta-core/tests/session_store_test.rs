//! Integration test: session store lifecycle.
//!
//! Verifies that:
//! 1. Tokens round-trip, with the legacy alias kept in lockstep.
//! 2. Recent searches dedupe by address and cap at five.
//! 3. `clear_auth` wipes every auth key; `clear_all` also drops lists.

use presenta_core::{AgentRecord, PendingShare, SessionStore};

fn open_store(dir: &tempfile::TempDir) -> SessionStore {
    SessionStore::open_path(dir.path()).expect("open session store")
}

#[test]
fn tokens_round_trip_with_legacy_alias() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    assert!(store.access_token().unwrap().is_none());

    store.store_tokens("acc-1", Some("ref-1")).unwrap();
    assert_eq!(store.access_token().unwrap().as_deref(), Some("acc-1"));
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("ref-1"));

    // A refresh that returns no rotated refresh token keeps the old one.
    store.store_tokens("acc-2", None).unwrap();
    assert_eq!(store.access_token().unwrap().as_deref(), Some("acc-2"));
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("ref-1"));
}

#[test]
fn user_and_flag_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let user = AgentRecord {
        first_name: Some("Dana".into()),
        last_name: Some("Reyes".into()),
        email: Some("dana@reyesrealty.com".into()),
        company_name: Some("Reyes Realty".into()),
        highest_sale: Some("$2.1M".into()),
        ..Default::default()
    };
    store.store_user(&user).unwrap();
    store.set_profile_complete(user.is_complete()).unwrap();

    let loaded = store.load_user().unwrap().expect("user stored");
    assert_eq!(loaded, user);
    assert!(store.profile_complete().unwrap());
}

#[test]
fn recent_searches_dedupe_and_cap() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    for address in [
        "1 First St",
        "2 Second St",
        "3 Third St",
        "4 Fourth St",
        "5 Fifth St",
        "6 Sixth St",
    ] {
        store.record_search(address).unwrap();
    }
    let searches = store.recent_searches().unwrap();
    assert_eq!(searches.len(), 5);
    assert_eq!(searches[0].address, "6 Sixth St");
    assert!(searches.iter().all(|s| s.address != "1 First St"));

    // Repeating an address moves it to the front without duplication.
    store.record_search("3 Third St").unwrap();
    let searches = store.recent_searches().unwrap();
    assert_eq!(searches.len(), 5);
    assert_eq!(searches[0].address, "3 Third St");
    assert_eq!(
        searches.iter().filter(|s| s.address == "3 Third St").count(),
        1
    );
}

#[test]
fn clear_auth_wipes_every_auth_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.store_tokens("acc", Some("ref")).unwrap();
    store.store_user(&AgentRecord::default()).unwrap();
    store.set_profile_complete(true).unwrap();
    store.record_search("1428 Elm Street").unwrap();
    assert!(store.has_auth_material().unwrap());

    store.clear_auth().unwrap();
    assert!(!store.has_auth_material().unwrap());
    assert!(store.access_token().unwrap().is_none());
    assert!(store.refresh_token().unwrap().is_none());
    assert!(store.load_user().unwrap().is_none());
    assert!(!store.profile_complete().unwrap());
    // Search history survives an auth wipe...
    assert_eq!(store.recent_searches().unwrap().len(), 1);
}

#[test]
fn clear_all_also_drops_lists() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.store_tokens("acc", Some("ref")).unwrap();
    store.record_search("1428 Elm Street").unwrap();
    store
        .push_pending_share(PendingShare {
            share_link: "http://localhost/shared/abc123".into(),
            address: "1428 Elm Street".into(),
            created_at: chrono::Utc::now(),
        })
        .unwrap();

    store.clear_all().unwrap();
    assert!(!store.has_auth_material().unwrap());
    assert!(store.recent_searches().unwrap().is_empty());
    assert!(store.pending_shares().unwrap().is_empty());
}
