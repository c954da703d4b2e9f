//! Sled-backed session store: the durable client-side state that a
//! browser would keep in localStorage.
//!
//! One tree holds a handful of well-known keys. Auth material (both
//! tokens, the legacy alias, the cached user and the completeness
//! flag) is cleared as a unit on irrecoverable auth failure; logout
//! additionally drops the recent-search and pending-share lists.

use crate::agent::AgentRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current access token.
const KEY_ACCESS: &str = "access";
/// Refresh token.
const KEY_REFRESH: &str = "refresh";
/// Legacy alias kept in lockstep with `access` for on-disk
/// compatibility with older client versions.
const KEY_TOKEN: &str = "token";
/// Serialized [`AgentRecord`].
const KEY_USER: &str = "user";
/// Cached completeness flag; a cache only, recomputed on transitions.
const KEY_PROFILE_COMPLETE: &str = "profile_complete";
const KEY_RECENT_SEARCHES: &str = "recent_searches";
const KEY_PENDING_SHARES: &str = "pending_shares";

/// Keys wiped together when the session dies.
const AUTH_KEYS: [&str; 5] = [
    KEY_ACCESS,
    KEY_REFRESH,
    KEY_TOKEN,
    KEY_USER,
    KEY_PROFILE_COMPLETE,
];

const RECENT_SEARCH_CAP: usize = 5;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sled(#[from] sled::Error),
    #[error("stored value is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("stored value is not valid UTF-8")]
    Utf8,
}

/// One entry in the recent-search side list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub address: String,
    pub searched_at: DateTime<Utc>,
}

/// A share link handed out before the backend call settled, kept so it
/// can be reconciled later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingShare {
    pub share_link: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

pub struct SessionStore {
    tree: sled::Tree,
    // Keep the Db alive for the tree's lifetime.
    _db: sled::Db,
}

impl SessionStore {
    /// Opens (or creates) the store at `path`. Sled is single-writer:
    /// two processes must not open the same path concurrently.
    pub fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = sled::open(path)?;
        let tree = db.open_tree("session")?;
        Ok(Self { tree, _db: db })
    }

    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        match self.tree.get(key)? {
            Some(raw) => String::from_utf8(raw.to_vec())
                .map(Some)
                .map_err(|_| StoreError::Utf8),
            None => Ok(None),
        }
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.tree.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.tree.insert(key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    /// The token attached to authorized requests; falls back to the
    /// legacy alias when only that is present.
    pub fn access_token(&self) -> StoreResult<Option<String>> {
        match self.get_string(KEY_ACCESS)? {
            Some(token) => Ok(Some(token)),
            None => self.get_string(KEY_TOKEN),
        }
    }

    pub fn refresh_token(&self) -> StoreResult<Option<String>> {
        self.get_string(KEY_REFRESH)
    }

    /// Overwrites the access token (and its legacy alias); the refresh
    /// token only when the backend returned a new one.
    pub fn store_tokens(&self, access: &str, refresh: Option<&str>) -> StoreResult<()> {
        self.tree.insert(KEY_ACCESS, access.as_bytes())?;
        self.tree.insert(KEY_TOKEN, access.as_bytes())?;
        if let Some(refresh) = refresh {
            self.tree.insert(KEY_REFRESH, refresh.as_bytes())?;
        }
        Ok(())
    }

    pub fn store_user(&self, user: &AgentRecord) -> StoreResult<()> {
        self.set_json(KEY_USER, user)
    }

    pub fn load_user(&self) -> StoreResult<Option<AgentRecord>> {
        self.get_json(KEY_USER)
    }

    pub fn set_profile_complete(&self, complete: bool) -> StoreResult<()> {
        self.tree
            .insert(KEY_PROFILE_COMPLETE, if complete { b"true".as_ref() } else { b"false".as_ref() })?;
        Ok(())
    }

    pub fn profile_complete(&self) -> StoreResult<bool> {
        Ok(self.get_string(KEY_PROFILE_COMPLETE)?.as_deref() == Some("true"))
    }

    /// Prepends a search, deduping by address and capping the list.
    pub fn record_search(&self, address: &str) -> StoreResult<()> {
        let mut searches = self.recent_searches()?;
        searches.retain(|s| s.address != address);
        searches.insert(
            0,
            RecentSearch {
                address: address.to_string(),
                searched_at: Utc::now(),
            },
        );
        searches.truncate(RECENT_SEARCH_CAP);
        self.set_json(KEY_RECENT_SEARCHES, &searches)
    }

    pub fn recent_searches(&self) -> StoreResult<Vec<RecentSearch>> {
        Ok(self.get_json(KEY_RECENT_SEARCHES)?.unwrap_or_default())
    }

    pub fn push_pending_share(&self, share: PendingShare) -> StoreResult<()> {
        let mut shares: Vec<PendingShare> =
            self.get_json(KEY_PENDING_SHARES)?.unwrap_or_default();
        shares.push(share);
        self.set_json(KEY_PENDING_SHARES, &shares)
    }

    pub fn pending_shares(&self) -> StoreResult<Vec<PendingShare>> {
        Ok(self.get_json(KEY_PENDING_SHARES)?.unwrap_or_default())
    }

    /// Wipes auth material. Used on refresh failure and session expiry;
    /// the journey lists survive so a re-login keeps its history.
    pub fn clear_auth(&self) -> StoreResult<()> {
        for key in AUTH_KEYS {
            self.tree.remove(key)?;
        }
        Ok(())
    }

    /// Full wipe for logout: auth material plus the per-user lists.
    pub fn clear_all(&self) -> StoreResult<()> {
        self.clear_auth()?;
        self.tree.remove(KEY_RECENT_SEARCHES)?;
        self.tree.remove(KEY_PENDING_SHARES)?;
        Ok(())
    }

    /// True when any auth key is still present; used by tests and the
    /// bootstrap probe.
    pub fn has_auth_material(&self) -> StoreResult<bool> {
        for key in AUTH_KEYS {
            if self.tree.contains_key(key)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
