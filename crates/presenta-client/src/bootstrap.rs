//! Session bootstrap: runs once at process start and decides the
//! initial UI state.
//!
//! The ladder is strict: no token means no network at all; a stale
//! token gets exactly one refresh attempt; any failure after the token
//! was validated clears the session rather than leaving the UI
//! half-authenticated.

use crate::http::ApiClient;
use presenta_core::AgentRecord;

/// Terminal bootstrap states.
#[derive(Debug)]
pub enum BootOutcome {
    /// Show the login screen. The store holds no auth material.
    Unauthenticated,
    /// A validated session with a fresh profile snapshot.
    Ready {
        user: AgentRecord,
        profile_complete: bool,
    },
}

pub async fn bootstrap(client: &ApiClient) -> BootOutcome {
    match run(client).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, "bootstrap failed; starting unauthenticated");
            if let Err(err) = client.store().clear_auth() {
                tracing::error!(error = %err, "could not clear session store");
            }
            BootOutcome::Unauthenticated
        }
    }
}

async fn run(client: &ApiClient) -> crate::error::ApiResult<BootOutcome> {
    if client.store().access_token()?.is_none() {
        tracing::debug!("no stored token; skipping bootstrap probes");
        return Ok(BootOutcome::Unauthenticated);
    }

    // Lightweight authenticated probe; a network error counts as
    // invalid and falls through to the refresh attempt.
    let valid = client.probe_token().await.unwrap_or(false);
    if !valid {
        tracing::info!("stored token rejected, attempting refresh");
        if client.refresh_session().await.is_err() {
            // refresh_session already cleared the store.
            return Ok(BootOutcome::Unauthenticated);
        }
    }

    match client.fetch_profile().await {
        Ok(snapshot) => Ok(BootOutcome::Ready {
            user: snapshot.user,
            profile_complete: snapshot.complete,
        }),
        Err(err) => {
            tracing::warn!(error = %err, "profile fetch failed after validation; clearing session");
            client.store().clear_auth()?;
            Ok(BootOutcome::Unauthenticated)
        }
    }
}
