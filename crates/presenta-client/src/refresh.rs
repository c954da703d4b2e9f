//! Proactive token refresh: a periodic background check that exchanges
//! an access token nearing expiry before a request trips over it.
//!
//! Best-effort only. Failures are logged, never surfaced; correctness
//! still rests on the per-request refresh/retry protocol.

use crate::http::ApiClient;
use crate::token;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawns the refresh loop on the current runtime. The caller owns the
/// handle and must abort it when the session ends (logout or shell
/// teardown) so the timer does not leak.
pub fn spawn_refresh_scheduler(
    client: Arc<ApiClient>,
    every: Duration,
    lead: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup does not
        // race the bootstrap's own refresh.
        interval.tick().await;
        loop {
            interval.tick().await;
            tick(&client, lead).await;
        }
    })
}

async fn tick(client: &ApiClient, lead: chrono::Duration) {
    let token = match client.store().access_token() {
        Ok(Some(token)) => token,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, "refresh check could not read the store");
            return;
        }
    };
    if !token::expires_within(&token, lead) {
        return;
    }
    tracing::info!("access token nearing expiry, refreshing proactively");
    match client.refresh_session().await {
        Ok(_) => tracing::info!("proactive refresh succeeded"),
        Err(err) => tracing::warn!(error = %err, "proactive refresh failed"),
    }
}
