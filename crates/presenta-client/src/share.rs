//! Sharing: mint public links, record shares, read stats, and fetch a
//! shared presentation without a session.

use crate::error::ApiResult;
use crate::http::ApiClient;
use chrono::Utc;
use presenta_core::{PendingShare, Presentation};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recipient marker the backend uses for link-only shares (no email).
pub const LINK_SHARE_MARKER: &str = "link-share";

/// Share ids are short, URL-safe and client-minted so the link can be
/// copied before the backend round-trip settles.
pub fn new_share_id() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}

pub fn share_link(base_url: &str, share_id: &str) -> String {
    format!("{}/shared/{}", base_url.trim_end_matches('/'), share_id)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    /// Recipient email, or [`LINK_SHARE_MARKER`] for plain link shares.
    pub email: String,
    pub property_address: String,
    pub analysis_content: String,
    pub share_message: String,
    pub share_link: String,
    pub shared_by: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareStats {
    #[serde(default, alias = "totalShares")]
    pub total_shares: i64,
    #[serde(default, alias = "totalViews")]
    pub total_views: i64,
    #[serde(default, alias = "emailStats")]
    pub email_stats: Vec<EmailShareStat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailShareStat {
    pub email: String,
    #[serde(default, alias = "timesViewed")]
    pub times_viewed: i64,
    #[serde(default, alias = "sharedAt")]
    pub shared_at: Option<String>,
}

/// A presentation opened through a public link. No session involved.
#[derive(Debug, Clone, Deserialize)]
pub struct SharedAnalysis {
    #[serde(default, alias = "propertyAddress")]
    pub property_address: Option<String>,
    #[serde(alias = "analysisContent")]
    pub analysis_content: String,
    #[serde(default, alias = "sharedBy")]
    pub shared_by: Option<String>,
    #[serde(default, alias = "timesViewed")]
    pub times_viewed: Option<i64>,
}

impl ApiClient {
    /// Records a share (email or link). Returns the backend's record id
    /// when it sends one.
    pub async fn share_analysis(&self, request: &ShareRequest) -> ApiResult<Option<i64>> {
        let value = self
            .authorized(Method::POST, "/auth/share/", Some(serde_json::to_value(request)?))
            .await?;
        Ok(value.get("share_id").and_then(serde_json::Value::as_i64))
    }

    /// Link-share shorthand: records the share and remembers the link
    /// locally so a failed round-trip can be reconciled later.
    pub async fn record_link_share(
        &self,
        presentation: &Presentation,
        share_link_url: &str,
        shared_by: &str,
    ) -> ApiResult<Option<i64>> {
        self.store().push_pending_share(PendingShare {
            share_link: share_link_url.to_string(),
            address: presentation.address.clone(),
            created_at: Utc::now(),
        })?;
        let request = ShareRequest {
            email: LINK_SHARE_MARKER.to_string(),
            property_address: presentation.address.clone(),
            analysis_content: presentation.content.clone(),
            share_message: format!(
                "Property analysis for {} shared via link",
                presentation.address
            ),
            share_link: share_link_url.to_string(),
            shared_by: shared_by.to_string(),
        };
        self.share_analysis(&request).await
    }

    pub async fn share_stats(&self, address: &str) -> ApiResult<ShareStats> {
        let value = self
            .authorized_query(
                Method::GET,
                "/auth/share/stats/",
                &[("address", address)],
                None,
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetches a shared presentation by public id. Unauthenticated: the
    /// viewer is not a user. View tracking happens backend-side.
    pub async fn fetch_shared(&self, share_id: &str) -> ApiResult<SharedAnalysis> {
        let value = self
            .public(Method::GET, &format!("/auth/shared/{share_id}/"), None)
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_ids_are_short_and_unique() {
        let a = new_share_id();
        let b = new_share_id();
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn share_link_shape() {
        assert_eq!(
            share_link("https://presenta.example/", "abc123"),
            "https://presenta.example/shared/abc123"
        );
    }

    #[test]
    fn share_request_serializes_camel_case() {
        let request = ShareRequest {
            email: LINK_SHARE_MARKER.into(),
            property_address: "1428 Elm Street".into(),
            analysis_content: "<div/>".into(),
            share_message: "take a look".into(),
            share_link: "https://presenta.example/shared/abc".into(),
            shared_by: "Dana Reyes".into(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("propertyAddress").is_some());
        assert!(value.get("sharedBy").is_some());
        assert!(value.get("property_address").is_none());
    }
}
