//! Authorized request layer with the token refresh/retry protocol.
//!
//! Every authorized call goes through the same path: attach the stored
//! access token, and on a 401 whose error text marks the token as
//! expired/invalid, refresh once and retry once. Refresh failure clears
//! the session and surfaces [`ApiError::SessionExpired`]. The refresh
//! step is single-flight: concurrent expired requests share one refresh
//! instead of racing their own.

use crate::error::{ApiError, ApiResult};
use presenta_core::{AppConfig, SessionStore};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    gateway_url: String,
    publishable_key: Option<String>,
    store: Arc<SessionStore>,
    /// Serializes token refreshes. Held only for the refresh round-trip,
    /// never across the caller's own request.
    refresh_lock: tokio::sync::Mutex<()>,
}

/// What the first attempt at a request came back as.
enum Attempt {
    Success(Value),
    /// 401 with an expired/invalid-token message: eligible for the one
    /// refresh-and-retry cycle.
    ExpiredToken,
    Failure(StatusCode, Value),
}

impl ApiClient {
    pub fn new(config: &AppConfig, store: Arc<SessionStore>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            gateway_url: config.payment_gateway_url.trim_end_matches('/').to_string(),
            publishable_key: config.payment_publishable_key.clone(),
            store,
            refresh_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    pub(crate) fn publishable_key(&self) -> Option<&str> {
        self.publishable_key.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one request and decodes the body tolerantly: a non-JSON
    /// body becomes an empty object so error mapping can proceed.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        json: Option<&Value>,
        bearer: Option<&str>,
    ) -> ApiResult<(StatusCode, Value)> {
        let mut request = self.http.request(method, self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = json {
            request = request.json(body);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        let value = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::Object(Default::default()));
        Ok((status, value))
    }

    async fn dispatch_multipart(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
        bearer: Option<&str>,
    ) -> ApiResult<(StatusCode, Value)> {
        let mut request = self.http.request(method, self.url(path)).multipart(form);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        let value = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::Object(Default::default()));
        Ok((status, value))
    }

    fn classify(status: StatusCode, value: &Value) -> Attempt {
        if status.is_success() {
            return Attempt::Success(value.clone());
        }
        if status == StatusCode::UNAUTHORIZED && is_expired_token_message(&error_message(value)) {
            return Attempt::ExpiredToken;
        }
        Attempt::Failure(status, value.clone())
    }

    /// A request with the bearer token attached and the refresh/retry
    /// protocol applied.
    pub(crate) async fn authorized(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<Value> {
        self.authorized_query(method, path, &[], body).await
    }

    pub(crate) async fn authorized_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let token = self.store.access_token()?;
        let (status, value) = self
            .dispatch(method.clone(), path, query, body.as_ref(), token.as_deref())
            .await?;
        match Self::classify(status, &value) {
            Attempt::Success(value) => Ok(value),
            Attempt::Failure(status, value) => Err(error_for(status, &value)),
            Attempt::ExpiredToken => {
                let access = self.refresh_session().await?;
                let (status, value) = self
                    .dispatch(method, path, query, body.as_ref(), Some(&access))
                    .await?;
                if status.is_success() {
                    Ok(value)
                } else {
                    Err(error_for(status, &value))
                }
            }
        }
    }

    /// Same protocol for multipart payloads. Forms are not reusable
    /// across attempts, so the caller provides a rebuild function.
    pub(crate) async fn authorized_multipart<F>(
        &self,
        method: Method,
        path: &str,
        build_form: F,
    ) -> ApiResult<Value>
    where
        F: Fn() -> ApiResult<reqwest::multipart::Form>,
    {
        let token = self.store.access_token()?;
        let (status, value) = self
            .dispatch_multipart(method.clone(), path, build_form()?, token.as_deref())
            .await?;
        match Self::classify(status, &value) {
            Attempt::Success(value) => Ok(value),
            Attempt::Failure(status, value) => Err(error_for(status, &value)),
            Attempt::ExpiredToken => {
                let access = self.refresh_session().await?;
                let (status, value) = self
                    .dispatch_multipart(method, path, build_form()?, Some(&access))
                    .await?;
                if status.is_success() {
                    Ok(value)
                } else {
                    Err(error_for(status, &value))
                }
            }
        }
    }

    /// A request with no credentials and no refresh handling (login,
    /// public share views).
    pub(crate) async fn public(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let (status, value) = self.dispatch(method, path, &[], body.as_ref(), None).await?;
        if status.is_success() {
            Ok(value)
        } else {
            Err(error_for(status, &value))
        }
    }

    /// A single authorized probe with no refresh attempt; the bootstrap
    /// uses it to decide whether a refresh is needed at all.
    pub(crate) async fn probe_token(&self) -> ApiResult<bool> {
        let Some(token) = self.store.access_token()? else {
            return Ok(false);
        };
        let (status, _) = self
            .dispatch(Method::GET, "/auth/profile/", &[], None, Some(&token))
            .await?;
        Ok(status.is_success())
    }

    /// Exchanges the refresh token for a new access token, single-flight.
    ///
    /// Exactly one refresh runs at a time; a caller that waited on the
    /// lock while another refresh completed reuses its result instead
    /// of spending the (possibly rotated) refresh token again. Any
    /// failure clears the session's auth material.
    pub async fn refresh_session(&self) -> ApiResult<String> {
        let before = self.store.access_token()?;
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.store.access_token()? {
            if before.as_deref() != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let Some(refresh) = self.store.refresh_token()? else {
            self.store.clear_auth()?;
            return Err(ApiError::SessionExpired);
        };

        let body = serde_json::json!({ "refresh": refresh });
        let outcome = self
            .dispatch(Method::POST, "/auth/refresh/", &[], Some(&body), None)
            .await;
        match outcome {
            Ok((status, value)) if status.is_success() => {
                let Some(access) = value.get("access").and_then(Value::as_str) else {
                    tracing::warn!("refresh response carried no access token; clearing session");
                    self.store.clear_auth()?;
                    return Err(ApiError::SessionExpired);
                };
                let rotated = value.get("refresh").and_then(Value::as_str);
                self.store.store_tokens(access, rotated)?;
                tracing::debug!("access token refreshed");
                Ok(access.to_string())
            }
            Ok((status, value)) => {
                tracing::warn!(%status, message = %error_message(&value), "token refresh rejected; clearing session");
                self.store.clear_auth()?;
                Err(ApiError::SessionExpired)
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed; clearing session");
                self.store.clear_auth()?;
                Err(ApiError::SessionExpired)
            }
        }
    }
}

/// Pulls the human-readable error out of a backend body, trying the
/// field names the backend actually uses.
pub(crate) fn error_message(value: &Value) -> String {
    for key in ["detail", "message", "error"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    "request failed".to_string()
}

/// Case-insensitive match for the backend's expired/invalid-token
/// wording; anything else on a 401 is a plain auth failure.
fn is_expired_token_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("token")
        && (message.contains("expired")
            || message.contains("invalid")
            || message.contains("not valid"))
}

fn error_for(status: StatusCode, value: &Value) -> ApiError {
    let message = error_message(value);
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
        _ => ApiError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expired_token_wording() {
        assert!(is_expired_token_message("Token is invalid or expired"));
        assert!(is_expired_token_message("Given token not valid for any token type"));
        assert!(is_expired_token_message("TOKEN EXPIRED"));
        // 401s that are not about the token must not trigger a refresh.
        assert!(!is_expired_token_message("No active account found"));
        assert!(!is_expired_token_message("expired trial"));
    }

    #[test]
    fn error_message_field_priority() {
        assert_eq!(
            error_message(&json!({"detail": "d", "message": "m"})),
            "d"
        );
        assert_eq!(error_message(&json!({"error": "e"})), "e");
        assert_eq!(error_message(&json!({})), "request failed");
    }
}
