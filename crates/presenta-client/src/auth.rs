//! Login, registration, and logout.

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;
use crate::profile::{AgentForm, ProfileSnapshot};
use presenta_core::AgentRecord;
use reqwest::Method;
use serde_json::{json, Value};

impl ApiClient {
    /// Exchanges credentials for a token pair. Bad credentials surface
    /// as [`ApiError::Auth`] and leave any stored session untouched; a
    /// successful login overwrites it.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<ProfileSnapshot> {
        let body = json!({ "username": email, "password": password });
        let value = self.public(Method::POST, "/auth/login/", Some(body)).await?;

        let access = value
            .get("access")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Auth("login response carried no access token".into()))?;
        self.store()
            .store_tokens(access, value.get("refresh").and_then(Value::as_str))?;

        let user = AgentRecord::from_response(&value)?;
        let complete = user.is_complete();
        self.store().store_user(&user)?;
        self.store().set_profile_complete(complete)?;
        tracing::info!(complete, "login succeeded");
        Ok(ProfileSnapshot { user, complete })
    }

    /// Creates the account (multipart: profile fields plus optional
    /// headshot/logo). Does not log the user in; the caller routes to
    /// the login form.
    pub async fn register(&self, form: &AgentForm) -> ApiResult<()> {
        if form.password.is_none() {
            return Err(ApiError::Validation("a password is required".into()));
        }
        self.authorized_multipart(Method::POST, "/auth/register/", || form.multipart(true))
            .await?;
        Ok(())
    }

    /// Drops the whole persisted session. Purely local; the backend
    /// holds no server-side session to tear down.
    pub fn logout(&self) -> ApiResult<()> {
        self.store().clear_all()?;
        tracing::info!("session cleared on logout");
        Ok(())
    }
}
