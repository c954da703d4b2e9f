//! Agent profile: fetch, update, and the shared form type used by both
//! registration and profile editing.

use crate::error::ApiResult;
use crate::http::ApiClient;
use presenta_core::AgentRecord;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The user as the client now knows them, with completeness already
/// recomputed and persisted.
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    pub user: AgentRecord,
    pub complete: bool,
}

/// Editable agent fields. Registration and profile update submit the
/// same set; only registration carries credentials.
#[derive(Debug, Clone, Default)]
pub struct AgentForm {
    pub email: String,
    /// Registration only.
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub company_name: String,
    pub license_number: String,
    pub years_experience: String,
    pub awards: String,
    pub specialty: String,
    pub shortest_sale: String,
    pub highest_sale: String,
    pub avg_days_on_market: String,
    pub mission: String,
    pub value_proposition: String,
    pub selling_style: String,
    pub testimonial_1: String,
    pub testimonial_2: String,
    pub testimonial_3: String,
    pub community_ties: String,
    /// Local image files to upload, when the user picked new ones.
    pub headshot: Option<PathBuf>,
    pub logo: Option<PathBuf>,
}

fn file_part(path: &Path) -> ApiResult<Part> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(name))
}

impl AgentForm {
    pub fn has_files(&self) -> bool {
        self.headshot.is_some() || self.logo.is_some()
    }

    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("email", &self.email),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("phone", &self.phone),
            ("company_name", &self.company_name),
            ("license_number", &self.license_number),
            ("years_experience", &self.years_experience),
            ("awards", &self.awards),
            ("specialty", &self.specialty),
            ("shortest_sale", &self.shortest_sale),
            ("highest_sale", &self.highest_sale),
            ("avg_days_on_market", &self.avg_days_on_market),
            ("mission", &self.mission),
            ("value_proposition", &self.value_proposition),
            ("selling_style", &self.selling_style),
            ("testimonial_1", &self.testimonial_1),
            ("testimonial_2", &self.testimonial_2),
            ("testimonial_3", &self.testimonial_3),
            ("community_ties", &self.community_ties),
        ]
    }

    /// Multipart body, with credentials when registering. The backend
    /// uses the email as the account name.
    pub(crate) fn multipart(&self, with_credentials: bool) -> ApiResult<Form> {
        let mut form = Form::new();
        if with_credentials {
            form = form.text("username", self.email.clone());
            if let Some(password) = &self.password {
                form = form.text("password", password.clone());
            }
        }
        for (key, value) in self.text_fields() {
            form = form.text(key, value.to_string());
        }
        if let Some(path) = &self.headshot {
            form = form.part("headshot", file_part(path)?);
        }
        if let Some(path) = &self.logo {
            form = form.part("logo", file_part(path)?);
        }
        Ok(form)
    }

    /// JSON body for text-only updates. One naming convention on the
    /// way out; tolerance for both is a read-side concern.
    pub(crate) fn json_body(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (key, value) in self.text_fields() {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        Value::Object(map)
    }
}

impl ApiClient {
    /// Fetches the profile, folds the nested profile object into a flat
    /// record, recomputes completeness, and persists both.
    pub async fn fetch_profile(&self) -> ApiResult<ProfileSnapshot> {
        let value = self.authorized(Method::GET, "/auth/profile/", None).await?;
        let user = AgentRecord::from_response(&value)?;
        let complete = user.is_complete();
        self.store().store_user(&user)?;
        self.store().set_profile_complete(complete)?;
        Ok(ProfileSnapshot { user, complete })
    }

    /// Pushes edits to the backend, then re-fetches so the snapshot
    /// carries server-side media URLs instead of local paths.
    pub async fn update_profile(&self, form: &AgentForm) -> ApiResult<ProfileSnapshot> {
        if form.has_files() {
            self.authorized_multipart(Method::PUT, "/auth/profile/", || form.multipart(false))
                .await?;
        } else {
            self.authorized(Method::PUT, "/auth/profile/", Some(form.json_body()))
                .await?;
        }
        self.fetch_profile().await
    }

    /// The backend-written agent blurb used as the presentation's
    /// welcome section.
    pub async fn generate_agent_description(&self) -> ApiResult<Option<String>> {
        let value = self
            .authorized(Method::POST, "/auth/generate-agent-description/", None)
            .await?;
        Ok(value
            .get("agent_description")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_skips_credentials() {
        let form = AgentForm {
            email: "dana@reyesrealty.com".into(),
            password: Some("hunter2".into()),
            company_name: "Reyes Realty".into(),
            ..Default::default()
        };
        let body = form.json_body();
        assert_eq!(body["email"], json!("dana@reyesrealty.com"));
        assert_eq!(body["company_name"], json!("Reyes Realty"));
        assert!(body.get("password").is_none());
        assert!(body.get("username").is_none());
    }
}
