//! Client configuration loaded from file and environment.
//!
//! Precedence: env `PRESENTA_CONFIG` path > `config/app.toml` > defaults,
//! with `PRESENTA__*` environment variables overriding either.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend REST base, e.g. `http://127.0.0.1:8000/api`.
    pub api_base_url: String,
    /// Origin used when minting public share links.
    pub share_base_url: String,
    /// Directory for the sled session store.
    pub storage_path: String,
    /// Per-request timeout applied on the HTTP client builder.
    pub request_timeout_secs: u64,
    /// Cadence of the proactive token-refresh check.
    pub refresh_interval_hours: u64,
    /// Refresh when the access token expires within this window.
    pub refresh_lead_minutes: u64,
    /// Where exported presentations are written.
    pub export_dir: String,
    /// Optional external HTML→PDF converter command; when unset,
    /// export stops at the HTML file.
    #[serde(default)]
    pub pdf_command: Option<String>,
    /// Card-payment gateway REST base.
    pub payment_gateway_url: String,
    /// Publishable gateway key; card checkout is disabled without it.
    #[serde(default)]
    pub payment_publishable_key: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("PRESENTA_CONFIG").unwrap_or_else(|_| "config/app".to_string());
        let builder = config::Config::builder()
            .set_default("api_base_url", "http://127.0.0.1:8000/api")?
            .set_default("share_base_url", "http://127.0.0.1:8000")?
            .set_default("storage_path", "./data")?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("refresh_interval_hours", 3_i64)?
            .set_default("refresh_lead_minutes", 30_i64)?
            .set_default("export_dir", "./exports")?
            .set_default("payment_gateway_url", "https://api.stripe.com")?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        builder
            .add_source(config::Environment::with_prefix("PRESENTA").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Full sled path for the session store.
    pub fn session_store_path(&self) -> std::path::PathBuf {
        Path::new(&self.storage_path).join("presenta_session")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_file() {
        let cfg = AppConfig::load().expect("defaults should always build");
        assert!(cfg.api_base_url.starts_with("http"));
        assert_eq!(cfg.request_timeout_secs, 30);
        assert!(cfg.session_store_path().ends_with("presenta_session"));
    }
}
