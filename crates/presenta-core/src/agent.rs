//! Agent record: the flat user object every other module works against.
//!
//! Backend payloads are inconsistent about naming (`first_name` vs
//! `firstName`) and sometimes wrap the extended fields in a nested
//! `profile` object. All of that is resolved here, once, at the
//! ingestion boundary; internal code never branches on naming
//! convention or digs into nested maps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A real-estate agent as the client sees them. Every optional field
/// deserializes from either snake_case or camelCase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(default, alias = "licenseNumber")]
    pub license_number: Option<String>,
    #[serde(default, alias = "yearsExperience")]
    pub years_experience: Option<String>,
    #[serde(default)]
    pub awards: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    /// Performance stats arrive as form strings, not numbers. A filled
    /// value (non-empty after trim) is what counts for completeness.
    #[serde(default, alias = "shortestSale")]
    pub shortest_sale: Option<String>,
    #[serde(default, alias = "highestSale")]
    pub highest_sale: Option<String>,
    #[serde(default, alias = "avgDaysOnMarket")]
    pub avg_days_on_market: Option<String>,
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default, alias = "valueProposition")]
    pub value_proposition: Option<String>,
    #[serde(default, alias = "sellingStyle")]
    pub selling_style: Option<String>,
    #[serde(default, alias = "testimonial1")]
    pub testimonial_1: Option<String>,
    #[serde(default, alias = "testimonial2")]
    pub testimonial_2: Option<String>,
    #[serde(default, alias = "testimonial3")]
    pub testimonial_3: Option<String>,
    #[serde(default, alias = "communityTies")]
    pub community_ties: Option<String>,
    /// Media URLs served by the backend.
    #[serde(default)]
    pub headshot: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// True when the value is present and non-blank. Empty strings from
/// half-filled forms are treated as absent everywhere.
fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl AgentRecord {
    /// Builds a flat record from a profile/login response.
    ///
    /// Accepts either a bare user object or an envelope of the form
    /// `{"user": {..., "profile": {...}}}`. Nested profile fields are
    /// folded into the flat record; a nested value wins only when it is
    /// actually filled, so a missing `profile.headshot` falls back to
    /// the top-level one.
    pub fn from_response(value: &Value) -> Result<Self, serde_json::Error> {
        let flat = match value.get("user") {
            Some(user) => {
                let mut map = user.as_object().cloned().unwrap_or_default();
                if let Some(profile) = user.get("profile").and_then(Value::as_object) {
                    for (key, nested) in profile {
                        if key == "user" || key == "id" {
                            continue;
                        }
                        let blank = nested.is_null()
                            || nested.as_str().is_some_and(|s| s.trim().is_empty());
                        if !blank {
                            map.insert(key.clone(), nested.clone());
                        }
                    }
                }
                map.remove("profile");
                Value::Object(map)
            }
            None => value.clone(),
        };
        serde_json::from_value(flat)
    }

    /// Profile-completeness rule mirrored from the backend: all
    /// essential identity fields filled, plus at least one performance
    /// stat. Pure and deterministic; callers recompute it on every
    /// transition rather than trusting a stored flag.
    pub fn is_complete(&self) -> bool {
        let essentials = filled(&self.company_name)
            && filled(&self.first_name)
            && filled(&self.last_name)
            && filled(&self.email);
        let has_stat = filled(&self.shortest_sale)
            || filled(&self.highest_sale)
            || filled(&self.avg_days_on_market);
        essentials && has_stat
    }

    /// "First Last", falling back to email, for share attribution.
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        self.email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or("Unknown agent")
            .to_string()
    }
}
