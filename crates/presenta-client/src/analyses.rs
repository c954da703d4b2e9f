//! Presentation generation and the saved-analysis CRUD surface.
//!
//! Generation goes through the backend's chat-completion proxy: the
//! client builds one sectioned prompt for the target address and
//! consumes an OpenAI-shaped response. Saved analyses are what the
//! recent panel and "view from history" run on.

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;
use presenta_core::Presentation;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Model requested from the chat-completion proxy.
const GENERATION_MODEL: &str = "sonar";

/// Section order of a generated presentation. The welcome section is
/// prepended only when the agent blurb is available.
const SECTIONS: [&str; 8] = [
    "What Buyers Love About the Property",
    "Neighborhood & Proximity Highlights",
    "Ideal Buyer Persona",
    "Market Snapshot",
    "Suggested Pricing Strategy",
    "3-Week Marketing Plan",
    "Local Market Report",
    "Selling Timeline Overview",
];

// Chat-completion request/response (OpenAI-compatible proxy).
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageBody,
}

#[derive(Deserialize)]
struct ChatMessageBody {
    content: String,
}

/// One row of the recent-analyses side panel.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSummary {
    pub id: i64,
    pub address: String,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A saved analysis as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedAnalysis {
    pub id: i64,
    pub address: String,
    #[serde(default)]
    pub package_name: Option<String>,
    pub analysis_content: String,
    #[serde(default)]
    pub analysis_model: Option<String>,
}

impl SavedAnalysis {
    /// Re-shapes a stored row into the preview screen's input.
    pub fn into_presentation(self) -> Presentation {
        Presentation {
            address: self.address,
            content: self.analysis_content,
            model: self.analysis_model.unwrap_or_else(|| GENERATION_MODEL.to_string()),
            analysis_id: Some(self.id),
        }
    }
}

/// Builds the generation prompt: sectioned HTML, current web data,
/// no markdown leakage.
fn presentation_prompt(address: &str, agent_blurb: Option<&str>) -> String {
    let mut prompt = format!(
        "Create a comprehensive, data-driven real estate listing presentation for the \
         property at {address}.\n\
         Use real-time web search to gather current, accurate market information.\n\
         Format the response as clean HTML inside <div class=\"property-analysis\">, one \
         <section class=\"analysis-section\"> per topic with an <h2> header. Do not use \
         markdown, stars, or hashes.\n"
    );
    if let Some(blurb) = agent_blurb {
        prompt.push_str("Open with a Welcome section containing exactly this agent introduction:\n");
        prompt.push_str(blurb);
        prompt.push('\n');
    }
    prompt.push_str("Sections, in order:\n");
    for (i, section) in SECTIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. {section}\n", i + 1));
    }
    prompt.push_str(
        "The Market Snapshot must carry Active, Pending and Recently Sold tables \
         (Address|Beds|Baths|Sqft|Price) restricted to a 1-3 mile radius, listing only \
         properties actually found; state when none were found instead of inventing rows. \
         Replace every placeholder with real, current, location-specific data: actual \
         school names, local amenities, price ranges, days on market, and a recommended \
         list price range justified by the comparable sales.",
    );
    prompt
}

impl ApiClient {
    /// Generates a presentation for `address`.
    ///
    /// The agent blurb is fetched first and woven into the prompt;
    /// blurb failure degrades to a presentation without the welcome
    /// section rather than failing the whole generation.
    pub async fn generate_presentation(&self, address: &str) -> ApiResult<Presentation> {
        let blurb = match self.generate_agent_description().await {
            Ok(blurb) => blurb,
            Err(err) => {
                tracing::warn!(error = %err, "agent description unavailable, continuing without it");
                None
            }
        };

        let request = ChatRequest {
            model: GENERATION_MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: presentation_prompt(address, blurb.as_deref()),
            }],
        };
        let value = self
            .authorized(
                Method::POST,
                "/auth/perplexity/",
                Some(serde_json::to_value(&request)?),
            )
            .await?;
        let response: ChatResponse = serde_json::from_value(value)?;
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            ApiError::Backend {
                status: 502,
                message: "generation returned no choices".into(),
            }
        })?;
        Ok(Presentation {
            address: address.to_string(),
            content: choice.message.content,
            model: response.model.unwrap_or_else(|| GENERATION_MODEL.to_string()),
            analysis_id: None,
        })
    }

    /// Persists a generated presentation; returns the new analysis id.
    pub async fn save_analysis(
        &self,
        presentation: &Presentation,
        package_name: &str,
    ) -> ApiResult<i64> {
        let body = json!({
            "address": presentation.address,
            "package_name": package_name,
            "analysis_content": presentation.content,
            "analysis_model": presentation.model,
        });
        let value = self
            .authorized(Method::POST, "/auth/analyses/save/", Some(body))
            .await?;
        value
            .get("id")
            .or_else(|| value.get("analysis_id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| ApiError::Backend {
                status: 500,
                message: "save returned no analysis id".into(),
            })
    }

    pub async fn recent_analyses(&self) -> ApiResult<Vec<AnalysisSummary>> {
        let value = self
            .authorized(Method::GET, "/auth/analyses/recent/", None)
            .await?;
        let rows = value
            .get("analyses")
            .cloned()
            .unwrap_or_else(|| Value::Array(vec![]));
        Ok(serde_json::from_value(rows)?)
    }

    pub async fn get_analysis(&self, id: i64) -> ApiResult<SavedAnalysis> {
        let value = self
            .authorized(Method::GET, &format!("/auth/analyses/{id}/"), None)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn delete_analysis(&self, id: i64) -> ApiResult<()> {
        self.authorized(Method::DELETE, &format!("/auth/analyses/{id}/delete/"), None)
            .await?;
        Ok(())
    }

    /// Writes edited section content back to a saved analysis.
    pub async fn update_analysis(&self, id: i64, content: &str) -> ApiResult<()> {
        let body = json!({ "analysis_content": content });
        self.authorized(
            Method::PUT,
            &format!("/auth/analyses/{id}/update/"),
            Some(body),
        )
        .await?;
        Ok(())
    }
}
