use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::TokenProvider;
use crate::config::GoogleConfig;

use super::narrative::{build_story_prompt, GenerationError, NarrativeGenerator};

/// Gemini on Vertex AI, called through the `generateContent` REST method
pub struct VertexNarrativeGenerator {
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
    base_url: String,
    project: String,
    location: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl VertexNarrativeGenerator {
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
        project: impl Into<String>,
        location: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let location = location.into();
        Self {
            http,
            tokens,
            base_url: format!("https://{}-aiplatform.googleapis.com", location),
            project: project.into(),
            location,
            model: model.into(),
        }
    }

    pub fn from_config(
        config: &GoogleConfig,
        project: impl Into<String>,
        http: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self::new(http, tokens, project, &config.vertex_location, &config.vertex_model)
    }

    /// Override the API host (used against a mock server in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> Result<url::Url, GenerationError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| GenerationError::Endpoint(format!("{}: {}", self.base_url, e)))?;
        url.set_path(&format!(
            "/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.project, self.location, self.model
        ));
        Ok(url)
    }
}

#[async_trait]
impl NarrativeGenerator for VertexNarrativeGenerator {
    async fn generate(&self, raw_text: &str) -> Result<String, GenerationError> {
        let prompt = build_story_prompt(raw_text);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let token = self.tokens.access_token().await?;
        debug!(model = %self.model, input_chars = raw_text.chars().count(), "Requesting story generation");

        let response = self
            .http
            .post(self.endpoint()?)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let story = extract_text(parsed)?;

        info!(model = %self.model, output_chars = story.chars().count(), "Story generated");
        Ok(story)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let block_reason = response.prompt_feedback.and_then(|f| f.block_reason);

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(GenerationError::EmptyResponse(block_reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GenerationError::EmptyResponse(candidate.finish_reason.or(block_reason)));
    }
    Ok(text)
}
