use async_trait::async_trait;
use thiserror::Error;

use crate::auth::TokenError;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("could not authenticate with the model provider: {0}")]
    Auth(#[from] TokenError),

    #[error("model provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("model returned no text{}", .0.as_deref().map(|r| format!(" ({})", r)).unwrap_or_default())]
    EmptyResponse(Option<String>),

    #[error("invalid model endpoint: {0}")]
    Endpoint(String),
}

/// Turns an artisan's raw description into a polished narrative
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, raw_text: &str) -> Result<String, GenerationError>;
}

/// Build the storytelling prompt around the artisan's text, which is embedded verbatim
pub fn build_story_prompt(raw_text: &str) -> String {
    format!(
        r#"You are a master storyteller and head curator for an exhibit at a world-renowned museum.
Take the raw, authentic details provided by the artisan and transform them into a single, universally compelling story of around 150 words. The artisan's text may be in simple English, broken English, or a mix of languages; elevate it into a polished, poetic narrative.

Follow this five-part structure:
1. The Human Touch: begin with the artisan.
2. The Bridge to Tradition: link the work to the lineage of the craft.
3. The Soul of the Material: describe the unique materials.
4. The Symbol, Demystified: explain the meaning of the central symbol or pattern.
5. The Timeless Value: conclude by framing the object as a piece of history.

Tone and language:
- Evocative, poetic, and luxurious.
- Clear and accessible.
- Emphasize authenticity, masterful skill, and the soul of the craft.
- Do not invent any facts. If the source text is short, stay with what is given and draw out its cultural meaning.

Artisan's raw text:
---
{raw_text}
---

Now write the story."#
    )
}
