use std::fmt::Display;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::VerifiedIdentity;
use crate::database::ProfilePatch;
use crate::error::ApiError;
use crate::middleware::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StoryRequest {
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct StoryRefined {
    pub message: &'static str,
    pub original_text: String,
    pub refined_story: String,
}

/// POST /api/story/refine - generate a narrative and save it as the caller's bio.
///
/// The profile is written only after generation succeeds.
pub async fn refine(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    ApiJson(request): ApiJson<StoryRequest>,
) -> Result<Json<StoryRefined>, ApiError> {
    if request.raw_text.trim().is_empty() {
        return Err(ApiError::unprocessable_entity("raw_text must not be empty"));
    }

    let story = state.narrator.generate(&request.raw_text).await.map_err(|e| {
        tracing::error!(uid = %identity.uid, "Story generation failed: {}", e);
        refine_failed(e)
    })?;

    let patch = ProfilePatch {
        bio: Some(Some(story.clone())),
        last_story_source: Some(request.raw_text.clone()),
        ..ProfilePatch::for_identity(&identity)
    };

    state.profiles.upsert(&identity.uid, patch).await.map_err(|e| {
        tracing::error!(uid = %identity.uid, "Saving refined story failed: {}", e);
        refine_failed(e)
    })?;

    tracing::info!(uid = %identity.uid, "Story refined and saved");

    Ok(Json(StoryRefined {
        message: "Story refined and saved successfully!",
        original_text: request.raw_text,
        refined_story: story,
    }))
}

fn refine_failed(cause: impl Display) -> ApiError {
    ApiError::internal_server_error(format!("Failed to generate story: {}", cause))
}
