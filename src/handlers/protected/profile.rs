use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::VerifiedIdentity;
use crate::database::{explicit_null, ProfilePatch, UserProfile};
use crate::error::ApiError;
use crate::middleware::ApiJson;
use crate::state::AppState;

/// Editable profile fields. Omitted fields are left alone, `null` clears the
/// field. Anything else in the body (email, firebase_uid) is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "explicit_null")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub craft_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub bio: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct ProfileSynced {
    pub message: &'static str,
    pub user_data: UserProfile,
}

/// GET /api/profile - the caller's profile
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state.profiles.get(&identity.uid).await?;
    Ok(Json(ProfileResponse { user }))
}

/// POST /api/profile - create or merge the caller's profile
pub async fn post(
    State(state): State<AppState>,
    Extension(identity): Extension<VerifiedIdentity>,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<(StatusCode, Json<ProfileSynced>), ApiError> {
    let patch = ProfilePatch {
        name: body.name,
        craft_type: body.craft_type,
        bio: body.bio,
        ..ProfilePatch::for_identity(&identity)
    };

    let user_data = state.profiles.upsert(&identity.uid, patch).await?;
    tracing::info!(uid = %identity.uid, "Profile synced");

    Ok((
        StatusCode::CREATED,
        Json(ProfileSynced {
            message: "Profile synced successfully",
            user_data,
        }),
    ))
}
