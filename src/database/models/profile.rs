use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::VerifiedIdentity;

/// Artisan profile document as exposed to API callers.
///
/// Keyed by the verified identity; storage identifiers and bookkeeping
/// timestamps never appear here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "firebase_uid")]
    pub identity_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub craft_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_story_source: Option<String>,
}

/// Stored row in the `profiles` table
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub identity_key: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub craft_type: Option<String>,
    pub bio: Option<String>,
    pub last_story_source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            identity_key: row.identity_key,
            email: row.email,
            name: row.name,
            craft_type: row.craft_type,
            bio: row.bio,
            last_story_source: row.last_story_source,
        }
    }
}

/// Partial update merged into a profile.
///
/// For the editable fields the outer `Option` says whether the field was sent
/// and the inner one carries its value, so `Some(None)` clears it.
/// `email` only ever comes from the verified identity and is write-once;
/// `last_story_source` is only ever set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub name: Option<Option<String>>,
    pub craft_type: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub last_story_source: Option<String>,
}

impl ProfilePatch {
    /// Patch carrying only what the verified identity contributes
    pub fn for_identity(identity: &VerifiedIdentity) -> Self {
        Self {
            email: identity.email.clone(),
            ..Self::default()
        }
    }

    pub fn apply_to(self, profile: &mut UserProfile) {
        if profile.email.is_none() {
            profile.email = self.email;
        }
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(craft_type) = self.craft_type {
            profile.craft_type = craft_type;
        }
        if let Some(bio) = self.bio {
            profile.bio = bio;
        }
        if let Some(source) = self.last_story_source {
            profile.last_story_source = Some(source);
        }
    }
}

/// Deserialize a field so that an explicit `null` becomes `Some(None)`.
/// Pair with `#[serde(default)]` so an omitted field stays `None`.
pub fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
