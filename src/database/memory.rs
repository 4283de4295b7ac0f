use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::models::profile::{ProfilePatch, UserProfile};
use crate::database::store::{ProfileStore, StoreError};

/// Process-local profile store for development runs and tests.
/// Contents are lost on shutdown.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, identity_key: &str) -> Result<UserProfile, StoreError> {
        self.profiles
            .read()
            .await
            .get(identity_key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(identity_key.to_string()))
    }

    async fn upsert(&self, identity_key: &str, patch: ProfilePatch) -> Result<UserProfile, StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(identity_key.to_string())
            .or_insert_with(|| UserProfile {
                identity_key: identity_key.to_string(),
                ..UserProfile::default()
            });

        patch.apply_to(profile);
        Ok(profile.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {
        self.profiles.write().await.clear();
    }
}
