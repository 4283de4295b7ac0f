use async_trait::async_trait;
use thiserror::Error;

use super::models::profile::{ProfilePatch, UserProfile};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Collection of profile documents keyed by verified identity.
///
/// `upsert` must be atomic per identity key: concurrent writes for one key
/// resolve field-by-field, last write wins.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, identity_key: &str) -> Result<UserProfile, StoreError>;

    /// Merge `patch` into the profile for `identity_key`, creating it if absent.
    /// Returns the merged document.
    async fn upsert(&self, identity_key: &str, patch: ProfilePatch) -> Result<UserProfile, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    async fn close(&self);
}
