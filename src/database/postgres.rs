use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::manager::DatabaseManager;
use crate::database::models::profile::{ProfilePatch, ProfileRow, UserProfile};
use crate::database::store::{ProfileStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id UUID PRIMARY KEY,
        identity_key TEXT NOT NULL,
        email TEXT,
        name TEXT,
        craft_type TEXT,
        bio TEXT,
        last_story_source TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS profiles_identity_key_idx ON profiles (identity_key)",
];

const SELECT_PROFILE: &str = r#"
    SELECT id, identity_key, email, name, craft_type, bio, last_story_source, created_at, updated_at
    FROM profiles
    WHERE identity_key = $1
"#;

// One statement, so the unique index serialises concurrent writers per key.
// Email is write-once. $8..$10 flag which editable columns were sent; a sent
// column takes the new value even when it is NULL.
const UPSERT_PROFILE: &str = r#"
    INSERT INTO profiles (id, identity_key, email, name, craft_type, bio, last_story_source)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (identity_key) DO UPDATE SET
        email = COALESCE(profiles.email, EXCLUDED.email),
        name = CASE WHEN $8 THEN EXCLUDED.name ELSE profiles.name END,
        craft_type = CASE WHEN $9 THEN EXCLUDED.craft_type ELSE profiles.craft_type END,
        bio = CASE WHEN $10 THEN EXCLUDED.bio ELSE profiles.bio END,
        last_story_source = COALESCE(EXCLUDED.last_story_source, profiles.last_story_source),
        updated_at = now()
    RETURNING id, identity_key, email, name, craft_type, bio, last_story_source, created_at, updated_at
"#;

/// Profile documents in the PostgreSQL `profiles` table
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = DatabaseManager::connect(config).await?;
        Ok(Self::new(pool))
    }

    /// Create the profiles table and its identity index if missing
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Profile schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, identity_key: &str) -> Result<UserProfile, StoreError> {
        sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE)
            .bind(identity_key)
            .fetch_optional(&self.pool)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| StoreError::NotFound(identity_key.to_string()))
    }

    async fn upsert(&self, identity_key: &str, patch: ProfilePatch) -> Result<UserProfile, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(UPSERT_PROFILE)
            .bind(Uuid::new_v4())
            .bind(identity_key)
            .bind(patch.email)
            .bind(patch.name.clone().flatten())
            .bind(patch.craft_type.clone().flatten())
            .bind(patch.bio.clone().flatten())
            .bind(patch.last_story_source)
            .bind(patch.name.is_some())
            .bind(patch.craft_type.is_some())
            .bind(patch.bio.is_some())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(identity_key, profile_id = %row.id, "Upserted profile");
        Ok(row.into())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Closed database pool");
    }
}
