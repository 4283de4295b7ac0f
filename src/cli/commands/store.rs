use anyhow::bail;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::{PgProfileStore, ProfileStore, StoreError};
use crate::state::init_profile_store;

pub async fn migrate(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = PgProfileStore::connect(&config.database).await?;
    let migrated = store.migrate().await;
    store.close().await;
    migrated?;

    utils::output_success(&output_format, "Profile schema is up to date", None)
}

pub async fn show_profile(config: &AppConfig, uid: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = init_profile_store(config).await?;
    let shown = print_profile(store.as_ref(), uid, output_format).await;
    store.close().await;
    shown
}

async fn print_profile(store: &dyn ProfileStore, uid: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let profile = match store.get(uid).await {
        Ok(profile) => profile,
        Err(StoreError::NotFound(_)) => bail!("No profile for uid {}", uid),
        Err(e) => return Err(e.into()),
    };

    match output_format {
        OutputFormat::Json => {
            utils::output_success(&output_format, "Profile found", Some(json!({ "user": profile })))
        }
        OutputFormat::Text => {
            utils::output_fields(&[
                ("firebase_uid", Some(profile.identity_key.as_str())),
                ("email", profile.email.as_deref()),
                ("name", profile.name.as_deref()),
                ("craft_type", profile.craft_type.as_deref()),
                ("bio", profile.bio.as_deref()),
                ("last_story_source", profile.last_story_source.as_deref()),
            ]);
            Ok(())
        }
    }
}
