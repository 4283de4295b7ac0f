use artenact_api::{config::AppConfig, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, GCLOUD_PROJECT, etc.
    let _ = dotenvy::dotenv();

    server::init_tracing();

    let config = AppConfig::from_env()?;
    server::run(config).await
}
