use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};

use crate::auth::{
    FirebaseVerifier, IdentityVerifier, ServiceAccountKey, ServiceAccountTokenProvider,
    StaticTokenProvider, TokenProvider,
};
use crate::config::{AppConfig, GoogleConfig, StoreBackend};
use crate::database::{MemoryProfileStore, PgProfileStore, ProfileStore};
use crate::services::{NarrativeGenerator, VertexNarrativeGenerator};

/// The three external collaborators, constructed once at startup and shared
/// by every request.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub profiles: Arc<dyn ProfileStore>,
    pub narrator: Arc<dyn NarrativeGenerator>,
}

impl AppState {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        profiles: Arc<dyn ProfileStore>,
        narrator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            verifier,
            profiles,
            narrator,
        }
    }

    /// Build every collaborator from configuration. Any failure here is fatal.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let http = http_client()?;

        let google = GoogleServices::init(&config.google, http.clone())?;

        let verifier = FirebaseVerifier::new(&google.firebase_project, http.clone());
        info!("Firebase token verification initialized for project {}", verifier.project_id());

        let narrator = VertexNarrativeGenerator::from_config(
            &config.google,
            &google.vertex_project,
            http,
            google.tokens,
        );
        info!("Vertex AI initialized with model {}", narrator.model());

        let profiles = init_profile_store(config).await?;

        Ok(Self::new(Arc::new(verifier), profiles, Arc::new(narrator)))
    }

    /// Release pooled connections
    pub async fn shutdown(&self) {
        self.profiles.close().await;
    }
}

pub fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("artenact-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

pub async fn init_profile_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ProfileStore>> {
    match config.server.store {
        StoreBackend::Postgres => {
            let store = PgProfileStore::connect(&config.database)
                .await
                .context("failed to connect to the profile database")?;
            store.migrate().await.context("failed to apply profile schema")?;
            info!("Connected to PostgreSQL profile store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory profile store; profiles are lost on shutdown");
            Ok(Arc::new(MemoryProfileStore::new()))
        }
    }
}

/// Project ids and credentials resolved from the service account file and overrides
pub struct GoogleServices {
    pub firebase_project: String,
    pub vertex_project: String,
    pub tokens: Arc<dyn TokenProvider>,
}

impl GoogleServices {
    pub fn init(config: &GoogleConfig, http: reqwest::Client) -> anyhow::Result<Self> {
        let key = match ServiceAccountKey::from_file(&config.credentials_path) {
            Ok(key) => Some(key),
            Err(e) if config.vertex_access_token.is_some() => {
                warn!("{}; continuing with VERTEX_ACCESS_TOKEN", e);
                None
            }
            Err(e) => return Err(e).context("failed to load service account credentials"),
        };

        let key_project = key.as_ref().map(|k| k.project_id.clone());

        let firebase_project = config
            .firebase_project
            .clone()
            .or_else(|| key_project.clone())
            .context("FIREBASE_PROJECT_ID is not set and no credential file provides a project_id")?;

        let vertex_project = config
            .vertex_project
            .clone()
            .or(key_project)
            .context("GCLOUD_PROJECT is not set and no credential file provides a project_id")?;

        let tokens: Arc<dyn TokenProvider> = match (&config.vertex_access_token, key) {
            (Some(token), _) => Arc::new(StaticTokenProvider::new(token.clone())),
            (None, Some(key)) => {
                info!("Using service account {} for Vertex AI", key.client_email);
                Arc::new(
                    ServiceAccountTokenProvider::new(key, http)
                        .context("failed to load service account private key")?,
                )
            }
            (None, None) => bail!("no Vertex AI credentials available"),
        };

        Ok(Self {
            firebase_project,
            vertex_project,
            tokens,
        })
    }
}
