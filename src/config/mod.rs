use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which backend holds profile documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

/// Google Cloud settings shared by token verification and Vertex AI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub credentials_path: PathBuf,
    pub vertex_project: Option<String>,
    pub firebase_project: Option<String>,
    pub vertex_location: String,
    pub vertex_model: String,
    pub vertex_access_token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl DatabaseConfig {
    /// Connection string, required only when profiles live in PostgreSQL
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CREDENTIALS_PATH: &str = "serviceAccountKey.json";
pub const DEFAULT_VERTEX_LOCATION: &str = "us-central1";
pub const DEFAULT_VERTEX_MODEL: &str = "gemini-1.5-pro-preview-0409";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Some(v) = env::var("ARTENACT_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: v })?;
        }
        if let Ok(v) = env::var("PROFILE_STORE") {
            self.server.store = match v.to_ascii_lowercase().as_str() {
                "postgres" | "postgresql" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::Invalid { name: "PROFILE_STORE", value: v }),
            };
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Google overrides
        if let Ok(v) = env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            self.google.credentials_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("GCLOUD_PROJECT") {
            self.google.vertex_project = Some(v);
        }
        if let Ok(v) = env::var("FIREBASE_PROJECT_ID") {
            self.google.firebase_project = Some(v);
        }
        if let Ok(v) = env::var("VERTEX_LOCATION") {
            self.google.vertex_location = v;
        }
        if let Ok(v) = env::var("VERTEX_MODEL") {
            self.google.vertex_model = v;
        }
        if let Ok(v) = env::var("VERTEX_ACCESS_TOKEN") {
            if !v.trim().is_empty() {
                self.google.vertex_access_token = Some(v);
            }
        }

        Ok(self)
    }

    fn base(environment: Environment) -> Self {
        Self {
            environment,
            server: ServerConfig {
                port: DEFAULT_PORT,
                store: StoreBackend::Postgres,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            google: GoogleConfig {
                credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
                vertex_project: None,
                firebase_project: None,
                vertex_location: DEFAULT_VERTEX_LOCATION.to_string(),
                vertex_model: DEFAULT_VERTEX_MODEL.to_string(),
                vertex_access_token: None,
            },
        }
    }

    fn development() -> Self {
        Self::base(Environment::Development)
    }

    fn staging() -> Self {
        let mut config = Self::base(Environment::Staging);
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.api.max_request_size_bytes = 1024 * 1024; // 1MB
        config
    }

    fn production() -> Self {
        let mut config = Self::base(Environment::Production);
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 256 * 1024; // 256KB
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.store, StoreBackend::Postgres);
        assert!(config.api.enable_request_logging);
        assert_eq!(config.google.vertex_location, "us-central1");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.database.max_connections, 50);
        assert!(!config.api.enable_request_logging);
        assert!(config.api.max_request_size_bytes < AppConfig::development().api.max_request_size_bytes);
    }

    #[test]
    fn database_url_is_required_when_absent_or_blank() {
        let mut database = AppConfig::development().database;
        assert!(matches!(database.database_url(), Err(ConfigError::Missing("DATABASE_URL"))));

        database.url = Some("   ".to_string());
        assert!(database.database_url().is_err());

        database.url = Some("postgres://localhost/artenact".to_string());
        assert_eq!(database.database_url().ok(), Some("postgres://localhost/artenact"));
    }
}
