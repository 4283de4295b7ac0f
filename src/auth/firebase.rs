use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{AuthError, IdentityVerifier, VerifiedIdentity};

/// Public keys used by Google to sign Firebase ID tokens
pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_KEY_TTL: Duration = Duration::from_secs(60 * 60);
const KEY_REFETCH_COOLDOWN: Duration = Duration::from_secs(60);
const MAX_UID_LEN: usize = 128;

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    expires_at: Instant,
}

impl CachedKeys {
    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now()
    }

    fn refetch_allowed(&self) -> bool {
        self.fetched_at.elapsed() >= KEY_REFETCH_COOLDOWN
    }
}

/// Verifies Firebase ID tokens locally against Google's published signing keys
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    http: reqwest::Client,
    validation: Validation,
    keys: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>, http: reqwest::Client) -> Self {
        let project_id = project_id.into();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", project_id)]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

        Self {
            project_id,
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            http,
            validation,
            keys: RwLock::new(None),
        }
    }

    /// Override the key endpoint (used against a mock server in tests)
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Resolve the decoding key for `kid`, refetching when the cache is stale
    /// or does not know the key (rotation). Unknown keys trigger at most one
    /// refetch per `KEY_REFETCH_COOLDOWN`.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = cached_key(self.keys.read().await.as_ref(), kid)? {
            return Ok(key);
        }

        // Writers queue here so concurrent misses share one fetch
        let mut cache = self.keys.write().await;
        if let Some(key) = cached_key(cache.as_ref(), kid)? {
            return Ok(key);
        }

        let fetched = self.fetch_keys().await?;
        let key = lookup_key(&fetched.keys, kid)?;
        *cache = Some(fetched);

        key.ok_or_else(|| unknown_key(kid))
    }

    async fn fetch_keys(&self) -> Result<CachedKeys, AuthError> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!("Failed to fetch Firebase signing keys: {}", e);
                AuthError::Unavailable(e.to_string())
            })?;

        let ttl = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEY_TTL);

        let keys: JwkSet = response.json().await.map_err(|e| {
            tracing::error!("Malformed Firebase key set: {}", e);
            AuthError::Unavailable(format!("malformed key set: {}", e))
        })?;

        tracing::debug!(count = keys.keys.len(), ttl_secs = ttl.as_secs(), "Fetched Firebase signing keys");

        let fetched_at = Instant::now();
        Ok(CachedKeys {
            keys,
            fetched_at,
            expires_at: fetched_at + ttl,
        })
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, AuthError> {
        let header = decode_header(credential)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidCredential(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidCredential("token has no 'kid' header".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let claims = decode::<FirebaseClaims>(credential, &key, &self.validation)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?
            .claims;

        if claims.sub.is_empty() || claims.sub.len() > MAX_UID_LEN {
            return Err(AuthError::InvalidCredential(
                "'sub' claim must be a non-empty string of at most 128 characters".to_string(),
            ));
        }

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
        })
    }
}

/// `Ok(None)` means the cache cannot answer and a fetch is needed
fn cached_key(cache: Option<&CachedKeys>, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
    let Some(cached) = cache.filter(|c| c.is_fresh()) else {
        return Ok(None);
    };
    match lookup_key(&cached.keys, kid)? {
        Some(key) => Ok(Some(key)),
        None if cached.refetch_allowed() => Ok(None),
        None => Err(unknown_key(kid)),
    }
}

fn unknown_key(kid: &str) -> AuthError {
    AuthError::InvalidCredential(format!("unknown signing key '{}'", kid))
}

fn lookup_key(keys: &JwkSet, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
    keys.find(kid)
        .map(|jwk| {
            DecodingKey::from_jwk(jwk)
                .map_err(|e| AuthError::Unavailable(format!("malformed signing key '{}': {}", kid, e)))
        })
        .transpose()
}

/// Extract `max-age` from a Cache-Control header value
fn parse_max_age(header: &str) -> Option<Duration> {
    header
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
