pub mod firebase;
pub mod service_account;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use firebase::FirebaseVerifier;
pub use service_account::{
    ServiceAccountKey, ServiceAccountTokenProvider, StaticTokenProvider, TokenError, TokenProvider,
};

/// Caller identity established from a verified bearer credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Bearer token not provided")]
    MissingCredential,

    #[error("Invalid authentication credentials: {0}")]
    InvalidCredential(String),

    #[error("Identity verification unavailable: {0}")]
    Unavailable(String),
}

/// Verifies an opaque bearer credential against the identity provider.
///
/// Implementations must not cache verification results; every call is a
/// fresh verification.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, AuthError>;
}
