#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use artenact_api::auth::{AuthError, IdentityVerifier, VerifiedIdentity};
use artenact_api::config::ApiConfig;
use artenact_api::database::MemoryProfileStore;
use artenact_api::services::{GenerationError, NarrativeGenerator};
use artenact_api::{app, AppState};

pub const ASHA_TOKEN: &str = "token-asha";
pub const RAVI_TOKEN: &str = "token-ravi";
pub const EXPIRED_TOKEN: &str = "token-expired";

pub const TEST_RSA_KEY_PEM: &str = include_str!("../fixtures/test_rsa_key.pem");
pub const TEST_JWKS: &str = include_str!("../fixtures/test_jwks.json");
pub const TEST_KEY_ID: &str = "test-key";

/// Accepts a fixed set of opaque tokens
pub struct FakeVerifier {
    identities: HashMap<&'static str, VerifiedIdentity>,
}

impl FakeVerifier {
    pub fn new() -> Self {
        let mut identities = HashMap::new();
        identities.insert(
            ASHA_TOKEN,
            VerifiedIdentity {
                uid: "uid-asha".to_string(),
                email: Some("asha@example.com".to_string()),
            },
        );
        identities.insert(
            RAVI_TOKEN,
            VerifiedIdentity {
                uid: "uid-ravi".to_string(),
                email: None,
            },
        );
        Self { identities }
    }
}

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, AuthError> {
        if credential == EXPIRED_TOKEN {
            return Err(AuthError::InvalidCredential("Token expired".to_string()));
        }
        self.identities
            .get(credential)
            .cloned()
            .ok_or_else(|| AuthError::InvalidCredential("Wrong number of segments in token".to_string()))
    }
}

/// Narrative generator returning scripted output and counting calls
pub struct StubNarrator {
    reply: Mutex<Result<String, String>>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl StubNarrator {
    pub fn replying(story: &str) -> Self {
        Self {
            reply: Mutex::new(Ok(story.to_string())),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_with(&self, story: &str) {
        *self.reply.lock().unwrap() = Ok(story.to_string());
    }

    pub fn fail_with(&self, message: &str) {
        *self.reply.lock().unwrap() = Err(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrativeGenerator for StubNarrator {
    async fn generate(&self, raw_text: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(raw_text.to_string());

        self.reply
            .lock()
            .unwrap()
            .clone()
            .map_err(|message| GenerationError::Provider { status: 429, message })
    }
}

pub struct TestApp {
    pub router: Router,
    pub profiles: Arc<MemoryProfileStore>,
    pub narrator: Arc<StubNarrator>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_api_config(ApiConfig {
            enable_request_logging: false,
            max_request_size_bytes: 64 * 1024,
        })
    }

    pub fn with_api_config(api: ApiConfig) -> Self {
        let profiles = Arc::new(MemoryProfileStore::new());
        let narrator = Arc::new(StubNarrator::replying("A story of clay and fire."));
        let state = AppState::new(Arc::new(FakeVerifier::new()), profiles.clone(), narrator.clone());

        Self {
            router: app(state, &api),
            profiles,
            narrator,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, path, token, None)).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, path, token, Some(body))).await
    }
}

pub fn request(method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
