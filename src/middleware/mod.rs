pub mod auth;
pub mod json;

pub use auth::{extract_bearer, require_identity};
pub use json::ApiJson;
