// handlers/protected/mod.rs - Protected handlers (bearer credential required)
//
// Every route here runs behind `middleware::require_identity`, so handlers
// receive the caller's `VerifiedIdentity` as a request extension.

pub mod profile;
pub mod story;

pub use profile::{get as profile_get, post as profile_post};
pub use story::refine as story_refine;
