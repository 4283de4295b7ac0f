// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (Firebase ID token required, /api/*)
pub mod public;
pub mod protected;
