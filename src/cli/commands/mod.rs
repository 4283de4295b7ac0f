pub mod auth;
pub mod store;
pub mod story;
