//! # API Shared
//!
//! Shared definitions for the Storyforge HTTP surface.
//!
//! Contains:
//! - Request and response bodies (`wire` module), used by the server and the CLI client
//! - Shared services like `HealthService`
//! - Authentication header parsing
//!
//! Used by `api-rest` and `storyforge-cli` so both sides agree on the JSON shapes.

pub mod auth;
pub mod health;
pub mod wire;

pub use auth::{bearer_token, validate_anon_key, AuthError};
pub use health::HealthService;
pub use wire::*;
