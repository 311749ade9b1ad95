//! Server runtime configuration.
//!
//! Resolved once at process startup and passed into [`crate::build_state`]. Request handlers
//! never read environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const REST_ADDR_VAR: &str = "STORYFORGE_REST_ADDR";
pub const DATA_FILE_VAR: &str = "STORYFORGE_DATA_FILE";
pub const ANON_KEY_VAR: &str = "STORYFORGE_ANON_KEY";
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("STORYFORGE_REST_ADDR is not a socket address: {0}")]
    InvalidAddr(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    rest_addr: SocketAddr,
    data_file: Option<PathBuf>,
    anon_key: Option<String>,
}

impl ServerConfig {
    pub fn new(
        rest_addr: SocketAddr,
        data_file: Option<PathBuf>,
        anon_key: Option<String>,
    ) -> Self {
        Self {
            rest_addr,
            data_file,
            anon_key,
        }
    }

    /// Reads the `STORYFORGE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = var(REST_ADDR_VAR).unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        let rest_addr = addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr.clone()))?;

        Ok(Self {
            rest_addr,
            data_file: var(DATA_FILE_VAR).map(PathBuf::from),
            anon_key: var(ANON_KEY_VAR),
        })
    }

    pub fn rest_addr(&self) -> SocketAddr {
        self.rest_addr
    }

    /// JSON file backing the key-value store; `None` means in-memory.
    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    /// Key required in the `apikey` header on signup, if any.
    pub fn anon_key(&self) -> Option<&str> {
        self.anon_key.as_deref()
    }
}
