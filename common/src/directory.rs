//! Directory service port.
//!
//! The core resolves hosts through [`DirectoryService`] and never learns which
//! directory is on the other side.

use async_trait::async_trait;
use thiserror::Error;

use crate::inventory::{AuthType, Credential, HostTarget};

pub const MATCH_ALL_FILTER: &str = "*";

/// How the directory query authenticates.
#[derive(Debug, Clone, Default)]
pub enum DirectoryAuth {
    /// The identity the process already runs as.
    #[default]
    Ambient,
    Explicit {
        auth_type: AuthType,
        credential: Credential,
    },
}

#[derive(Debug, Clone)]
pub struct DirectoryQuery {
    pub filter: String,
    pub auth: DirectoryAuth,
}

impl DirectoryQuery {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            auth: DirectoryAuth::Ambient,
        }
    }

    pub fn with_auth(mut self, auth: DirectoryAuth) -> Self {
        self.auth = auth;
        self
    }
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        Self::new(MATCH_ALL_FILTER)
    }
}

/// The directory could not answer. Always fatal for the run.
#[derive(Debug, Error)]
#[error("directory query failed: {message}")]
pub struct DirectoryError {
    pub message: String,
}

impl DirectoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Returns the names of every computer object matching `query.filter`.
    async fn computers(&self, query: &DirectoryQuery) -> Result<Vec<HostTarget>, DirectoryError>;
}
