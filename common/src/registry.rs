//! Remote registry port.
//!
//! A [`RemoteRegistry`] reads the uninstall entries of one host. Each call answers
//! with a discriminated result: the entries found, or a [`LookupFailure`].

use async_trait::async_trait;
use thiserror::Error;

use crate::inventory::{Credential, HostTarget, InstalledProduct};

pub const DEFAULT_PRODUCT_PREFIX: &str = "Mozilla Thunderbird";
pub const DEFAULT_UNINSTALL_ROOT: &str = r"HKLM:\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";

/// What to read on every host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Uninstall key roots, searched in order.
    pub roots: Vec<String>,
    /// Subkeys whose name starts with this prefix match.
    pub product_prefix: String,
}

impl LookupRequest {
    pub fn new(roots: Vec<String>, product_prefix: impl Into<String>) -> Self {
        Self {
            roots,
            product_prefix: product_prefix.into(),
        }
    }

    /// The wildcard key paths, one per root (e.g. `HKLM:\...\Uninstall\Mozilla Thunderbird*`).
    pub fn key_patterns(&self) -> Vec<String> {
        self.roots
            .iter()
            .map(|root| format!(r"{}\{}*", root.trim_end_matches('\\'), self.product_prefix))
            .collect()
    }
}

impl Default for LookupRequest {
    fn default() -> Self {
        Self::new(vec![DEFAULT_UNINSTALL_ROOT.to_string()], DEFAULT_PRODUCT_PREFIX)
    }
}

/// An error reported by the transport for one host, forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{target}: {message} ({reason})")]
pub struct LookupError {
    pub reason: String,
    pub target: String,
    pub message: String,
}

impl LookupError {
    pub fn new(reason: impl Into<String>, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            target: target.into(),
            message: message.into(),
        }
    }
}

/// The error side of a lookup.
///
/// `partial` carries entries the transport returned before it reported the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct LookupFailure {
    pub error: LookupError,
    pub partial: Vec<InstalledProduct>,
}

impl From<LookupError> for LookupFailure {
    fn from(error: LookupError) -> Self {
        Self {
            error,
            partial: Vec::new(),
        }
    }
}

pub type LookupResult = Result<Vec<InstalledProduct>, LookupFailure>;

#[async_trait]
pub trait RemoteRegistry: Send + Sync {
    /// Reads the entries matching `request` on `host`, as `credential` when given.
    async fn lookup(
        &self,
        host: &HostTarget,
        request: &LookupRequest,
        credential: Option<&Credential>,
    ) -> LookupResult;
}
