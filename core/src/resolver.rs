//! Host resolution.
//!
//! Turns a [`HostSource`] into the list of hosts a run scans. Only the directory
//! branch can fail, and its failure ends the run before any host is contacted.

use invscan_common::directory::{DirectoryAuth, DirectoryError, DirectoryQuery, DirectoryService};
use std::collections::HashMap;

use invscan_common::inventory::HostTarget;
use invscan_common::{info, warn};

/// Where the host list comes from.
#[derive(Debug, Clone)]
pub enum HostSource {
    /// Ask the directory for every computer object matching the query.
    Directory(DirectoryQuery),
    /// Use the caller's list as-is; the directory is never contacted.
    /// Repeated names are scanned once per occurrence.
    Batch(Vec<HostTarget>),
}

impl Default for HostSource {
    fn default() -> Self {
        HostSource::Directory(DirectoryQuery::default())
    }
}

pub async fn resolve_hosts(
    source: &HostSource,
    directory: &dyn DirectoryService,
) -> Result<Vec<HostTarget>, DirectoryError> {
    let hosts = match source {
        HostSource::Batch(hosts) => hosts.clone(),
        HostSource::Directory(query) => {
            let mode = match &query.auth {
                DirectoryAuth::Ambient => "current identity".to_string(),
                DirectoryAuth::Explicit {
                    auth_type,
                    credential,
                } => format!("{} as {}", auth_type, credential.username()),
            };
            info!("Querying directory with filter '{}' ({mode})", query.filter);

            let hosts = directory.computers(query).await?;
            info!("Directory returned {} computers", hosts.len());
            hosts
        }
    };

    warn_duplicates(&hosts);
    Ok(hosts)
}

/// Warns once per name that occurs more than once (case-insensitive).
fn warn_duplicates(hosts: &[HostTarget]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for host in hosts {
        *counts.entry(host.as_str().to_ascii_lowercase()).or_default() += 1;
    }

    let mut reported: Vec<&str> = Vec::new();
    for host in hosts {
        let key = host.as_str();
        let count = counts.get(&key.to_ascii_lowercase()).copied().unwrap_or(0);
        if count > 1 && !reported.iter().any(|seen| seen.eq_ignore_ascii_case(key)) {
            warn!("{host} is listed {count} times and will be scanned {count} times");
            reported.push(key);
        }
    }
}
