//! # Host Target Model
//!
//! Defines the hosts a run contacts and how a batch is written on the command line.
//!
//! A batch value can be:
//! * A single host name (e.g. `WS-014`, `ws-014.corp.example`, `10.0.4.21`).
//! * A comma-separated list (e.g. `WS-014, WS-015`).
//! * A file reference (`@hosts.txt`), one host per line, `#` starts a comment line.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::success;

/// A host identifier. Never empty, never contains whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostTarget(String);

impl HostTarget {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HostTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(TargetError::Empty);
        }
        if name.chars().any(|c| c.is_whitespace() || c == ',' || c.is_control()) {
            return Err(TargetError::InvalidName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("host name cannot be empty")]
    Empty,
    #[error("invalid host name: {0:?}")]
    InvalidName(String),
    #[error("failed to read host list {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: {source}")]
    FileEntry {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<TargetError>,
    },
}

/// One `--batch` value, before files are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEntry {
    Host(HostTarget),
    File(PathBuf),
    Multi(Vec<BatchEntry>),
}

impl FromStr for BatchEntry {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(',') {
            return parse_commas(s);
        }
        parse_single(s)
    }
}

fn parse_single(s: &str) -> Result<BatchEntry, TargetError> {
    let s = s.trim();
    if let Some(path) = s.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(TargetError::Empty);
        }
        return Ok(BatchEntry::File(PathBuf::from(path.trim())));
    }
    Ok(BatchEntry::Host(s.parse()?))
}

/// Parses a comma-separated list (e.g. "WS-014, WS-015, @more.txt").
fn parse_commas(s: &str) -> Result<BatchEntry, TargetError> {
    let entries = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_single)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BatchEntry::Multi(entries))
}

fn expand(entry: BatchEntry, hosts: &mut Vec<HostTarget>) -> Result<(), TargetError> {
    match entry {
        BatchEntry::Host(host) => hosts.push(host),
        BatchEntry::File(path) => {
            let content = std::fs::read_to_string(&path).map_err(|source| TargetError::ReadFile {
                path: path.clone(),
                source,
            })?;
            hosts.extend(parse_host_file(&path, &content)?);
        }
        BatchEntry::Multi(entries) => {
            for entry in entries {
                expand(entry, hosts)?;
            }
        }
    }
    Ok(())
}

fn parse_host_file(path: &std::path::Path, content: &str) -> Result<Vec<HostTarget>, TargetError> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            line.parse::<HostTarget>().map_err(|source| TargetError::FileEntry {
                path: path.to_path_buf(),
                line: line_no,
                source: Box::new(source),
            })
        })
        .collect()
}

/// Flattens batch values into the host list a run scans, reading any referenced files.
pub fn to_host_list(entries: Vec<BatchEntry>) -> Result<Vec<HostTarget>, TargetError> {
    let mut hosts = Vec::new();
    for entry in entries {
        expand(entry, &mut hosts)?;
    }

    let len = hosts.len();
    let unit = if len == 1 { "host has been" } else { "hosts have been" };
    success!("{len} {unit} parsed successfully");

    Ok(hosts)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
