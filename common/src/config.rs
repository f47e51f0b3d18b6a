use std::path::{Path, PathBuf};

use crate::registry::LookupRequest;

pub const DEFAULT_RESULTS_FILE: &str = "MailClientVersions.csv";
pub const DEFAULT_FAILURES_FILE: &str = "MailClientFailures.csv";
pub const DEFAULT_POWERSHELL: &str = "pwsh";

pub struct Config {
    /// 0 prints everything, 1 drops headers, 2 also drops tables.
    pub quiet: u8,
}

/// Everything the scan phase needs besides the host list.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub request: LookupRequest,
    /// Concurrent lookups. 1 scans strictly one host after another.
    pub jobs: usize,
    /// PowerShell executable driving the remote calls.
    pub powershell: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            request: LookupRequest::default(),
            jobs: 1,
            powershell: DEFAULT_POWERSHELL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub results: PathBuf,
    pub failures: PathBuf,
}

impl ExportPaths {
    /// Explicit file paths win; otherwise the default file names land in
    /// `export_dir`, which itself falls back to [`default_export_dir`].
    pub fn resolve(
        export_dir: Option<PathBuf>,
        results: Option<PathBuf>,
        failures: Option<PathBuf>,
    ) -> Self {
        let dir = export_dir.unwrap_or_else(default_export_dir);
        Self {
            results: results.unwrap_or_else(|| dir.join(DEFAULT_RESULTS_FILE)),
            failures: failures.unwrap_or_else(|| dir.join(DEFAULT_FAILURES_FILE)),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::resolve(Some(dir.to_path_buf()), None, None)
    }
}

/// The user's desktop, else their home directory, else the working directory.
pub fn default_export_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
