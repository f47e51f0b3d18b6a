//! # Inventory Service
//!
//! Implements the one use case the tool has: find out which version of a product
//! is installed across a set of hosts.
//!
//! [`InventoryService::run`] drives the phases in order:
//! 1. **Resolve** the host list (directory query or batch).
//! 2. **Scan** every host through the [`RemoteRegistry`] port.
//! 3. **Export** the requested collections as CSV.
//!
//! Reporting is left to the caller, which receives a [`RunOutcome`]. Directory and
//! export failures abort the run with an [`InventoryError`]; per-host failures
//! never do.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use invscan_common::config::ExportPaths;
use invscan_common::directory::{DirectoryError, DirectoryService};
use invscan_common::inventory::{Credential, HostTarget};
use invscan_common::registry::{LookupRequest, RemoteRegistry};
use invscan_common::{info, success};
use thiserror::Error;

use crate::export::{self, ExportError, ExportOutcome};
use crate::resolver::{self, HostSource};
use crate::scanner::{InventoryScanner, ProgressFn, ScanReport};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("failed to export {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: ExportError,
    },
}

/// Which collections to write, and where.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub results: bool,
    pub failures: bool,
    pub paths: ExportPaths,
}

/// Everything one run needs. Credentials arrive here already obtained.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub source: HostSource,
    pub request: LookupRequest,
    /// Used for every remote call when present.
    pub admin_credential: Option<Credential>,
    pub jobs: usize,
    pub export: ExportRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub hosts_scanned: usize,
    pub failure_count: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: ScanReport,
    pub summary: RunSummary,
    pub results_export: ExportOutcome,
    pub failures_export: ExportOutcome,
}

pub struct InventoryService {
    directory: Arc<dyn DirectoryService>,
    registry: Arc<dyn RemoteRegistry>,
}

impl InventoryService {
    pub fn new(directory: Arc<dyn DirectoryService>, registry: Arc<dyn RemoteRegistry>) -> Self {
        Self {
            directory,
            registry,
        }
    }

    /// Runs only the resolution phase.
    pub async fn resolve_hosts(&self, source: &HostSource) -> Result<Vec<HostTarget>, InventoryError> {
        Ok(resolver::resolve_hosts(source, self.directory.as_ref()).await?)
    }

    /// Executes a full run: resolve, scan, export.
    ///
    /// `on_resolved` receives the host count before the first host is contacted;
    /// `on_progress` is forwarded to the scanner.
    pub async fn run(
        &self,
        plan: RunPlan,
        on_resolved: Option<Box<dyn FnOnce(usize) + Send>>,
        on_progress: Option<ProgressFn>,
    ) -> Result<RunOutcome, InventoryError> {
        let start_time = Instant::now();

        let hosts = self.resolve_hosts(&plan.source).await?;
        if let Some(on_resolved) = on_resolved {
            on_resolved(hosts.len());
        }

        info!(
            "Looking up '{}' on {} hosts",
            plan.request.product_prefix,
            hosts.len()
        );
        let report = InventoryScanner::new(Arc::clone(&self.registry), plan.request)
            .with_credential(plan.admin_credential)
            .with_jobs(plan.jobs)
            .with_progress(on_progress)
            .scan(hosts)
            .await;

        let (results_export, failures_export) = export_report(&report, &plan.export)?;

        let summary = RunSummary {
            hosts_scanned: report.hosts_scanned,
            failure_count: report.failure_count,
            elapsed: start_time.elapsed(),
        };

        Ok(RunOutcome {
            report,
            summary,
            results_export,
            failures_export,
        })
    }
}

/// Writes the results first; if that fails the failures file is not attempted.
pub fn export_report(
    report: &ScanReport,
    request: &ExportRequest,
) -> Result<(ExportOutcome, ExportOutcome), InventoryError> {
    let results_path = &request.paths.results;
    let results_export = export::export_records(
        request.results && report.hosts_scanned > 0,
        results_path,
        &report.results,
    )
    .map_err(|source| InventoryError::Export {
        path: results_path.clone(),
        source,
    })?;
    log_export(&results_export);

    let failures_path = &request.paths.failures;
    let failures_export = export::export_records(
        request.failures && report.failure_count > 0,
        failures_path,
        &report.failures,
    )
    .map_err(|source| InventoryError::Export {
        path: failures_path.clone(),
        source,
    })?;
    log_export(&failures_export);

    Ok((results_export, failures_export))
}

fn log_export(outcome: &ExportOutcome) {
    if let ExportOutcome::Written { path, rows } = outcome {
        success!("Exported {rows} rows to {}", path.display());
    }
}
