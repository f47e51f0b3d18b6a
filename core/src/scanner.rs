//! The per-host lookup phase.
//!
//! [`InventoryScanner`] contacts every host through the [`RemoteRegistry`] port and
//! folds each answer into a [`ScanReport`]. A failing host only ever produces a
//! failure record; it never stops the batch.
//!
//! With `jobs == 1` hosts are contacted strictly one after another. Larger values
//! keep up to `jobs` lookups in flight on the tokio runtime. Either way the report
//! lists records in host input order.

use std::collections::HashMap;
use std::sync::Arc;

use invscan_common::inventory::{Credential, FailureRecord, HostTarget, SuccessRecord};
use invscan_common::registry::{LookupError, LookupRequest, LookupResult, RemoteRegistry};
use tokio::task::{Id, JoinSet};
use tracing::debug;

use invscan_common::warn;

/// Reason recorded when a lookup task dies instead of answering.
pub const TASK_PANICKED: &str = "LookupTaskPanicked";

/// Reported to the progress callback once per finished host.
pub struct HostProgress<'a> {
    pub done: usize,
    pub total: usize,
    pub host: &'a HostTarget,
    pub failed: bool,
}

pub type ProgressFn = Box<dyn Fn(HostProgress<'_>) + Send + Sync>;

/// The two collections and two counters a scan accumulates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub results: Vec<SuccessRecord>,
    pub failures: Vec<FailureRecord>,
    pub hosts_scanned: usize,
    pub failure_count: usize,
}

impl ScanReport {
    /// Folds one host's answer in. Returns whether the host failed.
    pub fn absorb(&mut self, host: &HostTarget, result: LookupResult) -> bool {
        self.hosts_scanned += 1;
        match result {
            Ok(entries) => {
                debug!(host = %host, entries = entries.len(), "lookup finished");
                self.results.extend(entries.into_iter().map(SuccessRecord::from));
                false
            }
            Err(failure) => {
                debug!(host = %host, reason = %failure.error.reason, "lookup failed");
                self.failure_count += 1;
                self.results.extend(failure.partial.into_iter().map(SuccessRecord::from));
                self.failures.push(FailureRecord::from(failure.error));
                true
            }
        }
    }
}

pub struct InventoryScanner {
    registry: Arc<dyn RemoteRegistry>,
    request: Arc<LookupRequest>,
    credential: Option<Arc<Credential>>,
    jobs: usize,
    on_progress: Option<ProgressFn>,
}

impl InventoryScanner {
    pub fn new(registry: Arc<dyn RemoteRegistry>, request: LookupRequest) -> Self {
        Self {
            registry,
            request: Arc::new(request),
            credential: None,
            jobs: 1,
            on_progress: None,
        }
    }

    /// Every remote call runs as `credential` instead of the current identity.
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential.map(Arc::new);
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_progress(mut self, on_progress: Option<ProgressFn>) -> Self {
        self.on_progress = on_progress;
        self
    }

    pub async fn scan(&self, hosts: Vec<HostTarget>) -> ScanReport {
        if self.jobs <= 1 || hosts.len() <= 1 {
            self.scan_sequential(hosts).await
        } else {
            self.scan_concurrent(hosts).await
        }
    }

    async fn scan_sequential(&self, hosts: Vec<HostTarget>) -> ScanReport {
        let total = hosts.len();
        let mut report = ScanReport::default();

        for (idx, host) in hosts.iter().enumerate() {
            let result = self
                .registry
                .lookup(host, &self.request, self.credential.as_deref())
                .await;
            let failed = report.absorb(host, result);
            self.notify(idx + 1, total, host, failed);
        }

        report
    }

    async fn scan_concurrent(&self, hosts: Vec<HostTarget>) -> ScanReport {
        let total = hosts.len();
        let mut pending = hosts.into_iter().enumerate();
        let mut in_flight: JoinSet<LookupResult> = JoinSet::new();
        let mut owners: HashMap<Id, (usize, HostTarget)> = HashMap::new();
        let mut answers: Vec<Option<(HostTarget, LookupResult)>> = (0..total).map(|_| None).collect();
        let mut done = 0;

        loop {
            while in_flight.len() < self.jobs {
                let Some((idx, host)) = pending.next() else {
                    break;
                };
                let registry = Arc::clone(&self.registry);
                let request = Arc::clone(&self.request);
                let credential = self.credential.clone();
                let task_host = host.clone();

                let handle = in_flight.spawn(async move {
                    registry
                        .lookup(&task_host, &request, credential.as_deref())
                        .await
                });
                owners.insert(handle.id(), (idx, host));
            }

            let Some(joined) = in_flight.join_next_with_id().await else {
                break;
            };

            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(join_err) => {
                    let id = join_err.id();
                    let target = owners.get(&id).map(|(_, h)| h.to_string()).unwrap_or_default();
                    warn!("Lookup task for {target} did not finish: {join_err}");
                    let error = LookupError::new(TASK_PANICKED, target, join_err.to_string());
                    (id, Err(error.into()))
                }
            };

            if let Some((idx, host)) = owners.remove(&id) {
                done += 1;
                self.notify(done, total, &host, result.is_err());
                answers[idx] = Some((host, result));
            }
        }

        let mut report = ScanReport::default();
        for (host, result) in answers.into_iter().flatten() {
            report.absorb(&host, result);
        }
        report
    }

    fn notify(&self, done: usize, total: usize, host: &HostTarget, failed: bool) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(HostProgress {
                done,
                total,
                host,
                failed,
            });
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use invscan_common::inventory::InstalledProduct;
    use invscan_common::registry::LookupFailure;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers by host name: `OK-<n>` returns n entries, `DOWN-*` fails,
    /// `PARTIAL-*` returns one entry plus an error, `BOOM` panics.
    struct ScriptedRegistry {
        seen_credentials: Mutex<Vec<Option<String>>>,
        concurrent: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedRegistry {
        fn new() -> Self {
            Self {
                seen_credentials: Mutex::new(Vec::new()),
                concurrent: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteRegistry for ScriptedRegistry {
        async fn lookup(
            &self,
            host: &HostTarget,
            _request: &LookupRequest,
            credential: Option<&Credential>,
        ) -> LookupResult {
            self.seen_credentials
                .lock()
                .unwrap()
                .push(credential.map(|c| c.username().to_string()));

            let now = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.concurrent.fetch_sub(1, Ordering::SeqCst);

            let name = host.as_str();
            if let Some(n) = name.strip_prefix("OK-") {
                let n: usize = n.parse().unwrap();
                return Ok((0..n)
                    .map(|i| InstalledProduct::new(format!("Mozilla Thunderbird {i}"), "115.0", name))
                    .collect());
            }
            if name.starts_with("PARTIAL-") {
                return Err(LookupFailure {
                    error: LookupError::new("PermissionDenied", name, "Access is denied"),
                    partial: vec![InstalledProduct::new("Mozilla Thunderbird", "102.1", name)],
                });
            }
            if name == "BOOM" {
                panic!("transport blew up");
            }
            Err(LookupError::new("CannotConnect,PSSessionStateBroken", name, "host unreachable").into())
        }
    }

    fn hosts(names: &[&str]) -> Vec<HostTarget> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn empty_host_list_scans_nothing() {
        let scanner = InventoryScanner::new(Arc::new(ScriptedRegistry::new()), LookupRequest::default());
        let report = scanner.scan(Vec::new()).await;

        assert_eq!(report, ScanReport::default());
    }

    #[tokio::test]
    async fn every_entry_becomes_one_record_and_hosts_count_once() {
        let scanner = InventoryScanner::new(Arc::new(ScriptedRegistry::new()), LookupRequest::default());
        let report = scanner.scan(hosts(&["OK-2", "OK-0", "DOWN-1"])).await;

        assert_eq!(report.hosts_scanned, 3);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.results.len(), 2);
        assert!(report.results.iter().all(|r| r.computer_name == "OK-2"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].computer, "DOWN-1");
        assert_eq!(report.failures[0].reason, "CannotConnect,PSSessionStateBroken");
    }

    #[tokio::test]
    async fn partial_answer_yields_both_kinds_of_record() {
        let scanner = InventoryScanner::new(Arc::new(ScriptedRegistry::new()), LookupRequest::default());
        let report = scanner.scan(hosts(&["PARTIAL-1"])).await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.hosts_scanned, 1);
    }

    #[tokio::test]
    async fn credential_is_passed_to_every_call() {
        let registry = Arc::new(ScriptedRegistry::new());
        let scanner = InventoryScanner::new(registry.clone(), LookupRequest::default())
            .with_credential(Some(Credential::new(r"CORP\admin", "pw")));

        scanner.scan(hosts(&["OK-1", "DOWN-2"])).await;

        let seen = registry.seen_credentials.lock().unwrap().clone();
        assert_eq!(seen, vec![Some(r"CORP\admin".to_string()); 2]);
    }

    #[tokio::test]
    async fn sequential_scan_never_overlaps() {
        let registry = Arc::new(ScriptedRegistry::new());
        let scanner = InventoryScanner::new(registry.clone(), LookupRequest::default());

        scanner.scan(hosts(&["OK-1", "DOWN-3", "OK-2"])).await;

        assert_eq!(registry.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_scan_matches_sequential_report() {
        let names = ["OK-1", "DOWN-1", "OK-3", "PARTIAL-1", "OK-0", "DOWN-2", "OK-2"];

        let sequential = InventoryScanner::new(Arc::new(ScriptedRegistry::new()), LookupRequest::default())
            .scan(hosts(&names))
            .await;

        let registry = Arc::new(ScriptedRegistry::new());
        let concurrent = InventoryScanner::new(registry.clone(), LookupRequest::default())
            .with_jobs(3)
            .scan(hosts(&names))
            .await;

        assert_eq!(concurrent, sequential);
        assert!(registry.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn panicking_lookup_becomes_failure_record() {
        let scanner = InventoryScanner::new(Arc::new(ScriptedRegistry::new()), LookupRequest::default())
            .with_jobs(2);
        let report = scanner.scan(hosts(&["OK-1", "BOOM", "DOWN-9"])).await;

        assert_eq!(report.hosts_scanned, 3);
        assert_eq!(report.failure_count, 2);
        let boom = report.failures.iter().find(|f| f.computer == "BOOM").unwrap();
        assert_eq!(boom.reason, TASK_PANICKED);
    }

    #[tokio::test]
    async fn progress_reports_each_host_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let on_progress: ProgressFn = Box::new(move |p: HostProgress<'_>| {
            sink.lock().unwrap().push((p.done, p.total, p.host.to_string(), p.failed));
        });

        let scanner = InventoryScanner::new(Arc::new(ScriptedRegistry::new()), LookupRequest::default())
            .with_progress(Some(on_progress));
        scanner.scan(hosts(&["OK-1", "DOWN-1"])).await;

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (1, 2, "OK-1".to_string(), false),
                (2, 2, "DOWN-1".to_string(), true),
            ]
        );
    }
}
