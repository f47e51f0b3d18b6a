#![cfg(test)]
use std::fs;
use std::path::Path;
use std::sync::Arc;

use invscan_common::config::ExportPaths;
use invscan_common::directory::{DirectoryAuth, DirectoryQuery};
use invscan_common::inventory::{AuthType, Credential};
use invscan_common::registry::LookupRequest;
use invscan_core::export::ExportOutcome;
use invscan_core::inventory::{ExportRequest, InventoryError, InventoryService, RunOutcome, RunPlan};
use invscan_core::resolver::HostSource;

use crate::fakes::{hosts, FakeDirectory, FakeRegistry};

fn plan(source: HostSource, dir: &Path) -> RunPlan {
    RunPlan {
        source,
        request: LookupRequest::default(),
        admin_credential: None,
        jobs: 1,
        export: ExportRequest {
            results: true,
            failures: true,
            paths: ExportPaths::in_dir(dir),
        },
    }
}

async fn run(
    directory: &Arc<FakeDirectory>,
    registry: &Arc<FakeRegistry>,
    plan: RunPlan,
) -> Result<RunOutcome, InventoryError> {
    let service = InventoryService::new(directory.clone(), registry.clone());
    service.run(plan, None, None).await
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

/// M1 answers with one entry, M2 is unreachable.
#[tokio::test]
async fn batch_with_one_success_and_one_unreachable_host() {
    let dir = tempfile::tempdir().unwrap();
    let directory = Arc::new(FakeDirectory::with_computers(&["NEVER-USED"]));
    let registry = Arc::new(FakeRegistry::default().installed("M1", &["115.3.1"]).unreachable("M2"));

    let outcome = run(&directory, &registry, plan(HostSource::Batch(hosts(&["M1", "M2"])), dir.path()))
        .await
        .unwrap();

    assert_eq!(directory.calls(), 0, "batch mode must not query the directory");
    assert_eq!(outcome.summary.hosts_scanned, 2);
    assert_eq!(outcome.summary.failure_count, 1);

    assert_eq!(outcome.report.results.len(), 1);
    assert_eq!(outcome.report.results[0].computer_name, "M1");
    assert_eq!(outcome.report.results[0].version, "115.3.1");
    assert_eq!(outcome.report.failures.len(), 1);
    assert_eq!(outcome.report.failures[0].computer, "M2");

    let paths = ExportPaths::in_dir(dir.path());
    assert_eq!(line_count(&paths.results), 2);
    assert_eq!(line_count(&paths.failures), 2);
    assert!(fs::read_to_string(&paths.results).unwrap().starts_with("Product,Version,ComputerName"));
    assert!(fs::read_to_string(&paths.failures).unwrap().starts_with("Reason,Computer,Exception"));
}

#[tokio::test]
async fn directory_failure_aborts_before_any_host_is_contacted() {
    let dir = tempfile::tempdir().unwrap();
    let directory = Arc::new(FakeDirectory::failing("The server is not operational."));
    let registry = Arc::new(FakeRegistry::default());

    let err = run(&directory, &registry, plan(HostSource::default(), dir.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Directory(_)));
    assert!(err.to_string().contains("The server is not operational."));
    assert!(registry.contacted().is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0, "no export may be written");
}

#[tokio::test]
async fn every_resolved_host_is_attempted_exactly_once() {
    for names in [vec![], vec!["A"], vec!["A", "B", "C", "D", "E"]] {
        let dir = tempfile::tempdir().unwrap();
        let directory = Arc::new(FakeDirectory::with_computers(&names));
        let registry = Arc::new(FakeRegistry::default().installed("B", &["102.0", "115.0"]));

        let outcome = run(&directory, &registry, plan(HostSource::default(), dir.path()))
            .await
            .unwrap();

        assert_eq!(outcome.summary.hosts_scanned, names.len());
        assert_eq!(registry.contacted().len(), names.len());
    }
}

#[tokio::test]
async fn multiple_entries_on_one_host_count_the_host_once() {
    let dir = tempfile::tempdir().unwrap();
    let directory = Arc::new(FakeDirectory::with_computers(&[]));
    let registry = Arc::new(FakeRegistry::default().installed("M1", &["102.15.0", "115.3.1"]));

    let outcome = run(&directory, &registry, plan(HostSource::Batch(hosts(&["M1"])), dir.path()))
        .await
        .unwrap();

    assert_eq!(outcome.summary.hosts_scanned, 1);
    assert_eq!(outcome.report.results.len(), 2);
    assert_eq!(line_count(&ExportPaths::in_dir(dir.path()).results), 3);
}

#[tokio::test]
async fn empty_collections_are_not_exported() {
    let dir = tempfile::tempdir().unwrap();
    let directory = Arc::new(FakeDirectory::with_computers(&["CLEAN-01"]));
    let registry = Arc::new(FakeRegistry::default());

    let outcome = run(&directory, &registry, plan(HostSource::default(), dir.path()))
        .await
        .unwrap();

    assert_eq!(outcome.summary.hosts_scanned, 1);
    assert_eq!(outcome.results_export, ExportOutcome::Skipped);
    assert_eq!(outcome.failures_export, ExportOutcome::Skipped);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn credentials_reach_the_right_collaborators() {
    let dir = tempfile::tempdir().unwrap();
    let directory = Arc::new(FakeDirectory::with_computers(&["M1"]));
    let registry = Arc::new(FakeRegistry::default().installed("M1", &["115.3.1"]));
    let credential = Credential::new(r"CORP\inventory", "s3cret");

    let query = DirectoryQuery::new("Name -like 'M*'").with_auth(DirectoryAuth::Explicit {
        auth_type: AuthType::Basic,
        credential: credential.clone(),
    });
    let mut plan = plan(HostSource::Directory(query), dir.path());
    plan.admin_credential = Some(credential);

    run(&directory, &registry, plan).await.unwrap();

    assert!(matches!(
        directory.last_auth(),
        Some(DirectoryAuth::Explicit { auth_type: AuthType::Basic, .. })
    ));
    assert_eq!(
        registry.contacted(),
        vec![("M1".to_string(), Some(r"CORP\inventory".to_string()))]
    );
}

#[tokio::test]
async fn concurrent_run_produces_the_same_report() {
    let names = ["M1", "M2", "M3", "M4", "M5", "M6"];
    let registry = Arc::new(
        FakeRegistry::default()
            .installed("M1", &["115.3.1"])
            .unreachable("M2")
            .installed("M4", &["102.15.0", "115.3.1"])
            .unreachable("M6"),
    );
    let directory = Arc::new(FakeDirectory::with_computers(&names));

    let dir = tempfile::tempdir().unwrap();
    let sequential = run(&directory, &registry, plan(HostSource::default(), dir.path()))
        .await
        .unwrap();

    let mut parallel_plan = plan(HostSource::default(), dir.path());
    parallel_plan.jobs = 4;
    let parallel = run(&directory, &registry, parallel_plan).await.unwrap();

    assert_eq!(parallel.report, sequential.report);
    assert_eq!(parallel.summary.failure_count, 2);
}

#[tokio::test]
async fn repeated_export_overwrites_instead_of_appending() {
    let dir = tempfile::tempdir().unwrap();
    let directory = Arc::new(FakeDirectory::with_computers(&["M1", "M2"]));
    let registry = Arc::new(FakeRegistry::default().installed("M1", &["115.3.1"]).unreachable("M2"));
    let paths = ExportPaths::in_dir(dir.path());

    run(&directory, &registry, plan(HostSource::default(), dir.path())).await.unwrap();
    let first = (fs::read(&paths.results).unwrap(), fs::read(&paths.failures).unwrap());

    run(&directory, &registry, plan(HostSource::default(), dir.path())).await.unwrap();
    let second = (fs::read(&paths.results).unwrap(), fs::read(&paths.failures).unwrap());

    assert_eq!(first, second);
    assert_eq!(line_count(&paths.results), 2);
}

#[tokio::test]
async fn results_export_failure_is_fatal_and_skips_failures_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, "not a directory").unwrap();

    let directory = Arc::new(FakeDirectory::with_computers(&["M1", "M2"]));
    let registry = Arc::new(FakeRegistry::default().installed("M1", &["115.3.1"]).unreachable("M2"));

    let mut plan = plan(HostSource::default(), dir.path());
    plan.export.paths.results = blocker.join("versions.csv");
    let failures_path = plan.export.paths.failures.clone();

    let err = run(&directory, &registry, plan).await.unwrap_err();

    assert!(matches!(err, InventoryError::Export { .. }));
    assert!(!failures_path.exists());
}

#[tokio::test]
async fn repeated_batch_hosts_are_attempted_once_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let directory = Arc::new(FakeDirectory::with_computers(&[]));
    let registry = Arc::new(FakeRegistry::default().installed("M1", &["115.3.1"]));

    let outcome = run(&directory, &registry, plan(HostSource::Batch(hosts(&["M1", "m1", "M1"])), dir.path()))
        .await
        .unwrap();

    assert_eq!(outcome.summary.hosts_scanned, 3);
    let contacted: Vec<String> = registry.contacted().into_iter().map(|(name, _)| name).collect();
    assert_eq!(contacted, ["M1", "m1", "M1"]);
    assert_eq!(outcome.report.results.len(), 2, "only the exact-case spelling has an answer");
}
