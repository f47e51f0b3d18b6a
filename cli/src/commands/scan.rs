use std::sync::Arc;
use std::time::Duration;

use colored::*;
use invscan_common::config::Config;
use invscan_common::success;
use invscan_core::export::ExportOutcome;
use invscan_core::inventory::{ExportRequest, InventoryService, RunOutcome, RunPlan, RunSummary};
use invscan_core::powershell::{PowerShell, PowerShellDirectory, PowerShellRegistry};
use tracing::{Instrument, info_span};

use crate::commands::ScanArgs;
use crate::mprint;
use crate::terminal::{colors, print, progress, prompt, table};

pub async fn scan(args: ScanArgs, powershell: &str, cfg: &Config) -> anyhow::Result<()> {
    // 1. Credentials are obtained before any host is contacted
    let credential = match args.credential_purpose() {
        Some(purpose) => Some(prompt::credential(purpose)?),
        None => None,
    };

    // 2. Instantiate dependencies
    let settings = args.settings(powershell);
    let shell = PowerShell::new(settings.powershell.clone());
    let service = InventoryService::new(
        Arc::new(PowerShellDirectory::new(shell.clone())),
        Arc::new(PowerShellRegistry::new(shell)),
    );

    let plan = RunPlan {
        source: args.target.host_source(credential.as_ref())?,
        request: settings.request,
        admin_credential: credential.filter(|_| args.use_admin_credentials),
        jobs: settings.jobs,
        export: ExportRequest {
            results: args.export_results,
            failures: args.export_failures,
            paths: args.export_paths(),
        },
    };

    // 3. Execute service
    let span = info_span!("inventory", indicatif.pb_show = true);
    progress::style_scan_span(&span);
    let outcome = service
        .run(
            plan,
            Some(progress::on_resolved(span.clone())),
            Some(progress::on_host_done(span.clone())),
        )
        .instrument(span.clone())
        .await;
    drop(span);

    // 4. Present results
    scan_ends(&outcome?, &args, cfg);
    Ok(())
}

fn scan_ends(outcome: &RunOutcome, args: &ScanArgs, cfg: &Config) {
    if args.show_results && cfg.quiet < 2 {
        mprint!();
        print::header("Inventory Results", cfg.quiet);
        if outcome.report.results.is_empty() {
            print::no_results("matching installations");
        } else {
            table::success_table(&outcome.report.results);
        }
    }

    if args.show_failures && cfg.quiet < 2 {
        mprint!();
        print::header("Inventory Failures", cfg.quiet);
        if outcome.report.failures.is_empty() {
            print::no_results("failures");
        } else {
            table::failure_table(&outcome.report.failures);
        }
    }

    print_exports(outcome, cfg);
    print_summary(&outcome.summary, cfg);
}

fn print_exports(outcome: &RunOutcome, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }
    print::set_key_width(&["Exported"]);
    for export in [&outcome.results_export, &outcome.failures_export] {
        if let ExportOutcome::Written { path, rows } = export {
            print::aligned_line("Exported", format!("{} ({rows} rows)", path.display()));
        }
    }
}

fn print_summary(summary: &RunSummary, cfg: &Config) {
    let scanned: ColoredString = format!("{} hosts scanned", summary.hosts_scanned).bold().green();
    let failed: ColoredString = failures_label(summary.failure_count);
    let elapsed: ColoredString = format_elapsed(summary.elapsed).bold().yellow();
    let output: &ColoredString =
        &format!("Inventory Complete: {scanned}, {failed} in {elapsed}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::set_key_width(&["Elapsed", "Hosts scanned", "Failures"]);
            print::aligned_line("Elapsed", format_elapsed(summary.elapsed));
            print::aligned_line("Hosts scanned", summary.hosts_scanned.to_string());
            print::aligned_line("Failures", summary.failure_count.to_string());
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => success!("{}", output),
    }
}

fn failures_label(count: usize) -> ColoredString {
    let label = format!("{count} failures");
    if count == 0 {
        label.bold().green()
    } else {
        label.bold().red()
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
