use std::sync::Arc;
use std::time::Instant;

use colored::*;
use invscan_common::config::Config;
use invscan_common::inventory::HostTarget;
use invscan_core::inventory::InventoryService;
use invscan_core::powershell::{PowerShell, PowerShellDirectory, PowerShellRegistry};

use crate::commands::TargetArgs;
use crate::mprint;
use crate::terminal::{colors, print, prompt};

pub async fn resolve(args: TargetArgs, powershell: &str, cfg: &Config) -> anyhow::Result<()> {
    let credential = if args.needs_directory_credential() {
        Some(prompt::credential("the directory query")?)
    } else {
        None
    };

    let shell = PowerShell::new(powershell);
    let service = InventoryService::new(
        Arc::new(PowerShellDirectory::new(shell.clone())),
        Arc::new(PowerShellRegistry::new(shell)),
    );

    let start_time = Instant::now();
    let source = args.host_source(credential.as_ref())?;
    let hosts = service.resolve_hosts(&source).await?;

    resolve_ends(&hosts, start_time.elapsed().as_secs_f64(), cfg);
    Ok(())
}

fn resolve_ends(hosts: &[HostTarget], secs: f64, cfg: &Config) {
    if hosts.is_empty() {
        print::header("zero hosts resolved", cfg.quiet);
        print::no_results("hosts");
        return;
    }

    print::header("Resolved Hosts", cfg.quiet);
    if cfg.quiet < 2 {
        let width = hosts.len().to_string().len();
        for (idx, host) in hosts.iter().enumerate() {
            print::host_line(idx, width, host.as_str());
        }
        mprint!();
    }

    let count: ColoredString = format!("{} hosts", hosts.len()).bold().green();
    let secs: ColoredString = format!("{secs:.2}s").bold().yellow();
    print::centerln(&format!("Resolution Complete: {count} in {secs}").color(colors::TEXT_DEFAULT).to_string());
}
