pub mod resolve;
pub mod scan;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use invscan_common::config::{DEFAULT_POWERSHELL, ExportPaths, ScanSettings};
use invscan_common::directory::{DirectoryAuth, DirectoryQuery, MATCH_ALL_FILTER};
use invscan_common::inventory::target::{self, BatchEntry};
use invscan_common::inventory::{AuthType, Credential};
use invscan_common::registry::{DEFAULT_PRODUCT_PREFIX, DEFAULT_UNINSTALL_ROOT, LookupRequest};
use invscan_common::warn;
use invscan_core::resolver::HostSource;

#[derive(Parser)]
#[command(name = "invscan", version)]
#[command(about = "Find out which version of a product is installed across Windows hosts.")]
pub struct CommandLine {
    /// Less output: once hides headers, twice also hides tables
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// PowerShell executable used for directory queries and remote calls
    #[arg(long, env = "INVSCAN_POWERSHELL", default_value = DEFAULT_POWERSHELL, global = true)]
    pub powershell: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up the installed version on every resolved host
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// List the hosts a scan would contact, without contacting them
    #[command(alias = "r")]
    Resolve(TargetArgs),
}

/// How the host list is obtained.
#[derive(Args, Clone)]
pub struct TargetArgs {
    /// Directory filter selecting computer objects
    #[arg(long, default_value = MATCH_ALL_FILTER)]
    pub filter: String,

    /// Prompt for a credential and use it for the directory query
    #[arg(long)]
    pub use_directory_credentials: bool,

    /// Authentication type for the directory query (negotiate, basic)
    #[arg(long, default_value_t = AuthType::Negotiate)]
    pub auth_type: AuthType,

    /// Hosts to scan instead of querying the directory (comma list or @file, repeatable)
    #[arg(long, value_name = "HOSTS")]
    pub batch: Vec<BatchEntry>,
}

#[derive(Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Prompt for a credential and use it for every remote call
    #[arg(long)]
    pub use_admin_credentials: bool,

    /// Write the results to a CSV file
    #[arg(long)]
    pub export_results: bool,

    /// Write the failures to a CSV file
    #[arg(long)]
    pub export_failures: bool,

    /// Print every result as a table
    #[arg(long)]
    pub show_results: bool,

    /// Print every failure as a table
    #[arg(long)]
    pub show_failures: bool,

    /// Directory for both export files [default: desktop]
    #[arg(long, env = "INVSCAN_EXPORT_PATH", value_name = "DIR")]
    pub export_path: Option<PathBuf>,

    /// Results file [default: <export-path>/MailClientVersions.csv]
    #[arg(long, value_name = "FILE")]
    pub export_results_path: Option<PathBuf>,

    /// Failures file [default: <export-path>/MailClientFailures.csv]
    #[arg(long, value_name = "FILE")]
    pub export_failures_path: Option<PathBuf>,

    /// Product name prefix to look for
    #[arg(long, env = "INVSCAN_PRODUCT", default_value = DEFAULT_PRODUCT_PREFIX)]
    pub product: String,

    /// Uninstall registry roots to search (repeatable)
    #[arg(long = "registry-root", value_name = "PATH", default_value = DEFAULT_UNINSTALL_ROOT)]
    pub registry_roots: Vec<String>,

    /// Hosts looked up concurrently
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl TargetArgs {
    pub fn is_batch(&self) -> bool {
        !self.batch.is_empty()
    }

    /// The directory query runs as a prompted credential only outside batch mode.
    pub fn needs_directory_credential(&self) -> bool {
        self.use_directory_credentials && !self.is_batch()
    }

    pub fn host_source(&self, credential: Option<&Credential>) -> anyhow::Result<HostSource> {
        if self.is_batch() {
            if self.use_directory_credentials || self.filter != MATCH_ALL_FILTER {
                warn!("--batch given: directory filter and credentials are ignored");
            }
            let hosts = target::to_host_list(self.batch.clone()).context("failed to read batch hosts")?;
            return Ok(HostSource::Batch(hosts));
        }

        let auth = match credential {
            Some(credential) if self.use_directory_credentials => DirectoryAuth::Explicit {
                auth_type: self.auth_type,
                credential: credential.clone(),
            },
            _ => DirectoryAuth::Ambient,
        };
        Ok(HostSource::Directory(DirectoryQuery::new(&self.filter).with_auth(auth)))
    }
}

impl ScanArgs {
    pub fn needs_credential(&self) -> bool {
        self.credential_purpose().is_some()
    }

    /// What a prompted credential will be used for, if one is needed at all.
    pub fn credential_purpose(&self) -> Option<&'static str> {
        match (self.use_admin_credentials, self.target.needs_directory_credential()) {
            (true, true) => Some("the directory query and remote calls"),
            (true, false) => Some("remote calls"),
            (false, true) => Some("the directory query"),
            (false, false) => None,
        }
    }

    pub fn settings(&self, powershell: &str) -> ScanSettings {
        ScanSettings {
            request: LookupRequest::new(self.registry_roots.clone(), self.product.clone()),
            jobs: usize::from(self.jobs),
            powershell: powershell.to_string(),
        }
    }

    pub fn export_paths(&self) -> ExportPaths {
        ExportPaths::resolve(
            self.export_path.clone(),
            self.export_results_path.clone(),
            self.export_failures_path.clone(),
        )
    }
}
