use async_trait::async_trait;
use invscan_common::inventory::{Credential, HostTarget, InstalledProduct};
use invscan_common::registry::{LookupError, LookupFailure, LookupRequest, LookupResult, RemoteRegistry};
use serde::Deserialize;
use tracing::debug;

use super::process::{ENV_HOST, ENV_KEYS, PowerShell};

pub const TRANSPORT_FAILURE: &str = "TransportFailure";
pub const INVALID_OUTPUT: &str = "InvalidTransportOutput";

/// Errors raised by `Invoke-Command` land in `lookupErr` instead of stopping the
/// script, and come back alongside whatever entries were read.
const LOOKUP_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
$lookupErr = @()
$entries = @()
try {
    $params = @{
        ComputerName  = $env:INVSCAN_HOST
        ScriptBlock   = {
            param([string[]] $Patterns)
            Get-ItemProperty -Path $Patterns -ErrorAction SilentlyContinue |
                Select-Object DisplayName, DisplayVersion
        }
        ArgumentList  = @(, [string[]]($env:INVSCAN_KEYS -split "`n"))
        ErrorAction   = 'SilentlyContinue'
        ErrorVariable = 'lookupErr'
    }
    if ($env:INVSCAN_USER) {
        $secret = ConvertTo-SecureString ([Console]::In.ReadLine()) -AsPlainText -Force
        $params.Credential = [System.Management.Automation.PSCredential]::new($env:INVSCAN_USER, $secret)
    }
    $entries = @(Invoke-Command @params)
} catch {
    $lookupErr = @($_)
}
[ordered]@{
    entries = @($entries | ForEach-Object {
        [ordered]@{
            displayName    = [string]$_.DisplayName
            displayVersion = [string]$_.DisplayVersion
            computerName   = [string]$_.PSComputerName
        }
    })
    errors = @($lookupErr | ForEach-Object {
        [ordered]@{
            reason  = [string]$_.FullyQualifiedErrorId
            target  = [string]$_.TargetObject
            message = [string]$_.Exception.Message
        }
    })
} | ConvertTo-Json -Depth 4 -Compress
"#;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupReply {
    #[serde(default)]
    entries: Vec<ReplyEntry>,
    #[serde(default)]
    errors: Vec<ReplyError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyEntry {
    display_name: Option<String>,
    display_version: Option<String>,
    computer_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyError {
    reason: Option<String>,
    target: Option<String>,
    message: Option<String>,
}

/// Reads uninstall entries through `Invoke-Command` (WinRM remoting).
pub struct PowerShellRegistry {
    shell: PowerShell,
}

impl PowerShellRegistry {
    pub fn new(shell: PowerShell) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl RemoteRegistry for PowerShellRegistry {
    async fn lookup(
        &self,
        host: &HostTarget,
        request: &LookupRequest,
        credential: Option<&Credential>,
    ) -> LookupResult {
        let keys = request.key_patterns().join("\n");
        let vars = [(ENV_HOST, host.as_str()), (ENV_KEYS, keys.as_str())];

        let output = match self.shell.run(LOOKUP_SCRIPT, &vars, credential).await {
            Ok(output) => output,
            Err(e) => {
                let message = format!("failed to start {}: {e}", self.shell.program());
                return Err(LookupError::new(TRANSPORT_FAILURE, host.as_str(), message).into());
            }
        };

        if !output.success {
            return Err(LookupError::new(TRANSPORT_FAILURE, host.as_str(), output.failure_message()).into());
        }

        interpret_reply(host, &output.stdout)
    }
}

/// Turns the script's JSON into the per-host result.
///
/// Only the first reported error becomes the failure; the rest are logged.
pub(crate) fn interpret_reply(host: &HostTarget, stdout: &str) -> LookupResult {
    let reply: LookupReply = serde_json::from_str(stdout.trim()).map_err(|e| {
        LookupFailure::from(LookupError::new(INVALID_OUTPUT, host.as_str(), e.to_string()))
    })?;

    let entries: Vec<InstalledProduct> = reply
        .entries
        .into_iter()
        .map(|entry| {
            let computer_name = entry
                .computer_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| host.to_string());
            InstalledProduct::new(
                entry.display_name.unwrap_or_default(),
                entry.display_version.unwrap_or_default(),
                computer_name,
            )
        })
        .collect();

    let mut errors = reply.errors.into_iter();
    let Some(first) = errors.next() else {
        return Ok(entries);
    };
    for extra in errors {
        debug!(host = %host, reason = ?extra.reason, "additional lookup error dropped");
    }

    let target = first
        .target
        .filter(|target| !target.is_empty())
        .unwrap_or_else(|| host.to_string());
    let error = LookupError::new(
        first.reason.unwrap_or_default(),
        target,
        first.message.unwrap_or_default(),
    );

    Err(LookupFailure {
        error,
        partial: entries,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
