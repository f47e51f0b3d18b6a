use async_trait::async_trait;
use invscan_common::directory::{DirectoryAuth, DirectoryError, DirectoryQuery, DirectoryService};
use invscan_common::inventory::HostTarget;
use invscan_common::warn;

use super::process::{ENV_AUTH_TYPE, ENV_FILTER, PowerShell};

const QUERY_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
try {
    Import-Module ActiveDirectory
    $params = @{ Filter = $env:INVSCAN_FILTER }
    if ($env:INVSCAN_USER) {
        $secret = ConvertTo-SecureString ([Console]::In.ReadLine()) -AsPlainText -Force
        $params.Credential = [System.Management.Automation.PSCredential]::new($env:INVSCAN_USER, $secret)
        $params.AuthType = $env:INVSCAN_AUTH_TYPE
    }
    $names = @(Get-ADComputer @params | ForEach-Object { [string]$_.Name })
    ConvertTo-Json -InputObject $names -Compress
} catch {
    [Console]::Error.WriteLine($_.Exception.Message)
    exit 1
}
"#;

/// Resolves computers through `Get-ADComputer`.
pub struct PowerShellDirectory {
    shell: PowerShell,
}

impl PowerShellDirectory {
    pub fn new(shell: PowerShell) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl DirectoryService for PowerShellDirectory {
    async fn computers(&self, query: &DirectoryQuery) -> Result<Vec<HostTarget>, DirectoryError> {
        let (auth_type, credential) = match &query.auth {
            DirectoryAuth::Ambient => (None, None),
            DirectoryAuth::Explicit {
                auth_type,
                credential,
            } => (Some(auth_type.as_str()), Some(credential)),
        };

        let mut vars = vec![(ENV_FILTER, query.filter.as_str())];
        if let Some(auth_type) = auth_type {
            vars.push((ENV_AUTH_TYPE, auth_type));
        }

        let output = self
            .shell
            .run(QUERY_SCRIPT, &vars, credential)
            .await
            .map_err(|e| DirectoryError::new(format!("failed to start {}: {e}", self.shell.program())))?;

        if !output.success {
            return Err(DirectoryError::new(output.failure_message()));
        }

        parse_computer_names(&output.stdout)
    }
}

/// Parses the JSON array of names the query script prints.
pub(crate) fn parse_computer_names(stdout: &str) -> Result<Vec<HostTarget>, DirectoryError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(Vec::new());
    }

    let names: Vec<Option<String>> = serde_json::from_str(stdout)
        .map_err(|e| DirectoryError::new(format!("unexpected directory output: {e}")))?;

    let hosts = names
        .into_iter()
        .flatten()
        .filter_map(|name| match name.parse::<HostTarget>() {
            Ok(host) => Some(host),
            Err(e) => {
                warn!("Skipping directory entry: {e}");
                None
            }
        })
        .collect();

    Ok(hosts)
}
