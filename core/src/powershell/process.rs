use std::process::Stdio;

use invscan_common::inventory::Credential;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

pub(crate) const ENV_HOST: &str = "INVSCAN_HOST";
pub(crate) const ENV_KEYS: &str = "INVSCAN_KEYS";
pub(crate) const ENV_FILTER: &str = "INVSCAN_FILTER";
pub(crate) const ENV_AUTH_TYPE: &str = "INVSCAN_AUTH_TYPE";
pub(crate) const ENV_USER: &str = "INVSCAN_USER";

const SCRIPT_VARS: [&str; 5] = [ENV_HOST, ENV_KEYS, ENV_FILTER, ENV_AUTH_TYPE, ENV_USER];

/// What a finished script left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    /// A one-line description of why the script failed.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.lines().map(str::trim).collect::<Vec<_>>().join(" ");
        }
        match self.code {
            Some(code) => format!("PowerShell exited with status {code}"),
            None => "PowerShell was terminated by a signal".to_string(),
        }
    }
}

/// A local PowerShell executable.
#[derive(Debug, Clone)]
pub struct PowerShell {
    program: String,
}

impl PowerShell {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs `script` with `vars` in its environment.
    ///
    /// With a credential, the user name is passed as `INVSCAN_USER` and the password
    /// is written as one line to standard input, so it never appears in the child's
    /// environment. Script variables inherited from our own environment are cleared
    /// first, so a stale `INVSCAN_USER` can never leak into an ambient call.
    pub async fn run(
        &self,
        script: &str,
        vars: &[(&str, &str)],
        credential: Option<&Credential>,
    ) -> std::io::Result<ScriptOutput> {
        let mut command = self.command(script, vars, credential);

        trace!(program = %self.program, "starting PowerShell");
        let mut child = command.spawn()?;

        if let (Some(credential), Some(mut stdin)) = (credential, child.stdin.take()) {
            let line = format!("{}\n", credential.password());
            // A script that exits early closes its end; its output says why.
            if let Err(e) = stdin.write_all(line.as_bytes()).await {
                debug!(program = %self.program, "could not pass secret: {e}");
            }
        }

        let output = child.wait_with_output().await?;

        Ok(ScriptOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn command(&self, script: &str, vars: &[(&str, &str)], credential: Option<&Credential>) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["-NoLogo", "-NoProfile", "-NonInteractive", "-Command", script])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for var in SCRIPT_VARS {
            command.env_remove(var);
        }
        for (key, value) in vars {
            command.env(key, value);
        }
        match credential {
            Some(credential) => {
                command.env(ENV_USER, credential.username()).stdin(Stdio::piped());
            }
            None => {
                command.stdin(Stdio::null());
            }
        }
        command
    }
}
