use anyhow::{Context, bail};
use console::Term;
use invscan_common::inventory::Credential;

/// Asks for a user name and a hidden password on the controlling terminal.
pub fn credential(purpose: &str) -> anyhow::Result<Credential> {
    let term = Term::stderr();
    term.write_line(&format!("Credentials for {purpose}"))
        .context("failed to write credential prompt")?;

    term.write_str("User name: ")?;
    let username = term.read_line().context("failed to read user name")?;
    let username = username.trim();
    if username.is_empty() {
        bail!("a user name is required");
    }

    term.write_str("Password: ")?;
    let password = term.read_secure_line().context("failed to read password")?;

    Ok(Credential::new(username, password))
}
