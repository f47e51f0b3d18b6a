//! PowerShell-backed adapters for the directory and remote registry ports.
//!
//! Both adapters run a fixed script through a local PowerShell executable. Every
//! caller-supplied value (host, filter, key paths, credential) reaches the script
//! through environment variables of the child process, so nothing is ever spliced
//! into script text.

mod directory;
mod process;
mod registry;

pub use directory::PowerShellDirectory;
pub use process::{PowerShell, ScriptOutput};
pub use registry::PowerShellRegistry;
