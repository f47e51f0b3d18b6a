//! # invscan core
//!
//! The run phases and the adapters that connect them to the outside world.
//!
//! * [`resolver`]: turns a directory query or a batch into a host list.
//! * [`scanner`]: contacts each host and folds the answers into a report.
//! * [`export`]: writes the report collections as CSV.
//! * [`inventory`]: the service that chains the phases into one run.
//! * [`powershell`]: PowerShell implementations of the directory and registry ports.

pub mod export;
pub mod inventory;
pub mod powershell;
pub mod resolver;
pub mod scanner;
