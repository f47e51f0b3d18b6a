//! Shared building blocks for `invscan`.
//!
//! * [`inventory`]: the domain models (targets, records, credentials).
//! * [`directory`] and [`registry`]: the ports the core talks through.
//! * [`config`]: settings assembled by the CLI.
//! * [`log`]: status macros layered on top of `tracing`.

pub mod config;
pub mod directory;
pub mod inventory;
pub mod log;
pub mod registry;
