//! # Inventory Domain Model
//!
//! The values a run passes around: which hosts to contact ([`target`]), what came
//! back ([`record`]), and who to contact them as ([`credential`]).

pub mod credential;
pub mod record;
pub mod target;

pub use credential::{AuthType, Credential};
pub use record::{FailureRecord, InstalledProduct, SuccessRecord};
pub use target::HostTarget;
