use serde::Serialize;

use crate::registry::LookupError;

/// One uninstall entry as the remote transport reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledProduct {
    pub display_name: String,
    pub display_version: String,
    pub computer_name: String,
}

impl InstalledProduct {
    pub fn new(
        display_name: impl Into<String>,
        display_version: impl Into<String>,
        computer_name: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            display_version: display_version.into(),
            computer_name: computer_name.into(),
        }
    }
}

/// A product found on a host. Field names double as CSV headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SuccessRecord {
    pub product: String,
    pub version: String,
    pub computer_name: String,
}

impl SuccessRecord {
    pub const HEADERS: [&'static str; 3] = ["Product", "Version", "ComputerName"];

    pub fn cells(&self) -> [&str; 3] {
        [&self.product, &self.version, &self.computer_name]
    }
}

impl From<InstalledProduct> for SuccessRecord {
    fn from(entry: InstalledProduct) -> Self {
        Self {
            product: entry.display_name,
            version: entry.display_version,
            computer_name: entry.computer_name,
        }
    }
}

/// A host whose lookup reported an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FailureRecord {
    /// Qualified error identifier, e.g. `CannotConnect,PSSessionStateBroken`.
    pub reason: String,
    /// The object the error was raised against, usually the host name.
    pub computer: String,
    pub exception: String,
}

impl FailureRecord {
    pub const HEADERS: [&'static str; 3] = ["Reason", "Computer", "Exception"];

    pub fn cells(&self) -> [&str; 3] {
        [&self.reason, &self.computer, &self.exception]
    }
}

impl From<LookupError> for FailureRecord {
    fn from(err: LookupError) -> Self {
        Self {
            reason: err.reason,
            computer: err.target,
            exception: err.message,
        }
    }
}
