//! Status macros.
//!
//! Every message goes through `tracing` so the CLI formatter decides how it looks.
//! `success!` uses its own target to get a distinct glyph.

pub const SUCCESS_TARGET: &str = "invscan::success";
pub const PRINT_TARGET: &str = "invscan::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "invscan::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}
