//! Package assembly and archive output

pub mod builder;
pub mod files;
pub mod filter;
#[cfg(feature = "cli")]
pub mod install;
pub mod signing;

pub use builder::{archive_order, write_archive};
pub use files::{Files, ValueTransform};
pub use filter::PathFilter;
pub use signing::sign_files;
