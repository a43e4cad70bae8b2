//! Shared helpers

pub mod helpers;
pub mod template;
pub mod version;

pub use helpers::{archive_path, default_file_name};
pub use version::{build_number, get_build_version};
