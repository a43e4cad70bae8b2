//! Validation module

pub mod structure;

use crate::packager::Files;
use anyhow::Result;

pub fn validate_package(files: &Files) -> Result<()> {
    structure::validate_structure(files)
}
