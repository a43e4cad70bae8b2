//! Structural validation
//!
//! Only checks that the files the runtime loads first are present; what is
//! inside them is not validated.

use crate::assembler::install_manifest::INSTALL_MANIFEST_PATH;
use crate::assembler::BOOTSTRAP_PATH;
use crate::packager::Files;
use anyhow::Result;

pub fn validate_structure(files: &Files) -> Result<()> {
    for required in [INSTALL_MANIFEST_PATH, BOOTSTRAP_PATH] {
        if !files.contains(required) {
            anyhow::bail!("{} is missing from the package", required);
        }
    }

    if let Some(path) = files.paths().find(|path| path.is_empty() || path.starts_with('/')) {
        anyhow::bail!("Invalid archive path {:?}", path);
    }

    Ok(())
}
