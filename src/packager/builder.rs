//! XPI archive writing

use super::files::Files;
use super::signing::SIGNATURE_PATH;
use anyhow::{Context, Result};
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Archive member order: ascending by `sort_key`, with the signature block
/// always written last.
pub fn archive_order<'a, K, F>(paths: impl Iterator<Item = &'a str>, sort_key: F) -> Vec<&'a str>
where
    K: Ord,
    F: Fn(&str) -> K,
{
    let mut names: Vec<&str> = paths.collect();
    names.sort_by_cached_key(|name| (*name == SIGNATURE_PATH, sort_key(*name)));
    names
}

impl Files {
    /// Write the package as a deflated ZIP in lexical path order.
    pub fn zip<W: Write + Seek>(&self, writer: W) -> Result<W> {
        self.zip_sorted(writer, |name| name.to_string())
    }

    pub fn zip_sorted<W, K, F>(&self, writer: W, sort_key: F) -> Result<W>
    where
        W: Write + Seek,
        K: Ord,
        F: Fn(&str) -> K,
    {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for name in archive_order(self.paths(), sort_key) {
            let data = self.get(name).unwrap_or_default();
            zip.start_file(name, options)
                .with_context(|| format!("Failed to add {} to archive", name))?;
            zip.write_all(data)
                .with_context(|| format!("Failed to write {} to archive", name))?;
        }

        zip.finish().context("Failed to finish archive")
    }

    pub fn zip_to_vec(&self) -> Result<Vec<u8>> {
        Ok(self.zip(Cursor::new(Vec::new()))?.into_inner())
    }
}

/// Write `data` to `path` without ever leaving a partial file there.
pub fn write_archive(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let partial = partial_path(path);
    fs::write(&partial, data)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    fs::rename(&partial, path)
        .with_context(|| format!("Failed to move archive to {}", path.display()))?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
