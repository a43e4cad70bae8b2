//! In-memory package contents
//!
//! [`Files`] maps archive paths to file contents. Everything that ends up in
//! the archive goes through [`Files::put`], which runs the configured
//! [`ValueTransform`]s first.
//!
//! Directory ingestion never overwrites: when an archive path is already taken
//! the new content is dropped with a warning. Callers rely on this by reading
//! mapped files before the bulk directory walk.

use super::filter::PathFilter;
use crate::error::PackagerError;
use crate::models::{FileKind, Warning, WarningKind};
use crate::parser::MetadataItem;
use crate::utils::template;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Rewrites file contents as they are stored.
pub trait ValueTransform {
    fn apply(&self, path: &str, data: Vec<u8>) -> Vec<u8>;
}

impl<F> ValueTransform for F
where
    F: Fn(&str, Vec<u8>) -> Vec<u8>,
{
    fn apply(&self, path: &str, data: Vec<u8>) -> Vec<u8> {
        self(path, data)
    }
}

pub struct Files {
    filter: PathFilter,
    entries: BTreeMap<String, Vec<u8>>,
    transforms: Vec<Box<dyn ValueTransform>>,
    warnings: Vec<Warning>,
}

impl fmt::Debug for Files {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Files")
            .field("filter", &self.filter)
            .field("paths", &self.entries.keys().collect::<Vec<_>>())
            .field("transforms", &self.transforms.len())
            .field("warnings", &self.warnings)
            .finish()
    }
}

impl Files {
    pub fn new(filter: PathFilter) -> Self {
        Self {
            filter,
            entries: BTreeMap::new(),
            transforms: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: impl ValueTransform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    pub fn is_included(&self, relpath: &str) -> bool {
        self.filter.is_included(relpath)
    }

    /// Store `data` under `path` after running the transforms, replacing any
    /// previous content.
    pub fn put(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        let data = self
            .transforms
            .iter()
            .fold(data.into(), |data, transform| transform.apply(path, data));
        self.entries.insert(path.to_string(), data);
    }

    /// Append to the content stored under `path` (an absent path counts as empty).
    pub fn append(&mut self, path: &str, extra: &[u8]) {
        let mut data = self.entries.get(path).cloned().unwrap_or_default();
        data.extend_from_slice(extra);
        self.put(path, data);
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Archive paths in lexical order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Record a warning and report it on the operator stream.
    pub fn add_warning(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Read a file or a directory tree into the package under `relpath`.
    ///
    /// Directory entries are only descended into when their archive path
    /// passes the filter; immediate children named in `skip` are left out.
    pub fn read(&mut self, path: &Path, relpath: &str, skip: &[&str]) -> Result<()> {
        if !path.is_dir() {
            let data = fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            self.insert_new(relpath, data);
            return Ok(());
        }

        let mut found: Vec<(String, PathBuf)> = Vec::new();
        let walker = WalkDir::new(path)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 1 && skip.iter().any(|s| entry.file_name() == *s) {
                    return false;
                }
                entry
                    .path()
                    .strip_prefix(path)
                    .map(|relative| self.filter.is_included(&archive_name(relpath, relative)))
                    .unwrap_or(false)
            });

        for entry in walker {
            let entry = entry
                .with_context(|| format!("Failed to walk {}", path.display()))?;
            if entry.file_type().is_dir() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(path)
                .context("Failed to get relative path")?;
            found.push((archive_name(relpath, relative), entry.path().to_path_buf()));
        }

        tracing::debug!("Reading {} files from {}", found.len(), path.display());
        for (name, file_path) in found {
            let data = fs::read(&file_path)
                .with_context(|| format!("Failed to read {}", file_path.display()))?;
            self.insert_new(&name, data);
        }
        Ok(())
    }

    fn insert_new(&mut self, relpath: &str, data: Vec<u8>) {
        if self.contains(relpath) {
            self.add_warning(Warning::new(
                WarningKind::Conflict,
                format!("File {} defined multiple times", relpath),
                Some(relpath.to_string()),
            ));
        } else {
            self.put(relpath, data);
        }
    }

    /// Read `[mapping]` entries: archive target = source path relative to the
    /// metadata file declaring it.
    pub fn read_mapped(&mut self, mappings: &[MetadataItem]) -> Result<()> {
        for item in mappings {
            let target = item.key.as_str();
            if target.contains('/') && !self.is_included(target) {
                continue;
            }
            let parts: PathBuf = item.value.split('/').collect();
            let path = item.source_dir().join(parts);
            if path.exists() {
                self.read(&path, target, &[])?;
            } else {
                self.add_warning(Warning::new(
                    WarningKind::MissingSource,
                    format!("Mapped file {} doesn't exist", item.value),
                    Some(target.to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Render the named files as templates, in place.
    pub fn preprocess<S: Serialize>(&mut self, filenames: &[String], params: &S) -> Result<()> {
        for filename in filenames {
            let data = self
                .get(filename)
                .ok_or_else(|| PackagerError::MissingTemplateTarget(filename.clone()))?;
            let source = std::str::from_utf8(data)
                .with_context(|| format!("{} is not valid UTF-8", filename))?;
            let auto_escape = FileKind::from_path(filename).auto_escape();
            let rendered = template::render(filename, source, auto_escape, params)?;
            self.put(filename, rendered);
        }
        Ok(())
    }
}

fn archive_name(prefix: &str, relative: &Path) -> String {
    let mut name = prefix.to_string();
    for component in relative.components() {
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}
