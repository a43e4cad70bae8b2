//! Layered metadata (`metadata.<type>`) reading
//!
//! A metadata file may pull in base files through `[default] inherit = ...`.
//! Inherited files are read first so the inheriting file wins. Options written
//! as `key += value` or `key -= value` add words to, or remove words from, the
//! value inherited so far. Every value remembers the file it came from, which is
//! what relative paths in `[mapping]` and `[import_locales]` are resolved against.

use crate::error::PackagerError;
use anyhow::{Context, Result};
use ini::{Ini, ParseOption};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

const INHERIT_SECTION: &str = "default";
const INHERIT_OPTION: &str = "inherit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
    /// File the value was (last) defined in
    pub source: PathBuf,
}

impl MetadataItem {
    /// Directory relative paths in this value are resolved against.
    pub fn source_dir(&self) -> &Path {
        self.source.parent().unwrap_or_else(|| Path::new(""))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    sections: Vec<(String, Vec<MetadataItem>)>,
}

impl Metadata {
    /// Read a metadata file together with everything it inherits from.
    pub fn read(path: &Path) -> Result<Self> {
        let mut metadata = Self::default();
        let mut stack = HashSet::new();
        metadata.read_layer(path, &mut stack)?;
        Ok(metadata)
    }

    fn read_layer(&mut self, path: &Path, stack: &mut HashSet<PathBuf>) -> Result<()> {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("Failed to locate metadata file {}", path.display()))?;
        if !stack.insert(canonical.clone()) {
            anyhow::bail!("Metadata file {} inherits from itself", path.display());
        }

        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_file_opt(path, options)
            .with_context(|| format!("Failed to parse metadata file {}", path.display()))?;

        if let Some(inherit) = ini
            .section(Some(INHERIT_SECTION))
            .and_then(|section| section.get(INHERIT_OPTION))
        {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            for parent in inherit.split_whitespace() {
                let parts: PathBuf = parent.split('/').collect();
                self.read_layer(&dir.join(parts), stack)?;
            }
        }

        for (section, properties) in ini.iter() {
            let Some(section) = section else { continue };
            for (key, value) in properties.iter() {
                if section == INHERIT_SECTION && key == INHERIT_OPTION {
                    continue;
                }
                self.apply(section, key, value, path);
            }
        }

        stack.remove(&canonical);
        Ok(())
    }

    fn apply(&mut self, section: &str, key: &str, value: &str, source: &Path) {
        let key = key.trim();
        if let Some(name) = key.strip_suffix('+') {
            let name = name.trim_end();
            let mut words: Vec<String> = self
                .get_opt(section, name)
                .map(|v| v.split_whitespace().map(String::from).collect())
                .unwrap_or_default();
            words.extend(value.split_whitespace().map(String::from));
            self.set(section, name, &words.join(" "), source);
        } else if let Some(name) = key.strip_suffix('-') {
            let name = name.trim_end();
            let removed: HashSet<&str> = value.split_whitespace().collect();
            let words: Vec<&str> = self
                .get_opt(section, name)
                .map(|v| v.split_whitespace().filter(|w| !removed.contains(w)).collect())
                .unwrap_or_default();
            let joined = words.join(" ");
            self.set(section, name, &joined, source);
        } else {
            self.set(section, key, value.trim(), source);
        }
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str, source: &Path) {
        let item = MetadataItem {
            key: key.to_string(),
            value: value.to_string(),
            source: source.to_path_buf(),
        };
        let idx = match self.sections.iter().position(|(name, _)| name == section) {
            Some(idx) => idx,
            None => {
                self.sections.push((section.to_string(), Vec::new()));
                self.sections.len() - 1
            }
        };
        let items = &mut self.sections[idx].1;
        match items.iter_mut().find(|existing| existing.key == key) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.iter().any(|(name, _)| name == section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    /// Items of a section in definition order; empty when the section is absent.
    pub fn items(&self, section: &str) -> &[MetadataItem] {
        self.sections
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn item(&self, section: &str, key: &str) -> Option<&MetadataItem> {
        self.items(section).iter().find(|item| item.key == key)
    }

    pub fn get_opt(&self, section: &str, key: &str) -> Option<&str> {
        self.item(section, key).map(|item| item.value.as_str())
    }

    pub fn get(&self, section: &str, key: &str) -> Result<&str, PackagerError> {
        self.get_opt(section, key)
            .ok_or_else(|| PackagerError::MissingMetadata {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Plain section -> key -> value view handed to templates.
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.sections
            .iter()
            .map(|(name, items)| {
                let values = items
                    .iter()
                    .map(|item| (item.key.clone(), item.value.clone()))
                    .collect();
                (name.clone(), values)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_sections_with_provenance() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata.gecko");
        fs::write(
            &path,
            "[general]\nbasename = adblockplus\nversion = 2.6\n\n[mapping]\nlib/foo.js = ../shared/foo.js\n",
        )
        .unwrap();

        let metadata = Metadata::read(&path).unwrap();
        assert_eq!(metadata.get("general", "basename").unwrap(), "adblockplus");
        assert!(metadata.has_section("mapping"));
        assert!(!metadata.has_section("preprocess"));

        let mapping = metadata.items("mapping");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[0].key, "lib/foo.js");
        assert_eq!(mapping[0].value, "../shared/foo.js");
        assert_eq!(mapping[0].source_dir(), temp_dir.path());
    }

    #[test]
    fn test_missing_option_is_error() {
        let metadata = Metadata::default();
        let err = metadata.get("general", "version").unwrap_err();
        assert!(matches!(err, PackagerError::MissingMetadata { .. }));
    }

    #[test]
    fn test_inherit_and_list_operators() {
        let temp_dir = TempDir::new().unwrap();
        let base_dir = temp_dir.path().join("shared");
        fs::create_dir(&base_dir).unwrap();
        fs::write(
            base_dir.join("metadata.common"),
            "[general]\nbasename = base\nversion = 1.0\n\n[preprocess]\nfiles = a.html b.html c.html\n",
        )
        .unwrap();

        let path = temp_dir.path().join("metadata.gecko");
        fs::write(
            &path,
            "[default]\ninherit = shared/metadata.common\n\n[general]\nbasename = child\n\n[preprocess]\nfiles += d.html\nfiles -= b.html\n",
        )
        .unwrap();

        let metadata = Metadata::read(&path).unwrap();
        assert_eq!(metadata.get("general", "basename").unwrap(), "child");
        assert_eq!(metadata.get("general", "version").unwrap(), "1.0");
        assert_eq!(metadata.get("preprocess", "files").unwrap(), "a.html c.html d.html");
        assert_eq!(
            metadata.item("general", "version").unwrap().source_dir(),
            base_dir.as_path()
        );
        assert!(metadata.get_opt("default", "inherit").is_none());
    }

    #[test]
    fn test_circular_inherit_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata.gecko");
        fs::write(&path, "[default]\ninherit = metadata.gecko\n").unwrap();
        assert!(Metadata::read(&path).is_err());
    }
}
