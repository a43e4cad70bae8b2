//! Importing locale strings from JSON message bundles
//!
//! `[import_locales]` entries name bundle files relative to the metadata file,
//! with `*` standing for the locale, e.g.
//!
//! ```ini
//! [import_locales]
//! ../ui/locale/*/firstRun.json = *
//! ../ui/locale/*/common.json = title subtitle
//! ```
//!
//! Each bundle becomes `chrome/locale/<locale>/<stem>.properties`. The value
//! lists the message keys to take; `*` or nothing takes them all.

use super::locale_path;
use crate::models::BuildParams;
use crate::packager::Files;
use crate::parser::catalog::generate_entry;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const IMPORT_SECTION: &str = "import_locales";

#[derive(Debug, Clone, Deserialize)]
pub struct BundleMessage {
    pub message: String,
}

/// Parse a message bundle, keys come back sorted.
pub fn read_bundle(path: &Path) -> Result<BTreeMap<String, BundleMessage>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read message bundle {}", path.display()))?;
    json5::from_str(&content)
        .with_context(|| format!("Failed to parse message bundle {}", path.display()))
}

/// Native catalog text for a bundle, one entry per selected key in key order.
pub fn bundle_to_catalog(
    bundle: &BTreeMap<String, BundleMessage>,
    keys: &KeyFilter,
    target: &str,
) -> String {
    bundle
        .iter()
        .filter(|(key, _)| keys.allows(key))
        .map(|(key, value)| generate_entry(key, &value.message, target))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    All,
    Only(HashSet<String>),
}

impl KeyFilter {
    pub fn parse(value: &str) -> Self {
        let keys: HashSet<String> = value.split_whitespace().map(String::from).collect();
        if keys.is_empty() || keys.contains("*") {
            KeyFilter::All
        } else {
            KeyFilter::Only(keys)
        }
    }

    pub fn allows(&self, key: &str) -> bool {
        match self {
            KeyFilter::All => true,
            KeyFilter::Only(keys) => keys.contains(key),
        }
    }
}

/// Materialize configured message bundles as catalogs for `locales`.
pub fn import_locales(params: &BuildParams, locales: &[String], files: &mut Files) -> Result<()> {
    if !params.metadata.has_section(IMPORT_SECTION) {
        return Ok(());
    }

    for locale in locales {
        for item in params.metadata.items(IMPORT_SECTION) {
            let parts: PathBuf = item
                .key
                .split('/')
                .map(|part| if part == "*" { locale.as_str() } else { part })
                .collect();
            let source = item.source_dir().join(parts);
            if !source.is_file() {
                continue;
            }

            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let target = locale_path(locale, &format!("{}.properties", stem));

            let bundle = read_bundle(&source)?;
            let catalog = bundle_to_catalog(&bundle, &KeyFilter::parse(&item.value), &target);
            tracing::debug!("Imported {} messages into {}", bundle.len(), target);
            files.put(&target, catalog);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_bundle_to_catalog_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.json");
        fs::write(
            &path,
            r#"{
                // comments are tolerated
                "zeta": {"message": "Last", "description": "ignored"},
                "alpha": {"message": "Line one\nLine two"}
            }"#,
        )
        .unwrap();

        let bundle = read_bundle(&path).unwrap();
        let text = bundle_to_catalog(&bundle, &KeyFilter::All, "chrome/locale/de/messages.properties");
        assert_eq!(text, "alpha=Line one\\nLine two\nzeta=Last\n");
    }

    #[test]
    fn test_key_filter() {
        assert_eq!(KeyFilter::parse(""), KeyFilter::All);
        assert_eq!(KeyFilter::parse("*"), KeyFilter::All);
        let filter = KeyFilter::parse("title subtitle");
        assert!(filter.allows("title"));
        assert!(!filter.allows("body"));
    }

    #[test]
    fn test_invalid_bundle_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_bundle(&path).is_err());
    }
}
