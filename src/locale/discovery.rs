//! Finding the locales a package ships

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref LOCALE_NAME: Regex = Regex::new(r"^[\w\-]+$").unwrap();
}

const INCOMPLETE_MARKER: &str = ".incomplete";

pub fn is_locale_name(name: &str) -> bool {
    LOCALE_NAME.is_match(name)
}

/// A locale directory is valid when its name is a plain identifier, it is a
/// non-empty directory and, unless `include_incomplete` is set, it carries no
/// `.incomplete` marker.
pub fn is_valid_locale(locales_dir: &Path, name: &str, include_incomplete: bool) -> bool {
    if !is_locale_name(name) {
        return false;
    }
    let dir = locales_dir.join(name);
    if !dir.is_dir() {
        return false;
    }
    let non_empty = fs::read_dir(&dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if !non_empty {
        return false;
    }
    include_incomplete || !dir.join(INCOMPLETE_MARKER).exists()
}

/// Locales available under `locales_dir`, sorted with `default_locale` first.
/// A missing locales directory yields no locales.
pub fn get_locales(
    locales_dir: &Path,
    include_incomplete: bool,
    default_locale: &str,
) -> Result<Vec<String>> {
    if !locales_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut locales = Vec::new();
    for entry in fs::read_dir(locales_dir)
        .with_context(|| format!("Failed to list locales in {}", locales_dir.display()))?
    {
        let entry = entry.context("Failed to read locale directory entry")?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_valid_locale(locales_dir, &name, include_incomplete) {
            locales.push(name);
        }
    }
    locales.sort_by(|a, b| (a != default_locale, a).cmp(&(b != default_locale, b)));
    Ok(locales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locale(dir: &Path, name: &str, files: &[&str]) {
        let path = dir.join(name);
        fs::create_dir_all(&path).unwrap();
        for file in files {
            fs::write(path.join(file), "").unwrap();
        }
    }

    #[test]
    fn test_get_locales_sorted_default_first() {
        let temp_dir = TempDir::new().unwrap();
        locale(temp_dir.path(), "de", &["global.properties"]);
        locale(temp_dir.path(), "ar", &["global.properties"]);
        locale(temp_dir.path(), "en-US", &["global.properties"]);
        locale(temp_dir.path(), "fr", &["global.properties", ".incomplete"]);
        locale(temp_dir.path(), "empty", &[]);
        locale(temp_dir.path(), "bad.name", &["global.properties"]);
        fs::write(temp_dir.path().join("stray-file"), "").unwrap();

        let locales = get_locales(temp_dir.path(), false, "en-US").unwrap();
        assert_eq!(locales, vec!["en-US", "ar", "de"]);

        let all = get_locales(temp_dir.path(), true, "en-US").unwrap();
        assert_eq!(all, vec!["en-US", "ar", "de", "fr"]);
    }

    #[test]
    fn test_missing_locales_dir() {
        let temp_dir = TempDir::new().unwrap();
        let locales = get_locales(&temp_dir.path().join("nope"), false, "en-US").unwrap();
        assert!(locales.is_empty());
    }
}
