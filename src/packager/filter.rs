//! Deciding which paths belong in the package

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Top-level entries that always belong to a Gecko extension package.
pub const PACKAGE_ENTRIES: &[&str] = &[
    "chrome",
    "components",
    "modules",
    "lib",
    "resources",
    "defaults",
    "chrome.manifest",
    "icon.png",
    "icon64.png",
];

/// Path segments never packaged, at any depth.
pub const IGNORED_SEGMENTS: &[&str] = &[".incomplete", "meta.properties"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    included: HashSet<String>,
    ignored: HashSet<String>,
}

impl PathFilter {
    pub fn new<I, J, S, T>(included: I, ignored: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            included: included.into_iter().map(Into::into).collect(),
            ignored: ignored.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter for a package rooted at `base_dir`: the fixed package entries
    /// plus every top-level `.js` and `.xml` file.
    pub fn for_package(base_dir: &Path) -> Result<Self> {
        let mut included: HashSet<String> = PACKAGE_ENTRIES.iter().map(|s| s.to_string()).collect();
        let entries = fs::read_dir(base_dir)
            .with_context(|| format!("Failed to list {}", base_dir.display()))?;
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".js") || name.ends_with(".xml") {
                included.insert(name);
            }
        }
        Ok(Self {
            included,
            ignored: IGNORED_SEGMENTS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// A path is included when its first segment is an included entry and
    /// none of its segments is ignored.
    pub fn is_included(&self, relpath: &str) -> bool {
        let mut parts = relpath.split('/');
        match parts.next() {
            Some(first) if self.included.contains(first) => {}
            _ => return false,
        }
        !relpath.split('/').any(|part| self.ignored.contains(part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn filter() -> PathFilter {
        PathFilter::new(["lib", "chrome", "bootstrap.js"], [".incomplete", "meta.properties"])
    }

    #[test_case("lib", true)]
    #[test_case("lib/main.js", true)]
    #[test_case("chrome/locale/de/global.properties", true)]
    #[test_case("bootstrap.js", true)]
    #[test_case("src/main.js", false)]
    #[test_case("README.md", false)]
    #[test_case("chrome/locale/de/meta.properties", false)]
    #[test_case("chrome/locale/de/.incomplete", false)]
    #[test_case("library/main.js", false)]
    fn test_is_included(path: &str, expected: bool) {
        assert_eq!(filter().is_included(path), expected);
    }

    #[test]
    fn test_ignored_first_segment() {
        let filter = PathFilter::new(["meta.properties"], ["meta.properties"]);
        assert!(!filter.is_included("meta.properties"));
    }

    #[test]
    fn test_for_package_adds_top_level_scripts() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bootstrap.js"), "").unwrap();
        std::fs::write(temp_dir.path().join("install.xml"), "").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let filter = PathFilter::for_package(temp_dir.path()).unwrap();
        assert!(filter.is_included("bootstrap.js"));
        assert!(filter.is_included("install.xml"));
        assert!(filter.is_included("defaults/prefs.json"));
        assert!(!filter.is_included("notes.txt"));
    }
}
