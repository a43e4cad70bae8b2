//! Build configuration

use crate::parser::Metadata;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_BUILD_TYPE: &str = "gecko";

/// Which locales end up in the package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocaleSelection {
    /// Every complete locale, default locale first
    #[default]
    Default,
    /// Every locale, including those marked `.incomplete`
    All,
    Explicit(Vec<String>),
}

impl LocaleSelection {
    /// Parses the command line form: `all`, or a comma separated list.
    pub fn parse(value: &str) -> Self {
        if value.trim() == "all" {
            return LocaleSelection::All;
        }
        let locales: Vec<String> = value
            .split(',')
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if locales.is_empty() {
            LocaleSelection::Default
        } else {
            LocaleSelection::Explicit(locales)
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub base_dir: PathBuf,
    pub build_type: String,
    pub out_file: Option<PathBuf>,
    pub locales: LocaleSelection,
    pub build_num: Option<String>,
    pub release_build: bool,
    pub key_file: Option<PathBuf>,
    pub multicompartment: bool,
    pub default_locale: String,
    /// Directory holding `lib/<module>.js` files that scripts may require
    /// without shipping them. When unset no modules are added to the package.
    pub module_library: Option<PathBuf>,
}

impl BuildConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            build_type: DEFAULT_BUILD_TYPE.to_string(),
            out_file: None,
            locales: LocaleSelection::Default,
            build_num: None,
            release_build: false,
            key_file: None,
            multicompartment: false,
            default_locale: DEFAULT_LOCALE.to_string(),
            module_library: None,
        }
    }

    pub fn with_out_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_file = Some(path.into());
        self
    }

    pub fn with_locales(mut self, locales: LocaleSelection) -> Self {
        self.locales = locales;
        self
    }

    pub fn with_build_num(mut self, build_num: impl Into<String>) -> Self {
        self.build_num = Some(build_num.into());
        self
    }

    pub fn release(mut self, release_build: bool) -> Self {
        self.release_build = release_build;
        self
    }

    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = Some(path.into());
        self
    }

    pub fn with_module_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_library = Some(path.into());
        self
    }

    pub fn chrome_dir(&self) -> PathBuf {
        self.base_dir.join("chrome")
    }

    pub fn locales_dir(&self) -> PathBuf {
        self.chrome_dir().join("locale")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.base_dir.join(format!("metadata.{}", self.build_type))
    }

    /// Chrome subdirectories read into the package, keyed by their name
    /// below `chrome/`.
    pub fn chrome_subdirs(&self, locales: &[String]) -> Vec<(String, PathBuf)> {
        let chrome_dir = self.chrome_dir();
        let mut result: Vec<(String, PathBuf)> = ["content", "skin"]
            .iter()
            .map(|sub| (sub.to_string(), chrome_dir.join(sub)))
            .collect();
        for locale in locales {
            result.push((format!("locale/{}", locale), self.locales_dir().join(locale)));
        }
        result
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Values resolved from the configuration once the build starts.
#[derive(Debug, Clone)]
pub struct BuildParams {
    pub config: BuildConfig,
    pub locales: Vec<String>,
    pub version: String,
    pub metadata: Metadata,
    pub contributors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_selection() {
        assert_eq!(LocaleSelection::parse("all"), LocaleSelection::All);
        assert_eq!(LocaleSelection::parse(""), LocaleSelection::Default);
        assert_eq!(
            LocaleSelection::parse("en-US, de"),
            LocaleSelection::Explicit(vec!["en-US".to_string(), "de".to_string()])
        );
    }

    #[test]
    fn test_chrome_subdirs() {
        let config = BuildConfig::new("/ext");
        let subdirs = config.chrome_subdirs(&["de".to_string()]);
        let names: Vec<&str> = subdirs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["content", "skin", "locale/de"]);
        assert_eq!(subdirs[2].1, PathBuf::from("/ext/chrome/locale/de"));
    }
}
