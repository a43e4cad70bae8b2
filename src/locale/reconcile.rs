//! Filling gaps in locale catalogs from the default locale
//!
//! The default locale is the reference: every key it defines must exist in
//! every packaged locale. Reconciliation first collects the reference catalogs
//! (from disk, independent of the package contents, plus imported bundles),
//! then merges them into each packaged locale. Existing catalogs only ever grow
//! by appended entries; catalogs a locale lacks entirely are copied verbatim.

use super::{import_locales, locale_path, LOCALE_ROOT};
use crate::models::{BuildParams, Warning, WarningKind};
use crate::packager::Files;
use crate::parser::{CatalogFormat, LocaleCatalog};
use crate::utils::archive_path;
use anyhow::Result;
use std::collections::BTreeMap;

/// Reference catalogs keyed by path relative to the locale directory.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalogs {
    catalogs: BTreeMap<String, LocaleCatalog>,
}

impl ReferenceCatalogs {
    /// Read the default locale into a scratch package and parse its catalogs.
    /// Problems are reported to `files`, which receives the scratch warnings.
    pub fn collect(params: &BuildParams, files: &mut Files) -> Result<Self> {
        let default_locale = params.config.default_locale.as_str();
        let default_dir = params.config.locales_dir().join(default_locale);
        let prefix = format!("{}/{}/", LOCALE_ROOT, default_locale);

        let mut scratch = Files::new(files.filter().clone());
        if default_dir.is_dir() {
            scratch.read(&default_dir, &archive_path(&default_dir, &params.config.base_dir), &[])?;
        }
        import_locales(params, &[default_locale.to_string()], &mut scratch)?;
        for warning in scratch.take_warnings() {
            files.add_warning(warning);
        }

        let mut catalogs = BTreeMap::new();
        for (path, data) in scratch.iter() {
            let Some(file) = path.strip_prefix(&prefix) else { continue };
            let Ok(text) = std::str::from_utf8(data) else {
                if CatalogFormat::from_path(path).is_some() {
                    files.add_warning(Warning::new(
                        WarningKind::MalformedCatalog,
                        format!("{} is not valid UTF-8", path),
                        Some(path.to_string()),
                    ));
                }
                continue;
            };
            match LocaleCatalog::parse(text, path) {
                Ok(Some(catalog)) => {
                    for line in &catalog.unrecognized {
                        files.add_warning(Warning::new(
                            WarningKind::UnrecognizedCatalogLine,
                            format!("Unrecognized data in file {}: {}", path, line),
                            Some(path.to_string()),
                        ));
                    }
                    catalogs.insert(file.to_string(), catalog);
                }
                Ok(None) => {}
                Err(err) => files.add_warning(Warning::new(
                    WarningKind::MalformedCatalog,
                    err.to_string(),
                    Some(path.to_string()),
                )),
            }
        }
        Ok(Self { catalogs })
    }

    pub fn from_catalogs(catalogs: BTreeMap<String, LocaleCatalog>) -> Self {
        Self { catalogs }
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    pub fn get(&self, file: &str) -> Option<&LocaleCatalog> {
        self.catalogs.get(file)
    }

    /// Make every reference key available in every locale of `locales`.
    pub fn merge_into(&self, files: &mut Files, locales: &[String]) {
        for locale in locales {
            for (file, reference) in &self.catalogs {
                let path = locale_path(locale, file);
                let existing = files.get(&path).map(|data| std::str::from_utf8(data).map(str::to_owned));
                match existing {
                    None => files.put(&path, reference.raw()),
                    Some(Ok(text)) => merge_catalog(files, &path, &text, reference),
                    Some(Err(_)) => files.add_warning(Warning::new(
                        WarningKind::MalformedCatalog,
                        format!("{} is not valid UTF-8", path),
                        Some(path.clone()),
                    )),
                }
            }
        }
    }
}

fn merge_catalog(files: &mut Files, path: &str, text: &str, reference: &LocaleCatalog) {
    let target = match LocaleCatalog::parse(text, path) {
        Ok(Some(target)) => target,
        Ok(None) => return,
        Err(err) => {
            files.add_warning(Warning::new(
                WarningKind::MalformedCatalog,
                err.to_string(),
                Some(path.to_string()),
            ));
            return;
        }
    };

    let format = CatalogFormat::from_path(path).unwrap_or(reference.format);
    let missing: String = reference
        .entries()
        .filter(|(key, _)| !target.contains_key(key))
        .map(|(key, value)| format.entry(key, value))
        .collect();
    if missing.is_empty() {
        return;
    }

    let mut extra = String::new();
    if !text.is_empty() && !text.ends_with('\n') {
        extra.push('\n');
    }
    extra.push_str(&missing);
    files.append(path, extra.as_bytes());
}

/// Reconcile all packaged locales against the default locale.
pub fn fixup_locales(params: &BuildParams, files: &mut Files) -> Result<()> {
    let reference = ReferenceCatalogs::collect(params, files)?;
    tracing::debug!(
        "Reconciling {} locales against {} reference catalogs",
        params.locales.len(),
        reference.catalogs.len()
    );
    reference.merge_into(files, &params.locales);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::PathFilter;
    use pretty_assertions::assert_eq;

    fn reference() -> ReferenceCatalogs {
        let mut catalogs = BTreeMap::new();
        let global = "title=Adblock Plus\nsubscribe=Subscribe\nremove=Remove\n";
        catalogs.insert(
            "global.properties".to_string(),
            LocaleCatalog::parse(global, "global.properties").unwrap().unwrap(),
        );
        let overlay = "<!ENTITY menu \"Menu\">\n<!ENTITY tip \"Tips &amp; tricks\">\n";
        catalogs.insert(
            "overlay.dtd".to_string(),
            LocaleCatalog::parse(overlay, "overlay.dtd").unwrap().unwrap(),
        );
        ReferenceCatalogs::from_catalogs(catalogs)
    }

    fn files() -> Files {
        Files::new(PathFilter::new(["chrome"], ["meta.properties"]))
    }

    fn text(files: &Files, path: &str) -> String {
        String::from_utf8(files.get(path).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_appends_missing_keys_only() {
        let mut files = files();
        files.put("chrome/locale/de/global.properties", "# German\nsubscribe = Abonnieren\n");

        reference().merge_into(&mut files, &["de".to_string()]);

        assert_eq!(
            text(&files, "chrome/locale/de/global.properties"),
            "# German\nsubscribe = Abonnieren\ntitle=Adblock Plus\nremove=Remove\n"
        );
    }

    #[test]
    fn test_missing_file_copied_verbatim() {
        let mut files = files();
        reference().merge_into(&mut files, &["de".to_string()]);

        assert_eq!(
            text(&files, "chrome/locale/de/overlay.dtd"),
            "<!ENTITY menu \"Menu\">\n<!ENTITY tip \"Tips &amp; tricks\">\n"
        );
    }

    #[test]
    fn test_dtd_entries_use_dtd_format() {
        let mut files = files();
        files.put("chrome/locale/fr/overlay.dtd", "<!ENTITY menu \"Menu FR\">");

        reference().merge_into(&mut files, &["fr".to_string()]);

        assert_eq!(
            text(&files, "chrome/locale/fr/overlay.dtd"),
            "<!ENTITY menu \"Menu FR\">\n<!ENTITY tip \"Tips &amp; tricks\">\n"
        );
    }

    #[test]
    fn test_every_reference_key_present_after_merge() {
        let mut files = files();
        files.put("chrome/locale/de/global.properties", "title=Titel\n");
        let locales = vec!["de".to_string(), "ru".to_string()];
        let reference = reference();
        reference.merge_into(&mut files, &locales);

        for locale in &locales {
            for file in reference.files() {
                let path = locale_path(locale, file);
                let catalog = LocaleCatalog::parse(&text(&files, &path), &path).unwrap().unwrap();
                for (key, _) in reference.get(file).unwrap().entries() {
                    assert!(catalog.contains_key(key), "{} missing from {}", key, path);
                }
            }
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut files = files();
        files.put("chrome/locale/de/global.properties", "title=Titel");
        let locales = vec!["de".to_string()];

        reference().merge_into(&mut files, &locales);
        let once: Vec<(String, Vec<u8>)> =
            files.iter().map(|(p, d)| (p.to_string(), d.to_vec())).collect();
        reference().merge_into(&mut files, &locales);
        let twice: Vec<(String, Vec<u8>)> =
            files.iter().map(|(p, d)| (p.to_string(), d.to_vec())).collect();

        assert_eq!(once, twice);
    }

    fn params(base_dir: &std::path::Path, locales: &[&str]) -> BuildParams {
        BuildParams {
            config: crate::models::BuildConfig::new(base_dir),
            locales: locales.iter().map(|l| l.to_string()).collect(),
            version: "1.0".to_string(),
            metadata: crate::parser::Metadata::default(),
            contributors: Vec::new(),
        }
    }

    #[test]
    fn test_non_utf8_reference_skipped() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let en = temp_dir.path().join("chrome/locale/en-US");
        std::fs::create_dir_all(&en).unwrap();
        std::fs::write(en.join("global.properties"), b"title=Caf\xe9\n").unwrap();
        std::fs::write(en.join("overlay.dtd"), "<!ENTITY menu \"Menu\">\n").unwrap();

        let mut files = files();
        fixup_locales(&params(temp_dir.path(), &["de"]), &mut files).unwrap();

        assert!(!files.contains("chrome/locale/de/global.properties"));
        assert_eq!(text(&files, "chrome/locale/de/overlay.dtd"), "<!ENTITY menu \"Menu\">\n");
        assert_eq!(files.warnings().len(), 1);
        assert_eq!(files.warnings()[0].kind, WarningKind::MalformedCatalog);
        assert_eq!(
            files.warnings()[0].location.as_deref(),
            Some("chrome/locale/en-US/global.properties")
        );
    }

    #[test]
    fn test_malformed_target_left_alone() {
        let mut files = files();
        files.put("chrome/locale/de/overlay.dtd", "<!ENTITY menu \"Menü\">\nbroken");

        reference().merge_into(&mut files, &["de".to_string()]);

        assert_eq!(
            text(&files, "chrome/locale/de/overlay.dtd"),
            "<!ENTITY menu \"Menü\">\nbroken"
        );
        assert_eq!(files.warnings().len(), 1);
        assert_eq!(files.warnings()[0].kind, WarningKind::MalformedCatalog);
    }
}
