//! Native locale catalog formats
//!
//! Two line based formats are understood: Java style `.properties` files and
//! XML `.dtd` entity files. A parsed catalog keeps the text it was parsed from
//! so a whole file can be copied verbatim, while missing entries are appended
//! with [`CatalogFormat::entry`].

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

lazy_static! {
    static ref PROPERTIES_COMMENT: Regex = Regex::new(r"^\s*[#!]").unwrap();

    static ref DTD_COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();

    static ref DTD_ENTITY: Regex = Regex::new(
        r#"<!ENTITY\s+([\w.\-]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#
    ).unwrap();

    static ref AMPERSAND: Regex = Regex::new(r"&(#x[0-9A-Fa-f]+;|#[0-9]+;|[A-Za-z_][\w.\-]*;)?").unwrap();
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unexpected content in {path}: {snippet}")]
    Malformed { path: String, snippet: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Properties,
    Dtd,
}

impl CatalogFormat {
    /// Catalog format for a file, `None` for files that are not catalogs.
    pub fn from_path(path: &str) -> Option<Self> {
        if path.ends_with(".properties") {
            Some(CatalogFormat::Properties)
        } else if path.ends_with(".dtd") {
            Some(CatalogFormat::Dtd)
        } else {
            None
        }
    }

    /// Serialized form of a single entry, newline terminated.
    pub fn entry(self, key: &str, value: &str) -> String {
        match self {
            CatalogFormat::Properties => {
                format!("{}={}\n", escape_property(key), escape_property(value))
            }
            CatalogFormat::Dtd => {
                format!("<!ENTITY {} \"{}\">\n", escape_entity(key), escape_entity(value))
            }
        }
    }
}

/// Generate a catalog entry in the format implied by `path`.
pub fn generate_entry(key: &str, value: &str, path: &str) -> String {
    CatalogFormat::from_path(path)
        .unwrap_or(CatalogFormat::Properties)
        .entry(key, value)
}

fn escape_property(value: &str) -> String {
    value.replace('\n', "\\n")
}

/// Entity references such as `&brandShortName;` are kept as they are.
fn escape_entity(value: &str) -> String {
    AMPERSAND
        .replace_all(value, |caps: &regex::Captures| {
            if caps.get(1).is_some() {
                caps[0].to_string()
            } else {
                "&amp;".to_string()
            }
        })
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn unescape_entity(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCatalog {
    pub format: CatalogFormat,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    raw: String,
    /// Lines of a `.properties` file that are neither entries nor comments
    pub unrecognized: Vec<String>,
}

impl LocaleCatalog {
    /// Parse catalog text. Returns `Ok(None)` when `path` is not a catalog file.
    pub fn parse(data: &str, path: &str) -> Result<Option<Self>, CatalogError> {
        let Some(format) = CatalogFormat::from_path(path) else {
            return Ok(None);
        };
        let mut catalog = Self {
            format,
            entries: Vec::new(),
            index: HashMap::new(),
            raw: data.to_string(),
            unrecognized: Vec::new(),
        };
        match format {
            CatalogFormat::Properties => catalog.parse_properties(data),
            CatalogFormat::Dtd => catalog.parse_dtd(data, path)?,
        }
        Ok(Some(catalog))
    }

    fn parse_properties(&mut self, data: &str) {
        for line in data.lines() {
            if PROPERTIES_COMMENT.is_match(line) {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => self.insert(key.trim(), value.trim()),
                None if !line.trim().is_empty() => self.unrecognized.push(line.to_string()),
                None => {}
            }
        }
    }

    fn parse_dtd(&mut self, data: &str, path: &str) -> Result<(), CatalogError> {
        let stripped = DTD_COMMENT.replace_all(data, "");
        let mut last_end = 0;
        for caps in DTD_ENTITY.captures_iter(&stripped) {
            let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
            check_gap(&stripped[last_end..whole.0], path)?;
            last_end = whole.1;

            let value = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or("");
            self.insert(&caps[1], &unescape_entity(value));
        }
        check_gap(&stripped[last_end..], path)
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&idx) => self.entries[idx].1 = value.to_string(),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value.to_string()));
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&idx| self.entries[idx].1.as_str())
    }

    /// Entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The text this catalog was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn check_gap(gap: &str, path: &str) -> Result<(), CatalogError> {
    let gap = gap.trim();
    if gap.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::Malformed {
            path: path.to_string(),
            snippet: gap.chars().take(40).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_properties() {
        let data = "# comment\n! other comment\ntitle = Adblock Plus\nempty=\n\nurl=http://a/?x=y\n";
        let catalog = LocaleCatalog::parse(data, "global.properties").unwrap().unwrap();

        let entries: Vec<_> = catalog.entries().collect();
        assert_eq!(
            entries,
            vec![("title", "Adblock Plus"), ("empty", ""), ("url", "http://a/?x=y")]
        );
        assert_eq!(catalog.raw(), data);
        assert!(catalog.unrecognized.is_empty());
    }

    #[test]
    fn test_properties_unrecognized_lines() {
        let catalog = LocaleCatalog::parse("a=1\nnot an entry\n", "x.properties")
            .unwrap()
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.unrecognized, vec!["not an entry".to_string()]);
    }

    #[test]
    fn test_parse_dtd() {
        let data = "<!-- header -->\n<!ENTITY menu.label \"Options &amp; more\">\n<!ENTITY tip 'single'>\n";
        let catalog = LocaleCatalog::parse(data, "overlay.dtd").unwrap().unwrap();
        assert_eq!(catalog.get("menu.label"), Some("Options & more"));
        assert_eq!(catalog.get("tip"), Some("single"));
        assert_eq!(catalog.format, CatalogFormat::Dtd);
    }

    #[test]
    fn test_malformed_dtd() {
        let result = LocaleCatalog::parse("<!ENTITY ok \"1\">\ngarbage\n", "broken.dtd");
        assert!(matches!(result, Err(CatalogError::Malformed { .. })));
    }

    #[test]
    fn test_non_catalog_file() {
        assert_eq!(LocaleCatalog::parse("whatever", "readme.txt").unwrap(), None);
    }

    #[test]
    fn test_generate_entries() {
        assert_eq!(generate_entry("key", "line1\nline2", "a.properties"), "key=line1\\nline2\n");
        assert_eq!(
            generate_entry("key", "<b>\"x\" & y</b>", "a.dtd"),
            "<!ENTITY key \"&lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;\">\n"
        );
    }

    #[test]
    fn test_dtd_entity_references_kept() {
        assert_eq!(
            CatalogFormat::Dtd.entry("brand", "&brandShortName; & &#169; &#xA9;"),
            "<!ENTITY brand \"&brandShortName; &amp; &#169; &#xA9;\">\n"
        );

        let reference = LocaleCatalog::parse("<!ENTITY about \"About &brandShortName;\">", "x.dtd")
            .unwrap()
            .unwrap();
        let (key, value) = reference.entries().next().unwrap();
        assert_eq!(
            CatalogFormat::Dtd.entry(key, value),
            "<!ENTITY about \"About &brandShortName;\">\n"
        );
    }

    #[test]
    fn test_generated_dtd_entry_parses_back() {
        let entry = CatalogFormat::Dtd.entry("k", "a < b & \"c\"");
        let catalog = LocaleCatalog::parse(&entry, "x.dtd").unwrap().unwrap();
        assert_eq!(catalog.get("k"), Some("a < b & \"c\""));
    }
}
