//! Contributor list for the install manifest
//!
//! Options of `[contributors]` with numeric names are literal names. Any other
//! option points into an XML file to harvest names from, in the form
//! `path/to/file.xml //tag/@attribute`, where the attribute holds a comma
//! separated list.

use crate::models::{Warning, WarningKind};
use crate::parser::Metadata;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

pub const CONTRIBUTORS_SECTION: &str = "contributors";

lazy_static! {
    static ref LOCATION: Regex = Regex::new(r"^\s*(\S+)\s+//([^/\s]+)/@(\S+)\s*$").unwrap();
    static ref NAME_SEPARATOR: Regex = Regex::new(r"\s*,\s*").unwrap();
}

/// Literal contributors in option order, then harvested ones sorted
/// case-insensitively.
pub fn get_contributors(metadata: &Metadata, warnings: &mut Vec<Warning>) -> Result<Vec<String>> {
    let mut items: Vec<_> = metadata.items(CONTRIBUTORS_SECTION).iter().collect();
    items.sort_by(|a, b| a.key.cmp(&b.key));

    let mut main = Vec::new();
    let mut additional: HashSet<String> = HashSet::new();
    for item in items {
        if item.key.chars().all(|c| c.is_ascii_digit()) {
            main.push(item.value.clone());
            continue;
        }

        let Some(caps) = LOCATION.captures(&item.value) else {
            warnings.push(Warning::new(
                WarningKind::UnrecognizedContributor,
                format!("Unrecognized contributor location \"{}\"", item.value),
                Some(format!("{}:{}", CONTRIBUTORS_SECTION, item.key)),
            ));
            continue;
        };

        let parts: PathBuf = caps[1].split('/').collect();
        let path = item.source_dir().join(parts);
        let xml = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read contributor list {}", path.display()))?;
        additional.extend(attribute_values(&xml, &caps[2], &caps[3]));
    }

    let mut additional: Vec<String> = additional.into_iter().collect();
    additional.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    main.extend(additional);
    Ok(main)
}

/// Names listed in `attribute` of every `tag` element.
fn attribute_values(xml: &str, tag: &str, attribute: &str) -> Vec<String> {
    let Ok(tag_pattern) = Regex::new(&format!(r"<{}\b[^>]*>", regex::escape(tag))) else {
        return Vec::new();
    };
    let Ok(attr_pattern) = Regex::new(&format!(
        r#"\s{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(attribute)
    )) else {
        return Vec::new();
    };

    let mut names = Vec::new();
    for element in tag_pattern.find_iter(xml) {
        if let Some(caps) = attr_pattern.captures(element.as_str()) {
            let value = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or("");
            names.extend(
                NAME_SEPARATOR
                    .split(value.trim())
                    .filter(|name| !name.is_empty())
                    .map(String::from),
            );
        }
    }
    names
}
