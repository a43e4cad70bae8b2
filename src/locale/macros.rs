//! `{{LOCALE}}` expansion in chrome manifests
//!
//! A manifest line mentioning `{{LOCALE}}` twice, such as
//! `locale abp {{LOCALE}} chrome/locale/{{LOCALE}}/`, is replaced by one line
//! per packaged locale.

use crate::models::FileKind;
use crate::packager::ValueTransform;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const LOCALE_PLACEHOLDER: &str = "{{LOCALE}}";

lazy_static! {
    static ref LOCALE_LINE: Regex =
        Regex::new(r"(?m)^(.*?)\{\{LOCALE\}\}(.*?)\{\{LOCALE\}\}(.*)$").unwrap();
}

/// Expand every two-placeholder line of `text` once per locale, in order.
pub fn expand_locale_lines(text: &str, locales: &[String]) -> String {
    LOCALE_LINE
        .replace_all(text, |caps: &Captures| {
            locales
                .iter()
                .map(|locale| format!("{}{}{}{}{}", &caps[1], locale, &caps[2], locale, &caps[3]))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .into_owned()
}

/// Value transform applying [`expand_locale_lines`] to chrome manifests.
#[derive(Debug, Clone)]
pub struct LocaleMacro {
    locales: Vec<String>,
}

impl LocaleMacro {
    pub fn new(locales: Vec<String>) -> Self {
        Self { locales }
    }
}

impl ValueTransform for LocaleMacro {
    fn apply(&self, path: &str, data: Vec<u8>) -> Vec<u8> {
        if FileKind::from_path(path) != FileKind::ChromeManifest {
            return data;
        }
        match std::str::from_utf8(&data) {
            Ok(text) if text.contains(LOCALE_PLACEHOLDER) => {
                expand_locale_lines(text, &self.locales).into_bytes()
            }
            _ => data,
        }
    }
}
