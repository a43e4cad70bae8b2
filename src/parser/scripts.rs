//! Regex based scanning of scripts and XUL markup

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // require("module") calls, module names restricted to word characters and dashes
    static ref REQUIRE_PATTERN: Regex = Regex::new(
        r#"(?:^|\s)require\(\s*"([\w\-]+)"\s*\)"#
    ).unwrap();

    static ref XML_HTTP_REQUEST_PATTERN: Regex = Regex::new(r"\bXMLHttpRequest\b").unwrap();

    static ref SHUTDOWN_PATTERN: Regex = Regex::new(r"(?:^|\s)onShutdown\.").unwrap();

    static ref WINDOW_TYPE_PATTERN: Regex = Regex::new(
        r#"<(?:window|dialog)\s[^>]*\bwindowtype="([^">]+)""#
    ).unwrap();
}

/// What a single script asks of the bootstrap code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptScan {
    /// Required module names, in order of appearance
    pub requires: Vec<String>,
    pub uses_xml_http_request: bool,
    pub registers_shutdown_handler: bool,
}

impl ScriptScan {
    pub fn scan(content: &str) -> Self {
        Self {
            requires: REQUIRE_PATTERN
                .captures_iter(content)
                .map(|caps| caps[1].to_string())
                .collect(),
            uses_xml_http_request: XML_HTTP_REQUEST_PATTERN.is_match(content),
            registers_shutdown_handler: SHUTDOWN_PATTERN.is_match(content),
        }
    }
}

/// The `windowtype` declared by the root `<window>` or `<dialog>` of a XUL file.
pub fn find_window_type(content: &str) -> Option<String> {
    WINDOW_TYPE_PATTERN
        .captures(content)
        .map(|caps| caps[1].to_string())
}
