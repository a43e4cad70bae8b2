//! Classification of package files by extension

/// What the packager needs to know about a file, decided once from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `chrome.manifest` style registration file, subject to `{{LOCALE}}` expansion
    ChromeManifest,
    Script,
    Xul,
    /// HTML or XML, rendered with auto-escaping
    Markup,
    Other,
}

impl FileKind {
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        let ext = match name.rfind('.') {
            Some(idx) if idx > 0 => name[idx + 1..].to_ascii_lowercase(),
            _ => return FileKind::Other,
        };
        match ext.as_str() {
            "manifest" => FileKind::ChromeManifest,
            "js" => FileKind::Script,
            "xul" => FileKind::Xul,
            "html" | "xml" => FileKind::Markup,
            _ => FileKind::Other,
        }
    }

    pub fn auto_escape(self) -> bool {
        self == FileKind::Markup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("chrome.manifest", FileKind::ChromeManifest)]
    #[test_case("lib/main.js", FileKind::Script)]
    #[test_case("chrome/content/overlay.xul", FileKind::Xul)]
    #[test_case("chrome/content/options.HTML", FileKind::Markup)]
    #[test_case("install.xml", FileKind::Markup)]
    #[test_case("icon.png", FileKind::Other)]
    #[test_case(".manifest", FileKind::Other)]
    #[test_case("README", FileKind::Other)]
    fn test_classify(path: &str, expected: FileKind) {
        assert_eq!(FileKind::from_path(path), expected);
    }

    #[test]
    fn test_auto_escape_only_for_markup() {
        assert!(FileKind::Markup.auto_escape());
        assert!(!FileKind::Script.auto_escape());
    }
}
