//! Helper utility functions

use std::path::Path;

/// Slash separated archive path of `path` relative to `base_dir`.
pub fn archive_path(path: &Path, base_dir: &Path) -> String {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Output file name used when none is given, e.g. `adblockplus-2.6.0.42.xpi`.
pub fn default_file_name(basename: &str, version: &str, ext: &str) -> String {
    format!("{}-{}.{}", basename, version, ext)
}
