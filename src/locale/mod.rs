//! Locale handling: discovery, `{{LOCALE}}` expansion, message bundle import
//! and reconciliation of locale catalogs against the default locale.

pub mod discovery;
pub mod import;
pub mod macros;
pub mod reconcile;

pub use discovery::{get_locales, is_locale_name, is_valid_locale};
pub use import::import_locales;
pub use macros::LocaleMacro;
pub use reconcile::{fixup_locales, ReferenceCatalogs};

/// Archive directory holding one subdirectory per locale.
pub const LOCALE_ROOT: &str = "chrome/locale";

/// Archive path of a catalog file for `locale`.
pub fn locale_path(locale: &str, file: &str) -> String {
    format!("{}/{}/{}", LOCALE_ROOT, locale, file)
}
