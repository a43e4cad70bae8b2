//! Fatal packaging errors
//!
//! Anything in here aborts the build before an archive is written.
//! Recoverable problems are reported as [`crate::models::Warning`]s instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackagerError {
    #[error("cannot preprocess {0}: file is not part of the package")]
    MissingTemplateTarget(String),

    #[error("failed to render template {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("option {key} missing from metadata section [{section}]")]
    MissingMetadata { section: String, key: String },

    #[error("invalid locale {0:?} requested")]
    InvalidLocaleSelection(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

impl From<openssl::error::ErrorStack> for PackagerError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        PackagerError::Signing(err.to_string())
    }
}
