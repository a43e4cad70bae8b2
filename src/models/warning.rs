//! Non-fatal build diagnostics

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Same archive path ingested twice, the first content is kept
    Conflict,
    /// Mapped file source does not exist
    MissingSource,
    /// Locale catalog could not be parsed, reconciliation skipped
    MalformedCatalog,
    UnrecognizedCatalogLine,
    UnrecognizedContributor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub location: Option<String>,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.message, location),
            None => write!(f, "{}", self.message),
        }
    }
}
