//! Parsers for metadata, locale catalogs and script sources

pub mod catalog;
pub mod metadata;
pub mod scripts;

pub use catalog::{CatalogError, CatalogFormat, LocaleCatalog};
pub use metadata::{Metadata, MetadataItem};
pub use scripts::ScriptScan;
