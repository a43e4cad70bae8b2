//! Core data models for extension packaging

pub mod config;
pub mod file_kind;
pub mod warning;

pub use config::*;
pub use file_kind::*;
pub use warning::*;
