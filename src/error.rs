//! Error types for translation and registry loading.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to translate one module. "Nothing to translate" is not an error;
/// see [`crate::Translation::Skipped`].
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("main export `{0}` names no emitted class or alias")]
    UnknownExport(String),

    #[error("unknown format: {0}. Use dts or json")]
    UnknownFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Failure to load a module registry manifest.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate module name `{0}`")]
    DuplicateModule(String),
}

/// A class filter pattern with a `*` anywhere but the end, or an empty one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid class pattern `{0}`: `*` is only allowed at the end")]
pub struct PatternError(pub String);
