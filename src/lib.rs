//! luadts: TypeScript declarations from LuaCATS-annotated Lua sources.
//!
//! The pipeline for one module is parse → emit → patch:
//!
//! - [`parser::parse`] folds the source into a [`model::ParseResult`]
//! - [`render::declarations::emit`] turns that into declaration text,
//!   translating type expressions through [`types::translate_type`]
//! - [`postprocess::Patch`] fixes known translation losses
//!
//! [`translate`] runs all three for a [`config::ModuleConfig`];
//! [`registry::Registry`] holds the configured modules.

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod postprocess;
pub mod registry;
pub mod render;
pub mod types;

use config::ModuleConfig;
use error::TranslateError;
use tracing::trace;

/// Outcome of translating one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Declaration text, patched.
    Declarations(String),
    /// The source declares no classes; nothing was written.
    Skipped(String),
}

/// Translate one annotated source into declaration text.
pub fn translate(source: &str, config: &ModuleConfig) -> Result<Translation, TranslateError> {
    let result = parser::parse(source);
    trace!(
        module = %config.name,
        classes = result.classes.len(),
        aliases = result.aliases.len(),
        "parsed"
    );

    if result.classes.is_empty() {
        return Ok(Translation::Skipped(format!(
            "{} declares no classes",
            config.source.display()
        )));
    }

    let text = render::declarations::emit(&result, config)?;
    Ok(Translation::Declarations(match config.patch {
        Some(patch) => patch.apply(&text),
        None => text,
    }))
}
