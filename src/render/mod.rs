//! Renderer module with trait-based format dispatch.

pub mod declarations;
pub mod json;

use crate::config::ModuleConfig;
use crate::error::TranslateError;
use crate::model::ParseResult;

/// Trait for rendering a ParseResult into a specific output format.
pub trait Renderer {
    fn render(&self, result: &ParseResult, config: &ModuleConfig) -> Result<String, TranslateError>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>, TranslateError> {
    match format {
        "dts" | "d.ts" | "typescript" => Ok(Box::new(declarations::DeclarationRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(TranslateError::UnknownFormat(format.to_string())),
    }
}
