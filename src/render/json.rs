//! JSON renderer: the parsed model, for debugging annotations.
//!
//! Type expressions are left in LuaCATS syntax; nothing is translated.

use crate::config::ModuleConfig;
use crate::error::TranslateError;
use crate::model::ParseResult;
use crate::render::Renderer;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, result: &ParseResult, _config: &ModuleConfig) -> Result<String, TranslateError> {
        let mut out = serde_json::to_string_pretty(result)?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
