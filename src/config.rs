//! Per-module configuration.

use crate::error::PatternError;
use crate::postprocess::Patch;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

/// How one annotated Lua file becomes one declaration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    /// Logical module name; also the output file stem.
    pub name: String,
    /// Annotated Lua source, relative to the registry file.
    pub source: PathBuf,
    /// Export name that overrides any `@type` in the source.
    #[serde(default)]
    pub main_export: Option<String>,
    /// Allow-list of class names; `None` keeps every class.
    #[serde(default)]
    pub filter_classes: Option<Vec<ClassPattern>>,
    /// Also declare the export as a global variable.
    #[serde(default)]
    pub declare_global_var: Option<bool>,
    /// Corrective patches for this module's output.
    #[serde(default)]
    pub patch: Option<Patch>,
}

impl ModuleConfig {
    /// A config with every option at its default.
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Whether the allow-list keeps `class`.
    pub fn includes_class(&self, class: &str) -> bool {
        self.filter_classes
            .as_ref()
            .is_none_or(|patterns| patterns.iter().any(|p| p.matches(class)))
    }

    pub fn declares_global(&self) -> bool {
        self.declare_global_var.unwrap_or(false)
    }
}

/// An exact class name, or a prefix followed by a trailing `*`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ClassPattern {
    Exact(String),
    Prefix(String),
}

impl ClassPattern {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ClassPattern::Exact(exact) => name == exact,
            ClassPattern::Prefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

impl FromStr for ClassPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix('*') {
            Some(prefix) if !prefix.contains('*') => Ok(ClassPattern::Prefix(prefix.to_string())),
            None if !s.is_empty() && !s.contains('*') => Ok(ClassPattern::Exact(s.to_string())),
            _ => Err(PatternError(s.to_string())),
        }
    }
}

impl TryFrom<String> for ClassPattern {
    type Error = PatternError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_prefix_patterns() {
        let exact: ClassPattern = "Body".parse().unwrap();
        let prefix: ClassPattern = "physics*".parse().unwrap();
        assert!(exact.matches("Body"));
        assert!(!exact.matches("BodyDef"));
        assert!(prefix.matches("physics"));
        assert!(prefix.matches("physics.World"));
        assert!(!prefix.matches("Physics"));
    }

    #[test]
    fn inner_wildcards_are_rejected() {
        assert!("a*b".parse::<ClassPattern>().is_err());
        assert!("**".parse::<ClassPattern>().is_err());
        assert!("".parse::<ClassPattern>().is_err());
        assert!("*Body".parse::<ClassPattern>().is_err());
        let err = "ui*Button".parse::<ClassPattern>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid class pattern `ui*Button`: `*` is only allowed at the end"
        );
    }

    #[test]
    fn no_filter_keeps_everything() {
        let config = ModuleConfig::new("m", "m.lua");
        assert!(config.includes_class("Anything"));
        let config = ModuleConfig {
            filter_classes: Some(vec![ClassPattern::Exact("Keep".to_string())]),
            ..config
        };
        assert!(config.includes_class("Keep"));
        assert!(!config.includes_class("Drop"));
    }
}
