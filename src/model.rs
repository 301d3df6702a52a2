//! Data model for parsed annotations. Target-agnostic.
//!
//! Type expressions are kept in LuaCATS source syntax here; translation to
//! TypeScript happens at emission time.

use crate::types::function::parse_function_type;
use indexmap::IndexMap;
use serde::Serialize;

/// Everything extracted from one annotated source unit.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// Classes in declaration order, keyed by name.
    pub classes: IndexMap<String, ParsedClass>,
    /// Aliases in declaration order, keyed by name.
    pub aliases: IndexMap<String, Alias>,
    /// Last `@type` name seen.
    pub detected_main_export: Option<String>,
}

impl ParseResult {
    /// Get the class called `name`, creating an empty one if needed.
    pub fn ensure_class(&mut self, name: &str) -> &mut ParsedClass {
        self.classes
            .entry(name.to_string())
            .or_insert_with(|| ParsedClass::new(name))
    }

    /// The detected export, if it names a class that was actually parsed.
    pub fn usable_detected_export(&self) -> Option<&str> {
        self.detected_main_export
            .as_deref()
            .filter(|name| self.classes.contains_key(*name))
    }
}

/// A `@class` and everything attached to it.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedClass {
    pub name: String,
    /// `@class Name : Parent, Other`
    pub parents: Vec<String>,
    /// Methods and function-valued members
    pub fields: Vec<ParsedField>,
    /// Everything else declared with `@field` or nested-table assignment
    pub data_fields: Vec<ParsedDataField>,
    /// `@field [K] V`
    pub index_signatures: Vec<IndexSignature>,
}

impl ParsedClass {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Insert a method or function-valued member.
    ///
    /// An existing entry with the same name is only replaced when the new one
    /// binds a receiver and the old one does not. Returns whether `field` was
    /// kept.
    pub fn insert_field(&mut self, field: ParsedField) -> bool {
        self.data_fields.retain(|d| d.name != field.name);
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => {
                if field.has_receiver() && !existing.has_receiver() {
                    *existing = field;
                    true
                } else {
                    false
                }
            }
            None => {
                self.fields.push(field);
                true
            }
        }
    }

    /// Insert a data member. Later declarations of the same member win;
    /// a method of the same name blocks the insert. Returns whether `field`
    /// was kept.
    pub fn insert_data_field(&mut self, field: ParsedDataField) -> bool {
        if self.fields.iter().any(|f| f.name == field.name) {
            return false;
        }
        match self.data_fields.iter_mut().find(|d| d.name == field.name) {
            Some(existing) => *existing = field,
            None => self.data_fields.push(field),
        }
        true
    }
}

/// A method (`function C:m()`) or a function-valued `@field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedField {
    pub name: String,
    /// Always a `fun(...)` expression, possibly with a trailing `|nil`.
    pub type_expression: String,
    pub description: Option<String>,
    /// Declared with a `function` line rather than `@field`.
    pub is_method: bool,
}

impl ParsedField {
    /// Whether the signature names a `self` parameter.
    pub fn has_receiver(&self) -> bool {
        parse_function_type(&self.type_expression).receiver.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDataField {
    pub name: String,
    pub type_expression: String,
    pub description: Option<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSignature {
    pub key_type: String,
    pub value_type: String,
}

/// `@alias Name Type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    pub name: String,
    pub raw_type_expression: String,
}
