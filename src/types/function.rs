//! `fun(...)` signatures.
//!
//! A parameter named `self` becomes the receiver; every rendered signature
//! states its `this` binding explicitly, falling back to `this: void`.

use super::scan;
use super::{array_of, multi_return, strip_inline_comment, translate_type};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Space followed by a capitalized word and another word: the usual start of
/// prose glued onto a return type (`number The width`).
static RE_PROSE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" [A-Z][A-Za-z']*\s+[A-Za-z]").unwrap());

/// A trailing lowercase bare word, e.g. the `count` in `integer count`.
static RE_TRAILING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s|,:])\s+([a-z_][a-z0-9_]*)$").unwrap());

/// Two words separated by whitespace, left over after cleanup.
static RE_UNRESOLVED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w\s+\w").unwrap());

/// Words that are types in their own right and never trimmed as prose.
const TYPE_KEYWORDS: &[&str] = &[
    "any", "boolean", "function", "integer", "lightuserdata", "nil", "number", "self", "string",
    "table", "thread", "unknown", "userdata",
];

/// A parsed, translated function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    /// Translated type of the `self` parameter; `None` renders as `this: void`.
    pub receiver: Option<String>,
    pub params: Vec<Param>,
    /// Translated return type.
    pub returns: String,
}

/// One positional parameter, type already translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: String,
    pub optional: bool,
    /// `...name: T`; `ty` is the element type.
    pub variadic: bool,
}

impl FunctionType {
    /// The parameter list without parentheses, receiver first:
    /// `this: void, x: number`.
    pub fn parameter_list(&self) -> String {
        let receiver = format!("this: {}", self.receiver.as_deref().unwrap_or("void"));
        std::iter::once(receiver)
            .chain(self.params.iter().map(Param::to_string))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) => {}", self.parameter_list(), self.returns)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            let element = if self.ty.contains("=>") {
                format!("({})[]", self.ty)
            } else {
                array_of(&self.ty)
            };
            return write!(f, "...{}: {}", self.name, element);
        }
        let mark = if self.optional { "?" } else { "" };
        write!(f, "{}{}: {}", self.name, mark, self.ty)
    }
}

/// Parse a `fun(...)` expression. Malformed input degrades rather than fails:
/// an unclosed parameter list takes the rest of the text as parameters.
pub fn parse_function_type(expr: &str) -> FunctionType {
    let expr = expr.trim();
    let rest = expr.strip_prefix("fun").unwrap_or(expr).trim_start();

    let (params_src, tail) = if rest.starts_with('(') {
        match scan::matching_close(rest, 0) {
            Some(close) => (&rest[1..close], &rest[close + 1..]),
            None => (&rest[1..], ""),
        }
    } else {
        ("", rest)
    };

    let mut receiver = None;
    let mut params = Vec::new();
    for raw in scan::split_top_level(params_src, ',') {
        let param = parse_param(raw);
        if param.name == "self" && !param.variadic && receiver.is_none() {
            receiver = Some(param.ty);
        } else {
            params.push(param);
        }
    }

    let returns = match tail.trim_start().strip_prefix(':') {
        Some(clause) => translate_return(clause),
        None => translate_type(""),
    };

    FunctionType {
        receiver,
        params,
        returns,
    }
}

fn parse_param(raw: &str) -> Param {
    let (name, ty) = match raw.split_once(':') {
        Some((name, ty)) => (name.trim(), translate_type(ty)),
        None => (raw.trim(), "any".to_string()),
    };

    if let Some(rest) = name.strip_prefix("...") {
        return Param {
            name: if rest.is_empty() { "args" } else { rest }.to_string(),
            ty,
            optional: false,
            variadic: true,
        };
    }

    match name.strip_suffix('?') {
        Some(name) => Param {
            name: name.to_string(),
            ty,
            optional: true,
            variadic: false,
        },
        None => Param {
            name: name.to_string(),
            ty,
            optional: false,
            variadic: false,
        },
    }
}

/// Strip prose from a return clause, the same heuristic used for `@return`.
pub fn clean_return(clause: &str) -> &str {
    let mut text = strip_inline_comment(clause).trim();
    if let Some(m) = RE_PROSE_START.find(text) {
        text = text[..m.start()].trim_end();
    }
    if let Some(caps) = RE_TRAILING_WORD.captures(text) {
        let word = &caps[2];
        if !TYPE_KEYWORDS.contains(&word) {
            if let Some(m) = caps.get(1) {
                text = &text[..m.end()];
            }
        }
    }
    text
}

/// Translate a return clause, producing a multi-return for `A, B`.
///
/// Text that still reads like prose after [`clean_return`] becomes `any`.
pub fn translate_return(clause: &str) -> String {
    let text = clean_return(clause);
    let parts = scan::split_top_level(text, ',');
    if parts.len() >= 2 {
        return multi_return(&parts);
    }
    if RE_UNRESOLVED.is_match(text) {
        return "any".to_string();
    }
    translate_type(text)
}
