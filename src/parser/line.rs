//! Line tokenizer. Classifies each source line before the fold sees it.

use regex::Regex;
use std::sync::LazyLock;

// `function Class.method(a, b)` / `function Class:method(a, b)`
static RE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^function\s+([A-Za-z_][\w.]*)([.:])([A-Za-z_]\w*)\s*\(([^)]*)\)").unwrap()
});

// `_G.name = ...`, `_ENV["name"] = ...`
static RE_GLOBAL_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^_(?:G|ENV)(?:\.[\w.]+|\[[^\]]*\])\s*=").unwrap()
});

// `Outer.Inner = {}`; a table with content is plain code
static RE_NESTED_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][\w.]*)\.([A-Za-z_]\w*)\s*=\s*\{\s*\}\s*;?\s*(?:--.*)?$").unwrap()
});

// `local name = ...` / `name = ...`
static RE_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:local\s+)?([A-Za-z_]\w*)\s*=").unwrap());

/// One classified source line.
#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    /// `--- body`, with the marker and surrounding whitespace removed.
    Doc(&'a str),
    /// `-- text`, or a `----` rule.
    Comment,
    GlobalAssign,
    Function(FunctionDecl<'a>),
    NestedTable { outer: &'a str, inner: &'a str },
    /// Plain assignment to a bare name; may bind a table to the last `@class`.
    Assign { target: &'a str },
    Code,
}

/// `function Class.method(params)` or `function Class:method(params)`.
#[derive(Debug, PartialEq, Eq)]
pub struct FunctionDecl<'a> {
    pub class: &'a str,
    pub method: &'a str,
    /// Colon form: an implicit `self` receiver.
    pub colon: bool,
    pub params: Vec<&'a str>,
}

pub fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }

    if let Some(body) = trimmed.strip_prefix("---") {
        if body.starts_with('-') {
            return Line::Comment;
        }
        return Line::Doc(body.trim());
    }
    if trimmed.starts_with("--") {
        return Line::Comment;
    }

    if RE_GLOBAL_ASSIGN.is_match(trimmed) {
        return Line::GlobalAssign;
    }

    if let Some(caps) = RE_FUNCTION.captures(trimmed) {
        let group = |i| caps.get(i).map_or("", |m| m.as_str());
        let params = group(4)
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        return Line::Function(FunctionDecl {
            class: group(1),
            method: group(3),
            colon: group(2) == ":",
            params,
        });
    }

    if let Some(caps) = RE_NESTED_TABLE.captures(trimmed) {
        if let (Some(outer), Some(inner)) = (caps.get(1), caps.get(2)) {
            return Line::NestedTable {
                outer: outer.as_str(),
                inner: inner.as_str(),
            };
        }
    }

    if let Some(target) = RE_ASSIGN.captures(trimmed).and_then(|c| c.get(1)) {
        return Line::Assign {
            target: target.as_str(),
        };
    }

    Line::Code
}
