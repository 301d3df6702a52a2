//! `@` directive recognition for a single doc-comment body.
//!
//! Returns `None` for unknown keywords and for directives missing a required
//! operand; callers treat that as "no effect".

use crate::types::function::clean_return;
use crate::types::scan::{self, matching_close, split_type_prefix};

/// One recognised directive, borrowing from the line it came from.
#[derive(Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    Class {
        name: &'a str,
        parents: Vec<&'a str>,
    },
    Alias {
        name: &'a str,
        body: &'a str,
    },
    Type {
        name: &'a str,
    },
    Param {
        name: &'a str,
        optional: bool,
        ty: &'a str,
        description: Option<&'a str>,
    },
    Return {
        ty: &'a str,
        description: Option<&'a str>,
    },
    Index {
        key: &'a str,
        value: &'a str,
    },
    Field {
        name: &'a str,
        optional: bool,
        ty: &'a str,
        description: Option<&'a str>,
    },
}

/// Visibility words LuaCATS allows in front of a `@field` name.
const FIELD_SCOPES: &[&str] = &["private", "protected", "public", "package"];

/// Parse a doc-comment body that starts with `@`.
pub fn parse_directive(body: &str) -> Option<Directive<'_>> {
    let body = body.strip_prefix('@')?;
    let (keyword, rest) = split_word(body);
    match keyword {
        "class" => parse_class(rest),
        "alias" => {
            let (name, body) = split_word(rest);
            is_name(name).then_some(Directive::Alias { name, body })
        }
        "type" => {
            let (name, _) = split_word(rest);
            is_name(name).then_some(Directive::Type { name })
        }
        "param" => {
            let (name, rest) = split_word(rest);
            let (name, optional) = strip_optional(name);
            let (ty, description) = split_type_prefix(rest);
            (!name.is_empty() && !ty.is_empty()).then_some(Directive::Param {
                name,
                optional,
                ty,
                description,
            })
        }
        "return" => {
            let (ty, description) = split_type_prefix(rest);
            let ty = clean_return(ty);
            (!ty.is_empty()).then_some(Directive::Return { ty, description })
        }
        "field" => parse_field(rest),
        _ => None,
    }
}

fn parse_class(rest: &str) -> Option<Directive<'_>> {
    // `@class (exact) Name`
    let rest = match rest.strip_prefix('(') {
        Some(attr) => attr.split_once(')')?.1.trim_start(),
        None => rest,
    };
    let (head, parents) = match rest.split_once(':') {
        Some((head, parents)) => (head, Some(parents)),
        None => (rest, None),
    };
    let (name, _) = split_word(head);
    let name = strip_generics(name);
    if !is_name(name) {
        return None;
    }
    let parents = parents
        .map(|p| {
            scan::split_top_level(p, ',')
                .into_iter()
                .filter_map(|parent| parent.split_whitespace().next())
                .map(strip_generics)
                .filter(|parent| is_name(parent))
                .collect()
        })
        .unwrap_or_default();
    Some(Directive::Class { name, parents })
}

fn parse_field(rest: &str) -> Option<Directive<'_>> {
    let rest = match split_word(rest) {
        (scope, after) if FIELD_SCOPES.contains(&scope) => after,
        _ => rest,
    };

    if rest.starts_with('[') {
        let close = matching_close(rest, 0)?;
        let key = rest[1..close].trim();
        let (value, _) = split_type_prefix(&rest[close + 1..]);
        return (!key.is_empty() && !value.is_empty()).then_some(Directive::Index { key, value });
    }

    let (name, rest) = split_word(rest);
    let (name, optional) = strip_optional(name);
    let (ty, description) = split_type_prefix(rest);
    (!name.is_empty() && !ty.is_empty()).then_some(Directive::Field {
        name,
        optional,
        ty,
        description,
    })
}

/// First whitespace-delimited word and the trimmed remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(at) => (&s[..at], s[at..].trim_start()),
        None => (s, ""),
    }
}

/// `List<T>` → `List`
fn strip_generics(name: &str) -> &str {
    name.split_once('<').map_or(name, |(base, _)| base)
}

fn strip_optional(name: &str) -> (&str, bool) {
    match name.strip_suffix('?') {
        Some(name) => (name, true),
        None => (name, false),
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}
