//! LuaCATS type expressions → TypeScript type syntax.
//!
//! [`translate_type`] knows nothing about classes or files. Rules are tried in
//! a fixed order and the first match wins; anything unrecognised passes
//! through unchanged.

pub mod function;
pub mod scan;

use function::parse_function_type;

/// TypeScript spelling of a Lua multiple-return position.
pub const MULTI_RETURN: &str = "LuaMultiReturn";

/// Translate one LuaCATS type expression.
pub fn translate_type(expr: &str) -> String {
    let expr = strip_inline_comment(expr).trim();

    if expr.is_empty() || expr == "nil" {
        return "void".to_string();
    }

    if let Some(rest) = strip_nil_suffix(expr) {
        return nullable(&translate_type(rest));
    }

    if let Some(primitive) = primitive(expr) {
        return primitive.to_string();
    }

    if let Some(prefix) = expr.strip_suffix('?') {
        if !expr.contains('|') {
            return nullable(&translate_type(prefix));
        }
    }

    let alternatives = scan::split_top_level(expr, '|');
    if alternatives.len() >= 2 {
        let mut members: Vec<String> = Vec::new();
        for alt in alternatives {
            let translated = translate_type(alt);
            if !members.contains(&translated) {
                members.push(translated);
            }
        }
        return members.join(" | ");
    }

    if scan::is_wrapped(expr, '(', ')') {
        let parts = scan::split_top_level(&expr[1..expr.len() - 1], ',');
        return match parts.as_slice() {
            [single] => translate_type(single),
            [] => translate_type(""),
            _ => multi_return(&parts),
        };
    }

    if let Some(element) = expr.strip_suffix("[]") {
        return array_of(&translate_type(element));
    }

    if let Some(record) = translate_table_generic(expr) {
        return record;
    }

    if is_function_type(expr) {
        return parse_function_type(expr).to_string();
    }

    expr.to_string()
}

/// Translate the body of an `@alias`.
///
/// Object literals become structural types and unions holding function types
/// get their function alternatives parenthesized; everything else goes
/// through [`translate_type`].
pub fn translate_alias(body: &str) -> String {
    let body = strip_inline_comment(body).trim();

    if scan::is_wrapped(body, '{', '}') {
        let inner = body[1..body.len() - 1].trim();
        let members: Vec<String> = scan::split_top_level(inner, ',')
            .into_iter()
            .filter_map(|part| {
                let (name, ty) = part.split_once(':')?;
                Some(format!("{}: {}", name.trim(), translate_type(ty)))
            })
            .collect();
        if members.is_empty() {
            return "{}".to_string();
        }
        return format!("{{ {} }}", members.join("; "));
    }

    let alternatives = scan::split_top_level(body, '|');
    if alternatives.len() >= 2 && alternatives.iter().any(|alt| is_function_type(alt)) {
        return alternatives
            .iter()
            .map(|alt| {
                let translated = translate_type(alt);
                if is_function_type(alt) {
                    format!("({})", translated)
                } else {
                    translated
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");
    }

    translate_type(body)
}

/// Whether `expr` starts with the `fun(` / `fun ` marker.
pub fn is_function_type(expr: &str) -> bool {
    let expr = expr.trim_start();
    expr.starts_with("fun(") || expr.starts_with("fun ")
}

/// `LuaMultiReturn<[A, B]>` from untranslated parts.
pub fn multi_return(parts: &[&str]) -> String {
    let translated: Vec<String> = parts.iter().map(|p| translate_type(p)).collect();
    format!("{}<[{}]>", MULTI_RETURN, translated.join(", "))
}

/// `T | undefined`, without stacking a second `undefined`.
pub fn nullable(translated: &str) -> String {
    if translated == "undefined" || translated.ends_with("| undefined") {
        translated.to_string()
    } else {
        format!("{} | undefined", translated)
    }
}

/// `T[]`, parenthesizing `T` when it is a union.
pub fn array_of(translated: &str) -> String {
    if scan::has_top_level_union(translated) {
        format!("({})[]", translated)
    } else {
        format!("{}[]", translated)
    }
}

/// Cut a trailing ` -- comment` or `  # comment`.
pub fn strip_inline_comment(expr: &str) -> &str {
    let cut = [expr.find(" --"), expr.find("  #")]
        .into_iter()
        .flatten()
        .min();
    match cut {
        Some(at) => &expr[..at],
        None => expr,
    }
}

fn strip_nil_suffix(expr: &str) -> Option<&str> {
    expr.strip_suffix("| nil")
        .or_else(|| expr.strip_suffix("|nil"))
        .map(str::trim)
}

fn primitive(expr: &str) -> Option<&'static str> {
    Some(match expr {
        "number" | "integer" => "number",
        "string" => "string",
        "boolean" => "boolean",
        "any" => "any",
        "userdata" => "unknown",
        "table" => "object",
        "function" => "Function",
        _ => return None,
    })
}

/// `table<K, V>` → `Record<K, V>`.
fn translate_table_generic(expr: &str) -> Option<String> {
    const OPEN: &str = "table<";
    if !expr.starts_with(OPEN) || scan::matching_close(expr, OPEN.len() - 1) != Some(expr.len() - 1) {
        return None;
    }
    match scan::split_top_level(&expr[OPEN.len()..expr.len() - 1], ',').as_slice() {
        [key, value] => Some(format!(
            "Record<{}, {}>",
            translate_type(key),
            translate_type(value)
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives() {
        assert_eq!(translate_type("number"), "number");
        assert_eq!(translate_type("integer"), "number");
        assert_eq!(translate_type("string"), "string");
        assert_eq!(translate_type("any"), "any");
        assert_eq!(translate_type("userdata"), "unknown");
        assert_eq!(translate_type("table"), "object");
        assert_eq!(translate_type("function"), "Function");
    }

    #[test]
    fn no_value() {
        assert_eq!(translate_type(""), "void");
        assert_eq!(translate_type("nil"), "void");
        assert_eq!(translate_type("()"), "void");
    }

    #[test]
    fn nil_suffix_is_nullable() {
        assert_eq!(translate_type("string | nil"), "string | undefined");
        assert_eq!(translate_type("string|nil"), "string | undefined");
        assert_eq!(translate_type("string|number|nil"), "string | number | undefined");
    }

    #[test]
    fn question_mark_is_optional() {
        assert_eq!(translate_type("Vector?"), "Vector | undefined");
        assert_eq!(translate_type("integer?"), "number | undefined");
    }

    #[test]
    fn union_deduplicates() {
        assert_eq!(translate_type("number|number"), "number");
        assert_eq!(translate_type("integer | number | string"), "number | string");
    }

    #[test]
    fn parenthesized_groups() {
        assert_eq!(translate_type("(string)"), "string");
        assert_eq!(
            translate_type("(number, string)"),
            "LuaMultiReturn<[number, string]>"
        );
    }

    #[test]
    fn arrays() {
        assert_eq!(translate_type("string[]"), "string[]");
        assert_eq!(translate_type("integer[][]"), "number[][]");
        assert_eq!(translate_type("(string|number)[]"), "(string | number)[]");
    }

    #[test]
    fn table_generic() {
        assert_eq!(translate_type("table<string, number>"), "Record<string, number>");
        assert_eq!(
            translate_type("table<string, table<integer, boolean>>"),
            "Record<string, Record<number, boolean>>"
        );
    }

    #[test]
    fn passthrough() {
        assert_eq!(translate_type("Vector"), "Vector");
        assert_eq!(translate_type("\"left\""), "\"left\"");
    }

    #[test]
    fn inline_comments_are_dropped() {
        assert_eq!(translate_type("number -- pixels"), "number");
        assert_eq!(translate_type("string  # label"), "string");
    }

    #[test]
    fn union_split_after_function_group() {
        assert_eq!(
            translate_type("fun(x: table<string,number>): boolean|nil"),
            "(this: void, x: Record<string, number>) => boolean | undefined"
        );
        assert_eq!(
            translate_type("fun(x: number): boolean|string"),
            "(this: void, x: number) => boolean | string"
        );
    }

    #[test]
    fn alias_object_literal() {
        assert_eq!(
            translate_alias("{ x: number, y: integer?, tags: string[] }"),
            "{ x: number; y: number | undefined; tags: string[] }"
        );
        assert_eq!(translate_alias("{}"), "{}");
    }

    #[test]
    fn alias_union_parenthesizes_functions() {
        assert_eq!(
            translate_alias("string | fun(): boolean"),
            "string | ((this: void) => boolean)"
        );
        assert_eq!(translate_alias("\"a\" | \"b\""), "\"a\" | \"b\"");
    }
}
