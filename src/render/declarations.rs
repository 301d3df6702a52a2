//! TypeScript declaration renderer.
//!
//! Output order is fixed: aliases, enums, interfaces, then the optional
//! global binding and module export.
//!
//! A dotted class name such as `ui.Button` is declared as `Button` inside
//! `declare namespace ui { ... }`; references to it keep the qualified name.

use crate::classify::is_enum_like;
use crate::config::ModuleConfig;
use crate::error::TranslateError;
use crate::model::*;
use crate::render::Renderer;
use crate::types::function::parse_function_type;
use crate::types::{scan, translate_alias, translate_type};
use std::collections::HashSet;
use std::fmt::Write;

pub struct DeclarationRenderer;

const INDENT: &str = "    ";

/// Words that cannot appear as bare member names.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
];

impl Renderer for DeclarationRenderer {
    fn render(&self, result: &ParseResult, config: &ModuleConfig) -> Result<String, TranslateError> {
        emit(result, config)
    }

    fn file_extension(&self) -> &str {
        "d.ts"
    }
}

/// Render one declaration unit.
pub fn emit(result: &ParseResult, config: &ModuleConfig) -> Result<String, TranslateError> {
    let classes: Vec<&ParsedClass> = result
        .classes
        .values()
        .filter(|class| config.includes_class(&class.name))
        .collect();
    let (enums, interfaces): (Vec<&ParsedClass>, Vec<&ParsedClass>) =
        classes.iter().copied().partition(|class| is_enum_like(class));
    let enum_names: HashSet<&str> = enums.iter().map(|class| class.name.as_str()).collect();
    let export = resolve_export(result, config, &classes)?;

    let mut out = String::new();
    writeln!(
        out,
        "// Generated by luadts from {}. Do not edit.\n",
        config.source.display()
    )?;

    for alias in result.aliases.values() {
        writeln!(
            out,
            "type {} = {};\n",
            alias.name,
            translate_alias(&alias.raw_type_expression)
        )?;
    }

    for class in &enums {
        write_scoped(&mut out, &class.name, |out, local, ambient| {
            write_enum(out, class, local, ambient)
        })?;
    }

    for class in &interfaces {
        write_scoped(&mut out, &class.name, |out, local, _| {
            write_interface(out, class, local, &enum_names)
        })?;
    }

    if let Some(name) = export {
        let ty = value_type(name, &enum_names);
        let (_, local) = split_namespace(name);
        if config.declares_global() {
            writeln!(out, "declare global {{\n{}var {}: {};\n}}\n", INDENT, local, ty)?;
        }
        if enum_names.contains(name) {
            writeln!(out, "export default {};", name)?;
        } else {
            writeln!(out, "declare const {}: {};", local, ty)?;
            writeln!(out, "export default {};", local)?;
        }
    }

    Ok(out)
}

/// Configured export first, then a `@type` naming an emitted class.
fn resolve_export<'a>(
    result: &'a ParseResult,
    config: &'a ModuleConfig,
    emitted: &[&ParsedClass],
) -> Result<Option<&'a str>, TranslateError> {
    let is_emitted = |name: &str| emitted.iter().any(|class| class.name == name);
    if let Some(name) = config.main_export.as_deref() {
        if is_emitted(name) || result.aliases.contains_key(name) {
            return Ok(Some(name));
        }
        return Err(TranslateError::UnknownExport(name.to_string()));
    }
    Ok(result.usable_detected_export().filter(|&name| is_emitted(name)))
}

/// `ui.Button` → (`Some("ui")`, `Button`)
fn split_namespace(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((namespace, local)) => (Some(namespace), local),
        None => (None, name),
    }
}

/// Write one declaration, wrapped in `declare namespace` when the name is
/// dotted. `write` gets the unqualified name and whether it is already
/// inside an ambient namespace.
fn write_scoped<F>(out: &mut String, name: &str, write: F) -> Result<(), TranslateError>
where
    F: FnOnce(&mut String, &str, bool) -> Result<(), TranslateError>,
{
    let (Some(namespace), local) = split_namespace(name) else {
        return write(out, name, false);
    };
    let mut body = String::new();
    write(&mut body, local, true)?;
    writeln!(out, "declare namespace {} {{", namespace)?;
    for line in body.trim_end().lines() {
        if line.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "{}{}", INDENT, line)?;
        }
    }
    writeln!(out, "}}\n")?;
    Ok(())
}

fn write_enum(
    out: &mut String,
    class: &ParsedClass,
    local: &str,
    ambient: bool,
) -> Result<(), TranslateError> {
    let keyword = if ambient { "enum" } else { "declare enum" };
    writeln!(out, "{} {} {{", keyword, local)?;
    for field in &class.data_fields {
        if let Some(desc) = &field.description {
            write_doc(out, desc)?;
        }
        writeln!(out, "{}{},", INDENT, member_name(&field.name))?;
    }
    writeln!(out, "}}\n")?;
    Ok(())
}

fn write_interface(
    out: &mut String,
    class: &ParsedClass,
    local: &str,
    enum_names: &HashSet<&str>,
) -> Result<(), TranslateError> {
    if class.parents.is_empty() {
        writeln!(out, "interface {} {{", local)?;
    } else {
        writeln!(
            out,
            "interface {} extends {} {{",
            local,
            class.parents.join(", ")
        )?;
    }

    for index in &class.index_signatures {
        writeln!(
            out,
            "{}[key: {}]: {};",
            INDENT,
            translate_type(&index.key_type),
            translate_type(&index.value_type)
        )?;
    }

    for field in &class.data_fields {
        if let Some(desc) = &field.description {
            write_doc(out, desc)?;
        }
        let ty = value_type(&translate_type(&field.type_expression), enum_names);
        let mark = if field.optional { "?" } else { "" };
        writeln!(out, "{}{}{}: {};", INDENT, member_name(&field.name), mark, ty)?;
    }

    for field in &class.fields {
        if let Some(desc) = &field.description {
            write_doc(out, desc)?;
        }
        if field.is_method {
            let sig = parse_function_type(&field.type_expression);
            writeln!(
                out,
                "{}{}({}): {};",
                INDENT,
                member_name(&field.name),
                sig.parameter_list(),
                sig.returns
            )?;
        } else {
            writeln!(
                out,
                "{}{}: {};",
                INDENT,
                member_name(&field.name),
                translate_type(&field.type_expression)
            )?;
        }
    }

    writeln!(out, "}}\n")?;
    Ok(())
}

/// A value whose type is an enum is the enum object itself, also as one
/// member of a union.
fn value_type(ty: &str, enum_names: &HashSet<&str>) -> String {
    let members = scan::split_top_level(ty, '|');
    if !members.iter().any(|m| enum_names.contains(m)) {
        return ty.to_string();
    }
    members
        .iter()
        .map(|m| {
            if enum_names.contains(m) {
                format!("typeof {}", m)
            } else {
                m.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Quote member names that are reserved words or not identifiers.
fn member_name(name: &str) -> String {
    let is_identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if is_identifier && !RESERVED.contains(&name) {
        name.to_string()
    } else {
        format!("{:?}", name)
    }
}

/// JSDoc block at member indentation.
fn write_doc(out: &mut String, text: &str) -> Result<(), TranslateError> {
    let text = text.replace("*/", "*\\/");
    let lines: Vec<&str> = text.lines().collect();
    if let [line] = lines.as_slice() {
        writeln!(out, "{}/** {} */", INDENT, line)?;
        return Ok(());
    }
    writeln!(out, "{}/**", INDENT)?;
    for line in lines {
        if line.is_empty() {
            writeln!(out, "{} *", INDENT)?;
        } else {
            writeln!(out, "{} * {}", INDENT, line)?;
        }
    }
    writeln!(out, "{} */", INDENT)?;
    Ok(())
}
