//! LuaCATS annotation parser: a fold over classified lines.
//!
//! Each line is classified by [`line::classify`], then [`step`] takes the
//! current [`Context`] by value and returns the next one, applying any
//! directive effects to the [`ParseResult`] under construction.
//!
//! Flush rules:
//! - blank lines, plain comments and `_G.x = ...` leave pending state alone
//! - a `function Class.m()` / `function Class:m()` line consumes it
//! - any other code line discards it

pub mod directive;
pub mod line;

use crate::model::*;
use crate::types::is_function_type;
use directive::{parse_directive, Directive};
use line::{FunctionDecl, Line};
use std::collections::HashMap;
use tracing::debug;

/// Parser state between two lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Target of `@field` directives.
    pub current_class: Option<String>,
    pub pending_params: Vec<PendingParam>,
    /// One entry per `@return` line.
    pub pending_returns: Vec<PendingReturn>,
    /// Free-text doc lines since the last flush.
    pub description: Vec<String>,
    /// Alias that `---| value` lines extend.
    open_alias: Option<String>,
    /// Class declared since the last code line; the next `local X = ...` binds `X` to it.
    unbound_class: Option<String>,
    /// Lua table names bound to classes (`---@class Foo` + `local M = {}`).
    bindings: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingParam {
    pub name: String,
    pub type_expression: String,
    pub optional: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReturn {
    pub type_expression: String,
    pub description: Option<String>,
}

impl Context {
    /// Drop pending annotations, keeping the active class and bindings.
    fn flushed(self) -> Self {
        Self {
            current_class: self.current_class,
            bindings: self.bindings,
            ..Self::default()
        }
    }

    /// Class a Lua table name refers to: the name itself when it is a class,
    /// otherwise whatever class it was bound to.
    fn resolve_class<'a>(&'a self, result: &ParseResult, table: &'a str) -> Option<&'a str> {
        if result.classes.contains_key(table) {
            return Some(table);
        }
        self.bindings.get(table).map(String::as_str)
    }
}

impl PendingParam {
    /// Back to `fun(...)` parameter syntax.
    fn to_source(&self) -> String {
        if self.name == "..." {
            return format!("...: {}", self.type_expression);
        }
        let mark = if self.optional { "?" } else { "" };
        format!("{}{}: {}", self.name, mark, self.type_expression)
    }
}

/// Parse one annotated Lua source unit.
pub fn parse(source: &str) -> ParseResult {
    let mut result = ParseResult::default();
    source
        .lines()
        .fold(Context::default(), |ctx, line| step(ctx, line, &mut result));
    result
}

/// Process one line.
pub fn step(ctx: Context, line: &str, result: &mut ParseResult) -> Context {
    match line::classify(line) {
        Line::Doc(body) => doc_line(ctx, body, result),
        Line::Blank | Line::Comment | Line::GlobalAssign => Context {
            open_alias: None,
            ..ctx
        },
        Line::Function(decl) => attach_method(ctx, &decl, result),
        Line::NestedTable { outer, inner } => {
            nest_table(&ctx, outer, inner, result);
            ctx.flushed()
        }
        Line::Assign { target } => {
            let mut ctx = ctx;
            if let Some(class) = ctx.unbound_class.take() {
                if target != class {
                    ctx.bindings.insert(target.to_string(), class);
                }
            }
            ctx.flushed()
        }
        Line::Code => ctx.flushed(),
    }
}

fn doc_line(mut ctx: Context, body: &str, result: &mut ParseResult) -> Context {
    if let Some(variant) = body.strip_prefix('|') {
        if let Some(alias) = ctx.open_alias.as_ref().and_then(|n| result.aliases.get_mut(n)) {
            extend_alias(alias, variant);
            return ctx;
        }
    }

    ctx.open_alias = None;

    if body.starts_with('@') {
        return match parse_directive(body) {
            Some(directive) => apply(ctx, directive, result),
            None => {
                debug!(line = body, "ignoring unrecognised directive");
                if body.split_whitespace().next() == Some("@class") {
                    ctx.current_class = None;
                    ctx.unbound_class = None;
                }
                ctx
            }
        };
    }

    if !body.is_empty() {
        ctx.description.push(body.to_string());
    }
    ctx
}

/// `---| "value" # comment` under an `@alias`.
fn extend_alias(alias: &mut Alias, variant: &str) {
    let variant = variant.trim_start_matches('>');
    let value = match variant.find(" #") {
        Some(at) => &variant[..at],
        None => variant,
    }
    .trim();
    if value.is_empty() {
        return;
    }
    if alias.raw_type_expression.is_empty() {
        alias.raw_type_expression = value.to_string();
    } else {
        alias.raw_type_expression = format!("{} | {}", alias.raw_type_expression, value);
    }
}

fn apply(mut ctx: Context, directive: Directive<'_>, result: &mut ParseResult) -> Context {
    match directive {
        Directive::Class { name, parents } => {
            let class = result.ensure_class(name);
            for parent in parents {
                if !class.parents.iter().any(|p| p == parent) {
                    class.parents.push(parent.to_string());
                }
            }
            ctx.current_class = Some(name.to_string());
            ctx.unbound_class = Some(name.to_string());
        }
        Directive::Alias { name, body } => {
            result.aliases.insert(
                name.to_string(),
                Alias {
                    name: name.to_string(),
                    raw_type_expression: body.to_string(),
                },
            );
            ctx.open_alias = Some(name.to_string());
        }
        Directive::Type { name } => {
            result.detected_main_export = Some(name.to_string());
        }
        Directive::Param {
            name,
            optional,
            ty,
            description,
        } => ctx.pending_params.push(PendingParam {
            name: name.to_string(),
            type_expression: ty.to_string(),
            optional,
            description: description.map(str::to_string),
        }),
        Directive::Return { ty, description } => ctx.pending_returns.push(PendingReturn {
            type_expression: ty.to_string(),
            description: description.map(str::to_string),
        }),
        Directive::Index { key, value } => match &ctx.current_class {
            Some(class) => result.ensure_class(class).index_signatures.push(IndexSignature {
                key_type: key.to_string(),
                value_type: value.to_string(),
            }),
            None => debug!(key, value, "index signature outside of a class"),
        },
        Directive::Field {
            name,
            optional,
            ty,
            description,
        } => match &ctx.current_class {
            Some(class) => add_field(result.ensure_class(class), name, optional, ty, description),
            None => debug!(field = name, "field outside of a class"),
        },
    }
    ctx
}

fn add_field(
    class: &mut ParsedClass,
    name: &str,
    optional: bool,
    ty: &str,
    description: Option<&str>,
) {
    let description = description.map(str::to_string);
    let kept = if is_function_type(ty) {
        let type_expression = if optional {
            format!("{}|nil", ty)
        } else {
            ty.to_string()
        };
        class.insert_field(ParsedField {
            name: name.to_string(),
            type_expression,
            description,
            is_method: false,
        })
    } else {
        class.insert_data_field(ParsedDataField {
            name: name.to_string(),
            type_expression: ty.to_string(),
            description,
            optional,
        })
    };
    if !kept {
        debug!(class = %class.name, field = name, "keeping earlier member definition");
    }
}

fn attach_method(ctx: Context, decl: &FunctionDecl<'_>, result: &mut ParseResult) -> Context {
    let Some(class_name) = ctx.resolve_class(result, decl.class).map(str::to_string) else {
        debug!(table = decl.class, method = decl.method, "method on an undeclared class");
        return ctx.flushed();
    };

    let field = ParsedField {
        name: decl.method.to_string(),
        type_expression: method_signature(&ctx, &class_name, decl),
        description: method_description(&ctx),
        is_method: true,
    };
    let class = result.ensure_class(&class_name);
    if !class.insert_field(field) {
        debug!(
            class = %class_name,
            method = decl.method,
            "keeping earlier definition that binds a receiver"
        );
    }
    ctx.flushed()
}

/// Build the `fun(...)` source for a declared method.
///
/// Annotated `@param`s win over the declared parameter list, which is only
/// used (typed `any`) when nothing was annotated. The colon form always gets
/// a `self` receiver typed as the class.
fn method_signature(ctx: &Context, class: &str, decl: &FunctionDecl<'_>) -> String {
    let mut params = Vec::new();
    if decl.colon {
        params.push(format!("self: {}", class));
    }
    let skip_self = |name: &str| decl.colon && name == "self";
    if ctx.pending_params.is_empty() {
        params.extend(
            decl.params
                .iter()
                .filter(|name| !skip_self(name))
                .map(|name| match *name {
                    "..." => "...: any".to_string(),
                    name => format!("{}: any", name),
                }),
        );
    } else {
        params.extend(
            ctx.pending_params
                .iter()
                .filter(|p| !skip_self(&p.name))
                .map(PendingParam::to_source),
        );
    }

    let returns: Vec<&str> = ctx
        .pending_returns
        .iter()
        .map(|r| r.type_expression.as_str())
        .collect();
    if returns.is_empty() {
        format!("fun({})", params.join(", "))
    } else {
        format!("fun({}): {}", params.join(", "), returns.join(", "))
    }
}

/// Free text plus `@param`/`@returns` notes, as JSDoc body lines.
fn method_description(ctx: &Context) -> Option<String> {
    let mut lines = ctx.description.clone();
    for param in &ctx.pending_params {
        if let Some(desc) = &param.description {
            lines.push(format!("@param {} {}", param.name, desc));
        }
    }
    for ret in &ctx.pending_returns {
        if let Some(desc) = &ret.description {
            lines.push(format!("@returns {}", desc));
        }
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// `Outer.Inner = {}` under an active class records `Inner` on `Outer`.
fn nest_table(ctx: &Context, outer: &str, inner: &str, result: &mut ParseResult) {
    let Some(active) = ctx.current_class.as_deref() else {
        return;
    };
    let Some(outer) = ctx.resolve_class(result, outer).map(str::to_string) else {
        return;
    };
    if outer == active {
        return;
    }
    result.ensure_class(&outer).insert_data_field(ParsedDataField {
        name: inner.to_string(),
        type_expression: active.to_string(),
        description: None,
        optional: false,
    });
}
