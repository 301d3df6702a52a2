//! Per-module corrective patches applied to emitted declaration text.
//!
//! Two known translation losses are patched here rather than in the
//! translator:
//!
//! - return-description stripping truncates `@return number x, number y` to
//!   a single `number`; well-known getter families get their tuple back
//! - a nullable function-valued member renders as `(this: T) => R | undefined`,
//!   which reads as a nullable *return*; factory and event-handler members get
//!   the arrow parenthesized
//!
//! Every patch is idempotent.

use regex::{Captures, Regex};
use serde::Deserialize;
use std::sync::LazyLock;

/// Patch set selected per module in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Patch {
    MultiReturns,
    CallableUnions,
    All,
}

impl Patch {
    pub fn apply(self, text: &str) -> String {
        match self {
            Patch::MultiReturns => restore_multi_returns(text),
            Patch::CallableUnions => parenthesize_callable_unions(text),
            Patch::All => parenthesize_callable_unions(&restore_multi_returns(text)),
        }
    }
}

/// Method-name families and the return tuple they always produce.
const RETURN_SHAPES: &[(&[&str], &str)] = &[
    (
        &[
            "getPosition",
            "getLinearVelocity",
            "getDimensions",
            "getSize",
            "getOffset",
            "getScale",
            "getOrigin",
            "getCenter",
            "getMousePosition",
        ],
        "LuaMultiReturn<[number, number]>",
    ),
    (
        &["getVersion"],
        "LuaMultiReturn<[number, number, number]>",
    ),
    (
        &[
            "getColor",
            "getBackgroundColor",
            "getBounds",
            "getBoundingBox",
            "getRect",
            "getViewport",
        ],
        "LuaMultiReturn<[number, number, number, number]>",
    ),
];

// One regex per family: a method line whose return type was cut down to a
// single `number` or `any`.
static RE_TRUNCATED_RETURNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RETURN_SHAPES
        .iter()
        .map(|(names, shape)| {
            let pattern = format!(
                r"(?m)^(\s*)({})\((.*)\): (?:number|any);$",
                names.join("|")
            );
            (Regex::new(&pattern).unwrap(), *shape)
        })
        .collect()
});

// `"new": (this: ...) => R | undefined;`, `onHit?: (this: ...) => R | X;`
static RE_CALLABLE_UNION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^(\s*)("?(?:new|create\w*|on[A-Z]\w*)"?)(\??): (\(this: .*?\) => [^|;]+?)( \| [^;]+);$"#,
    )
    .unwrap()
});

/// Give truncated getter returns their known tuple shape.
pub fn restore_multi_returns(text: &str) -> String {
    RE_TRUNCATED_RETURNS
        .iter()
        .fold(text.to_string(), |acc, (re, shape)| {
            re.replace_all(&acc, |caps: &Captures| {
                format!("{}{}({}): {};", &caps[1], &caps[2], &caps[3], shape)
            })
            .into_owned()
        })
}

/// Parenthesize the arrow in nullable factory and event-handler members.
pub fn parenthesize_callable_unions(text: &str) -> String {
    RE_CALLABLE_UNION
        .replace_all(text, "$1$2$3: ($4)$5;")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_pair_returns() {
        let text = "interface Body {\n    getPosition(this: Body): number;\n    getMass(this: Body): number;\n}\n";
        let patched = Patch::MultiReturns.apply(text);
        assert!(patched.contains("getPosition(this: Body): LuaMultiReturn<[number, number]>;"));
        assert!(patched.contains("getMass(this: Body): number;"));
    }

    #[test]
    fn restores_quad_returns_from_any() {
        let text = "    getColor(this: Sprite): any;\n";
        assert_eq!(
            restore_multi_returns(text),
            "    getColor(this: Sprite): LuaMultiReturn<[number, number, number, number]>;\n"
        );
    }

    #[test]
    fn parenthesizes_event_handlers_and_factories() {
        let text = "    onHit?: (this: void, other: Body) => void | undefined;\n    \"new\": (this: void) => Body | undefined;\n    label: string | undefined;\n";
        let patched = Patch::CallableUnions.apply(text);
        assert!(patched.contains("onHit?: ((this: void, other: Body) => void) | undefined;"));
        assert!(patched.contains("\"new\": ((this: void) => Body) | undefined;"));
        assert!(patched.contains("label: string | undefined;"));
    }

    #[test]
    fn leaves_other_members_alone() {
        let text = "    update: (this: void) => void | undefined;\n";
        assert_eq!(parenthesize_callable_unions(text), text);
    }

    #[test]
    fn patches_are_idempotent() {
        let text = "    getSize(this: Image): number;\n    onLoad: (this: void) => boolean | undefined;\n";
        let once = Patch::All.apply(text);
        assert_eq!(Patch::All.apply(&once), once);
        assert_ne!(once, text);
    }
}
