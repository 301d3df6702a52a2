//! Delimiter-depth scanning over type expressions.
//!
//! Every helper here walks the text with an explicit stack of open
//! delimiters, so a `|`, `,` or `:` nested inside `(...)`, `[...]`, `{...}`
//! or `<...>` is never mistaken for top-level syntax. All delimiters are
//! ASCII, so byte offsets returned here are always char boundaries.

/// Stack of currently open delimiters.
#[derive(Debug, Default)]
pub struct DepthStack {
    open: Vec<char>,
}

impl DepthStack {
    pub fn is_top_level(&self) -> bool {
        self.open.is_empty()
    }

    /// Feed one character. `prev` is the character before it, needed to
    /// tell the `>` of an arrow (`=>`) apart from a closing angle bracket.
    pub fn feed(&mut self, prev: Option<char>, c: char) {
        match c {
            '(' | '[' | '{' | '<' => self.open.push(c),
            ')' => self.close('('),
            ']' => self.close('['),
            '}' => self.close('{'),
            '>' if prev != Some('=') => self.close('<'),
            _ => {}
        }
    }

    // Unmatched closers are ignored; a closer also pops any unclosed `<`
    // opened after its partner.
    fn close(&mut self, opener: char) {
        if let Some(pos) = self.open.iter().rposition(|&o| o == opener) {
            self.open.truncate(pos);
        }
    }
}

/// Split `s` on `sep` wherever it occurs at depth zero. Parts are trimmed;
/// empty parts are dropped.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut stack = DepthStack::default();
    let mut start = 0;
    let mut prev = None;
    for (i, c) in s.char_indices() {
        if c == sep && stack.is_top_level() {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        } else {
            stack.feed(prev, c);
        }
        prev = Some(c);
    }
    parts.push(&s[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Byte offset of the first depth-zero character satisfying `pred`.
pub fn find_top_level(s: &str, pred: impl Fn(char) -> bool) -> Option<usize> {
    let mut stack = DepthStack::default();
    let mut prev = None;
    for (i, c) in s.char_indices() {
        if stack.is_top_level() && pred(c) {
            return Some(i);
        }
        stack.feed(prev, c);
        prev = Some(c);
    }
    None
}

/// Byte offset of the delimiter closing the one opened at `open_at`.
pub fn matching_close(s: &str, open_at: usize) -> Option<usize> {
    let mut stack = DepthStack::default();
    let mut prev = None;
    for (i, c) in s[open_at..].char_indices() {
        stack.feed(prev, c);
        if i > 0 && stack.is_top_level() {
            return matches!(c, ')' | ']' | '}' | '>').then_some(open_at + i);
        }
        prev = Some(c);
    }
    None
}

/// Whether `s` is exactly one `open ... close` group, e.g. `(a, b)` but not
/// `(a)|(b)`.
pub fn is_wrapped(s: &str, open: char, close: char) -> bool {
    s.starts_with(open) && s.ends_with(close) && matching_close(s, 0) == Some(s.len() - 1)
}

/// Whether `s` contains a depth-zero `|`.
pub fn has_top_level_union(s: &str) -> bool {
    find_top_level(s, |c| c == '|').is_some()
}

/// Split leading type text from trailing free text, e.g.
/// `string | nil The name` → (`string | nil`, `The name`).
///
/// Whitespace ends the type unless it sits next to a `|`, `,` or `:`, or is
/// still inside a delimiter group.
pub fn split_type_prefix(s: &str) -> (&str, Option<&str>) {
    let s = s.trim();
    let mut stack = DepthStack::default();
    let mut prev = None;
    let mut last_solid = None;
    for (i, c) in s.char_indices() {
        if c.is_whitespace() && stack.is_top_level() {
            let next_solid = s[i..].trim_start().chars().next();
            let joins = |ch: Option<char>| matches!(ch, Some('|' | ',' | ':'));
            if !joins(last_solid) && !joins(next_solid) {
                let rest = s[i..].trim_start();
                let rest = rest.strip_prefix('#').unwrap_or(rest).trim();
                return (&s[..i], (!rest.is_empty()).then_some(rest));
            }
        }
        stack.feed(prev, c);
        if !c.is_whitespace() {
            last_solid = Some(c);
        }
        prev = Some(c);
    }
    (s, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_ignores_nested_separators() {
        assert_eq!(
            split_top_level("a, table<b, c>, fun(d, e): f", ','),
            vec!["a", "table<b, c>", "fun(d, e): f"]
        );
    }

    #[test]
    fn split_union_after_function_group() {
        assert_eq!(
            split_top_level("fun(x: table<string,number>): boolean|nil", '|'),
            vec!["fun(x: table<string,number>): boolean", "nil"]
        );
    }

    #[test]
    fn arrow_is_not_a_closer() {
        assert_eq!(
            split_top_level("(x: number) => number | string", '|'),
            vec!["(x: number) => number", "string"]
        );
    }

    #[test]
    fn matching_close_skips_inner_groups() {
        let s = "fun(cb: fun(a: number), b: string): boolean";
        assert_eq!(matching_close(s, 3), Some(33));
        assert_eq!(matching_close("(unclosed", 0), None);
    }

    #[test]
    fn wrapped_detection() {
        assert!(is_wrapped("(a, b)", '(', ')'));
        assert!(!is_wrapped("(a)|(b)", '(', ')'));
        assert!(is_wrapped("{ x: number }", '{', '}'));
    }

    #[test]
    fn type_prefix_with_description() {
        assert_eq!(
            split_type_prefix("string | nil The name"),
            ("string | nil", Some("The name"))
        );
        assert_eq!(
            split_type_prefix("fun(a: number): boolean called on hit"),
            ("fun(a: number): boolean", Some("called on hit"))
        );
        assert_eq!(split_type_prefix("number # px"), ("number", Some("px")));
        assert_eq!(split_type_prefix("table<string, number>"), ("table<string, number>", None));
    }
}
