//! Heuristic boundary scanner for TypeScript source.
//!
//! No grammar is available in-process, so probable declaration starts are
//! located by a single multi-line pattern and each body is bounded by
//! delimiter-depth counting from its first opening brace — regular
//! expressions alone cannot express arbitrary nesting. A short lookback
//! window before each match recovers an `export` qualifier that sits
//! outside the matched text (e.g. on a preceding line).
//!
//! Extraction is best-effort by contract: a candidate whose name cannot
//! be resolved, or whose braces never rebalance, is dropped silently.

use regex::Regex;

use tf_core::{FunctionSpan, ScanError};

/// Bytes searched before a match start for a detached `export` qualifier.
///
/// Tunable rather than contractual; 50 covers a qualifier on the previous
/// line without reaching into unrelated declarations.
pub const QUALIFIER_LOOKBACK_BYTES: usize = 50;

/// Scanner for languages without an in-process parser.
pub struct HeuristicScanner {
    start_pattern: Regex,
    lookback_bytes: usize,
}

impl Default for HeuristicScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicScanner {
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookback(QUALIFIER_LOOKBACK_BYTES)
    }

    /// Build a scanner with a custom qualifier-lookback window.
    #[must_use]
    pub fn with_lookback(lookback_bytes: usize) -> Self {
        // Assembled from components, in order: start of line, optional
        // export qualifier (group 1), optional async, then either a named
        // function declaration (group 2) or a const binding (group 3)
        // with optional type annotation, assignment, optional generics,
        // and a function keyword or arrow — up to the body's opening
        // brace.
        let pattern = concat!(
            r"(?m)",
            r"(?:^|\n)\s*",
            r"(?:(export)\s+)?",
            r"(?:async\s+)?",
            r"(?:",
            r"function\s+(\w+)",
            r"|",
            r"const\s+(\w+)",
            r"\s*(?::\s*(?:[^=;]|=>|\{[^}]*\})*?)?",
            r"\s*=\s*",
            r"(?:async\s+)?",
            r"(?:",
            r"(?:<[^>]+>\s*)?",
            r"(?:function|\([^)]*\)\s*(?::\s*[^{]*?)?\s*=>)",
            r")",
            r")",
            r"\s*[^{]*\{",
        );
        let start_pattern = Regex::new(pattern).expect("start pattern is valid");
        Self {
            start_pattern,
            lookback_bytes,
        }
    }

    /// Extract probable function declarations, in scan order.
    ///
    /// Every distinct match start is an independent candidate; unresolved
    /// candidates are dropped rather than reported.
    pub fn extract_functions(&self, source: &str) -> Result<Vec<FunctionSpan>, ScanError> {
        let mut functions = Vec::new();

        for caps in self.start_pattern.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            let start = whole.start();

            // The pattern cannot see a qualifier placed before the line
            // it matched on; search a bounded window of preceding text.
            let pre_context = lookback_slice(source, start, self.lookback_bytes);
            let is_exported = pre_context.contains("export") || caps.get(1).is_some();

            // The match consumed the body's opening brace; walk forward
            // until the matching close brings the depth back to zero.
            let Some(end) = matching_brace_end(source, whole.end()) else {
                continue;
            };

            let mut full = source[start..end].trim().to_string();
            if is_exported && !full.starts_with("export") {
                full = format!("export {full}");
            }

            // Re-run the start pattern against the bounded span to pull
            // the declared name out of whichever capture group applies;
            // a span yielding neither was a partial match.
            let Some(name) = self.declared_name(&full) else {
                continue;
            };

            functions.push(FunctionSpan::new(name, full, is_exported));
        }

        Ok(functions)
    }

    fn declared_name(&self, span_text: &str) -> Option<String> {
        let caps = self.start_pattern.captures(span_text)?;
        let name = caps.get(2).or_else(|| caps.get(3))?;
        if name.as_str().is_empty() {
            return None;
        }
        Some(name.as_str().to_string())
    }
}

/// Up to `window` bytes of text before `end`, adjusted forward to the
/// nearest character boundary.
fn lookback_slice(source: &str, end: usize, window: usize) -> &str {
    let mut start = end.saturating_sub(window);
    while start < end && !source.is_char_boundary(start) {
        start += 1;
    }
    &source[start..end]
}

/// Byte position one past the brace that closes the body opened just
/// before `from`, or `None` if the depth never returns to zero.
fn matching_brace_end(source: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, byte) in source.as_bytes()[from..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<FunctionSpan> {
        HeuristicScanner::new().extract_functions(source).unwrap()
    }

    fn balanced(text: &str) -> bool {
        let opens = text.bytes().filter(|b| *b == b'{').count();
        let closes = text.bytes().filter(|b| *b == b'}').count();
        opens == closes
    }

    #[test]
    fn regular_functions() {
        let source = r#"
function hello() { return "hello" }
export function world() { return "world" }
"#;
        let functions = scan(source);

        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "hello");
        assert_eq!(functions[0].source_text, r#"function hello() { return "hello" }"#);
        assert!(!functions[0].is_exported);
        assert_eq!(functions[1].name, "world");
        assert_eq!(
            functions[1].source_text,
            r#"export function world() { return "world" }"#
        );
        assert!(functions[1].is_exported);
    }

    #[test]
    fn arrow_functions() {
        let source = r#"
const arrowFn = () => { return "arrow" }
export const exportedArrow = () => { return "exported" }
"#;
        let functions = scan(source);

        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "arrowFn");
        assert!(!functions[0].is_exported);
        assert_eq!(functions[1].name, "exportedArrow");
        assert!(functions[1].is_exported);
    }

    #[test]
    fn mixed_declaration_forms() {
        let source = r#"
function regular() { return "regular" }
const arrow = () => { return "arrow" }
export function exportedRegular() { return "exported" }
export const exportedArrow = () => { return "exported arrow" }
"#;
        let names: Vec<_> = scan(source).into_iter().map(|f| (f.name, f.is_exported)).collect();

        assert_eq!(
            names,
            vec![
                ("regular".to_string(), false),
                ("arrow".to_string(), false),
                ("exportedRegular".to_string(), true),
                ("exportedArrow".to_string(), true),
            ]
        );
    }

    #[test]
    fn async_and_annotated_arrows() {
        let source = r#"
export const fetchUser = async (id: string): Promise<User> => {
    return lookup(id)
}
"#;
        let functions = scan(source);

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "fetchUser");
        assert!(functions[0].is_exported);
        assert!(balanced(&functions[0].source_text));
    }

    #[test]
    fn nested_object_braces_are_bounded() {
        let source = "export const f = () => { return { a: { b: 1 } } }";
        let functions = scan(source);

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "f");
        assert!(functions[0].is_exported);
        assert!(functions[0].source_text.ends_with('}'));
        assert!(balanced(&functions[0].source_text));
    }

    #[test]
    fn every_span_has_balanced_braces() {
        let source = r#"
function outer() {
    const inner = { key: { deep: [1, 2, 3] } }
    if (inner) {
        return inner
    }
    return null
}
const helper = (x: number) => { return { doubled: x * 2 } }
"#;
        let functions = scan(source);

        assert_eq!(functions.len(), 2);
        for function in &functions {
            assert!(balanced(&function.source_text), "unbalanced: {}", function.name);
        }
    }

    #[test]
    fn rescanning_a_span_is_idempotent() {
        let source = r#"
export function stable() {
    return { nested: { twice: true } }
}
"#;
        let first = scan(source);
        assert_eq!(first.len(), 1);

        let second = scan(&first[0].source_text);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, first[0].name);
        assert_eq!(second[0].source_text, first[0].source_text);
    }

    #[test]
    fn detached_qualifier_within_lookback_is_recovered() {
        // The comment keeps the pattern from consuming `export` directly,
        // so only the lookback window can classify this as exported.
        let source = "export /* default entry */\nconst f = (): number => { return 1 }";
        let functions = scan(source);

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "f");
        assert!(functions[0].is_exported);
        assert!(functions[0].source_text.starts_with("export const f"));
    }

    #[test]
    fn qualifier_outside_lookback_does_not_classify() {
        // Same shape, but the qualifier sits beyond the window; text that
        // far back must not change classification.
        let padding = "x".repeat(80);
        let source = format!("export /* {padding} */\nconst f = () => {{ return 1 }}");
        let functions = scan(&source);

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "f");
        assert!(!functions[0].is_exported);
    }

    #[test]
    fn lookback_window_is_tunable() {
        let padding = "x".repeat(80);
        let source = format!("export /* {padding} */\nconst f = () => {{ return 1 }}");

        let wide = HeuristicScanner::with_lookback(200);
        let functions = wide.extract_functions(&source).unwrap();

        assert_eq!(functions.len(), 1);
        assert!(functions[0].is_exported);
    }

    #[test]
    fn unterminated_body_is_dropped() {
        let source = "function broken() { if (x) { return 1 }";
        let functions = scan(source);
        assert!(functions.is_empty());
    }

    #[test]
    fn non_function_consts_are_ignored() {
        let source = r#"
const limit = 42
const names = ["a", "b"]
function real() { return limit }
"#;
        let functions = scan(source);

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "real");
    }
}
