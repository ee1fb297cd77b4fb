//! Grammar-based boundary scanner for Rust source.
//!
//! Delegates parsing to `syn` and reconstructs each function's text by
//! slicing the original source at the declaration's exact line range, so
//! every span round-trips as a substring of the input. Requires the
//! `span-locations` feature of proc-macro2 for line information.

use proc_macro2::Span;
use syn::spanned::Spanned;

use tf_core::{FunctionSpan, ScanError};

/// Scanner for languages with an in-process formal-grammar parser.
#[derive(Debug, Default)]
pub struct GrammarScanner;

impl GrammarScanner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract every free function and every `impl`-block method, in
    /// source order, including private ones.
    ///
    /// Spans start at the visibility qualifier (or the `fn` keyword when
    /// there is none) and end at the brace closing the body; attributes
    /// and doc comments above the declaration are not included. Invalid
    /// source fails with [`ScanError::Parse`] and yields no partial
    /// results.
    pub fn extract_functions(&self, source: &str) -> Result<Vec<FunctionSpan>, ScanError> {
        let file = syn::parse_file(source).map_err(|err| ScanError::Parse(err.to_string()))?;
        let lines: Vec<&str> = source.lines().collect();

        let mut functions = Vec::new();
        collect_items(&file.items, &lines, &mut functions);
        Ok(functions)
    }
}

fn collect_items(items: &[syn::Item], lines: &[&str], out: &mut Vec<FunctionSpan>) {
    for item in items {
        match item {
            syn::Item::Fn(item_fn) => {
                let start = decl_start_line(&item_fn.vis, item_fn.sig.fn_token.span());
                let end = item_fn.block.brace_token.span.close().end().line;
                out.push(make_span(
                    lines,
                    item_fn.sig.ident.to_string(),
                    is_public(&item_fn.vis),
                    start,
                    end,
                ));
            }
            syn::Item::Impl(item_impl) => {
                for impl_item in &item_impl.items {
                    if let syn::ImplItem::Fn(method) = impl_item {
                        let start = decl_start_line(&method.vis, method.sig.fn_token.span());
                        let end = method.block.brace_token.span.close().end().line;
                        out.push(make_span(
                            lines,
                            method.sig.ident.to_string(),
                            is_public(&method.vis),
                            start,
                            end,
                        ));
                    }
                }
            }
            syn::Item::Mod(item_mod) => {
                if let Some((_, items)) = &item_mod.content {
                    collect_items(items, lines, out);
                }
            }
            _ => {}
        }
    }
}

/// Line the declaration starts on: the visibility qualifier when present,
/// otherwise the `fn` keyword. Skipping attributes here is what keeps doc
/// comments out of the span.
fn decl_start_line(vis: &syn::Visibility, fn_token: Span) -> usize {
    match vis {
        syn::Visibility::Inherited => fn_token.start().line,
        _ => vis.span().start().line,
    }
}

fn is_public(vis: &syn::Visibility) -> bool {
    matches!(vis, syn::Visibility::Public(_))
}

fn make_span(
    lines: &[&str],
    name: String,
    is_exported: bool,
    start_line: usize,
    end_line: usize,
) -> FunctionSpan {
    // Span lines are 1-indexed and inclusive.
    let start = start_line.saturating_sub(1);
    let end = end_line.min(lines.len());
    let source_text = lines[start..end].join("\n");
    FunctionSpan::new(name, source_text, is_exported)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FUNCTIONS: &str = r#"
pub fn visible(x: u32) -> u32 {
    x + 1
}

fn hidden() -> &'static str {
    "quiet"
}
"#;

    #[test]
    fn extracts_every_declared_function() {
        let scanner = GrammarScanner::new();
        let functions = scanner.extract_functions(TWO_FUNCTIONS).unwrap();

        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "visible");
        assert!(functions[0].is_exported);
        assert_eq!(functions[1].name, "hidden");
        assert!(!functions[1].is_exported);
    }

    #[test]
    fn spans_round_trip_as_exact_substrings() {
        let scanner = GrammarScanner::new();
        let functions = scanner.extract_functions(TWO_FUNCTIONS).unwrap();

        for function in &functions {
            assert!(
                TWO_FUNCTIONS.contains(&function.source_text),
                "span for {} is not a substring of the input",
                function.name
            );
        }
    }

    #[test]
    fn span_covers_keyword_through_closing_brace() {
        let scanner = GrammarScanner::new();
        let functions = scanner.extract_functions(TWO_FUNCTIONS).unwrap();

        assert!(functions[0].source_text.starts_with("pub fn visible"));
        assert!(functions[0].source_text.ends_with('}'));
    }

    #[test]
    fn extracts_impl_methods() {
        let source = r#"
struct Counter {
    value: u64,
}

impl Counter {
    pub fn increment(&mut self) {
        self.value += 1;
    }

    fn reset(&mut self) {
        self.value = 0;
    }
}
"#;
        let scanner = GrammarScanner::new();
        let functions = scanner.extract_functions(source).unwrap();

        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "increment");
        assert!(functions[0].is_exported);
        assert_eq!(functions[1].name, "reset");
        assert!(!functions[1].is_exported);
    }

    #[test]
    fn preceding_doc_comments_are_excluded() {
        let source = r#"
/// Adds one.
///
/// Documented thoroughly.
pub fn documented(x: i64) -> i64 {
    x + 1
}
"#;
        let scanner = GrammarScanner::new();
        let functions = scanner.extract_functions(source).unwrap();

        assert_eq!(functions.len(), 1);
        assert!(!functions[0].source_text.contains("///"));
        assert!(functions[0].source_text.starts_with("pub fn documented"));
    }

    #[test]
    fn functions_inside_inline_modules_are_found() {
        let source = r#"
mod inner {
    pub fn nested() -> bool {
        true
    }
}
"#;
        let scanner = GrammarScanner::new();
        let functions = scanner.extract_functions(source).unwrap();

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "nested");
    }

    #[test]
    fn invalid_source_aborts_with_parse_error() {
        let scanner = GrammarScanner::new();
        let err = scanner.extract_functions("fn broken( {").unwrap_err();
        assert!(matches!(err, ScanError::Parse(_)));
    }

    #[test]
    fn restricted_visibility_is_not_exported() {
        let source = r#"
pub(crate) fn internal() {}
"#;
        let scanner = GrammarScanner::new();
        let functions = scanner.extract_functions(source).unwrap();

        assert_eq!(functions.len(), 1);
        assert!(!functions[0].is_exported);
    }
}
