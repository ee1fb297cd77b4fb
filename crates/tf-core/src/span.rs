//! The extracted identity and source text of one discovered function.

/// One callable unit discovered by a boundary scanner.
///
/// `source_text` is the exact text of the declaration as it appears in the
/// original file, from the declaration keyword (or visibility qualifier)
/// through the delimiter that closes the body, so the generation oracle
/// sees realistic context. Spans live for one extraction pass and are
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan {
    /// Declared identifier.
    pub name: String,
    /// Full declaration text, delimiters balanced.
    pub source_text: String,
    /// Whether the declaration carries the language's public-visibility
    /// marker (`pub` in Rust, `export` in TypeScript).
    pub is_exported: bool,
}

impl FunctionSpan {
    #[must_use]
    pub fn new(name: impl Into<String>, source_text: impl Into<String>, is_exported: bool) -> Self {
        Self {
            name: name.into(),
            source_text: source_text.into(),
            is_exported,
        }
    }
}
