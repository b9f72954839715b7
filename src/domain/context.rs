// ============================================================
// Layer 3 — Context Domain Type
// ============================================================
// The working corpus: the full content of the source file,
// whitespace-trimmed. Built once per read and never mutated.

use std::path::{Path, PathBuf};

/// Corpus text loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Where the text was read from — kept for log messages
    source: PathBuf,

    /// Trimmed file content
    text: String,
}

impl Context {
    /// Build a Context, trimming leading and trailing whitespace.
    ///
    /// Example:
    ///   let ctx = Context::new("data.txt", "  The sky is blue.\n");
    ///   assert_eq!(ctx.text(), "The sky is blue.");
    pub fn new(source: impl Into<PathBuf>, text: impl AsRef<str>) -> Self {
        Self {
            source: source.into(),
            text:   text.as_ref().trim().to_string(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
