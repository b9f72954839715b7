// ============================================================
// Layer 4 — Context Loader
// ============================================================
// Reads the single plain-text corpus file into memory.
//
// The corpus is one UTF-8 file (data.txt by default). A
// missing file is a user mistake rather than an I/O glitch,
// so it gets its own error kind with a message telling the
// user what to create. Any other read failure (permissions,
// invalid UTF-8) propagates with the path attached.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (Reading a File)

use anyhow::{Context as _, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::context::Context;
use crate::domain::error::QaError;
use crate::domain::traits::ContextSource;

/// Loads the corpus from one text file.
/// Implements the ContextSource trait from Layer 3.
pub struct TextFileLoader {
    /// Path to the corpus file
    path: PathBuf,
}

impl TextFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContextSource for TextFileLoader {
    fn load(&self) -> Result<Context> {
        load_context(&self.path)
    }
}

/// Read `path` as UTF-8 and return its whitespace-trimmed content.
pub fn load_context(path: &Path) -> Result<Context> {
    if !path.exists() {
        return Err(QaError::NotFound { path: path.to_path_buf() }.into());
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read context file '{}'", path.display()))?;

    let context = Context::new(path, text);
    tracing::debug!(
        "Loaded context from '{}' ({} bytes)",
        path.display(),
        context.text().len()
    );
    Ok(context)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_file_content() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "\n\n  The sky is blue.  \n").unwrap();

        let ctx = load_context(&path).unwrap();
        assert_eq!(ctx.text(), "The sky is blue.");
    }

    #[test]
    fn test_loading_twice_is_identical() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "Rust was first released in 2015.\n").unwrap();

        let loader = TextFileLoader::new(&path);
        let first  = loader.load().unwrap();
        let second = loader.load().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");

        let err = load_context(&path).unwrap_err();
        match err.downcast_ref::<QaError>() {
            Some(QaError::NotFound { path: p }) => assert_eq!(p, &path),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(err.to_string().contains("data.txt not found"));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();

        let err = load_context(&path).unwrap_err();
        assert!(err.downcast_ref::<QaError>().is_none());
    }
}
