// ============================================================
// Layer 4 — Context Preprocessor
// ============================================================
// Fits a TF-IDF vectorizer (English stop words removed) on the
// whole context as ONE document and keeps both the fitted
// vectorizer and its transformed row.
//
// The bundle is cached to disk between runs. The QA engine
// answers from the raw context string and never reads it.
//
// Alongside the vectorizer we record a SHA-256 digest of the
// text it was fitted on. It is ignored unless cache
// verification is switched on (see RepresentationCache).
//
// Reference: Rust Book §8 (Strings in Rust)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::data::vectorizer::{SparseMatrix, TfidfVectorizer};

/// Fitted vectorizer + transformed matrix, as stored in the cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentationBundle {
    pub vectorizer:    TfidfVectorizer,
    pub transformed:   SparseMatrix,
    /// Hex SHA-256 of the text the vectorizer was fitted on
    pub source_digest: String,
}

impl RepresentationBundle {
    /// True when this bundle was built from exactly `text`
    pub fn matches(&self, text: &str) -> bool {
        self.source_digest == content_digest(text)
    }
}

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Fit the vectorizer on `text` and transform it.
    pub fn preprocess(&self, text: &str) -> Result<RepresentationBundle> {
        let mut vectorizer = TfidfVectorizer::english();
        let transformed    = vectorizer.fit_transform(&[text])?;

        tracing::info!(
            "Vectorized context: {} terms, {} non-zero weights",
            vectorizer.vocabulary().len(),
            transformed.nnz()
        );

        Ok(RepresentationBundle {
            vectorizer,
            transformed,
            source_digest: content_digest(text),
        })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase hex SHA-256 of `text`
pub fn content_digest(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
