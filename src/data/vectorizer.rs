// ============================================================
// Layer 4 — TF-IDF Vectorizer
// ============================================================
// Term-frequency × inverse-document-frequency weighting.
//
// Steps for fit():
//   1. Lowercase each document
//   2. Extract tokens of two or more word characters
//      (regex \b\w\w+\b — single letters are dropped)
//   3. Drop English stop words
//   4. Vocabulary = sorted distinct terms → column index
//   5. idf(t) = ln((1 + n_docs) / (1 + df(t))) + 1
//
// Steps for transform():
//   1. Count in-vocabulary terms per document
//      (out-of-vocabulary terms are ignored)
//   2. Multiply each count by the term's idf
//   3. L2-normalise each row
//
// With a single document every idf is exactly 1.0, so the
// transformed row is just the normalised term counts.
//
// Reference: Salton & Buckley (1988) Term-weighting approaches
//            Rust Book §8 (Hash Maps)

use anyhow::{bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::OnceLock};

use crate::data::stop_words::is_stop_word;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"))
}

// ─── SparseMatrix ─────────────────────────────────────────────────────────────
/// Row-compressed sparse matrix of f64 values.
///
/// Row `r` owns `indices[indptr[r]..indptr[r + 1]]` (column ids,
/// ascending) and the matching slice of `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    pub n_rows:  usize,
    pub n_cols:  usize,
    pub indptr:  Vec<usize>,
    pub indices: Vec<usize>,
    pub data:    Vec<f64>,
}

impl SparseMatrix {
    fn empty(n_cols: usize) -> Self {
        Self { n_rows: 0, n_cols, indptr: vec![0], indices: Vec::new(), data: Vec::new() }
    }

    fn push_row(&mut self, row: &BTreeMap<usize, f64>) {
        for (&col, &value) in row {
            self.indices.push(col);
            self.data.push(value);
        }
        self.indptr.push(self.indices.len());
        self.n_rows += 1;
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Value at (row, col), zero when not stored
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.n_rows {
            return 0.0;
        }
        let (lo, hi) = (self.indptr[row], self.indptr[row + 1]);
        match self.indices[lo..hi].binary_search(&col) {
            Ok(i)  => self.data[lo + i],
            Err(_) => 0.0,
        }
    }

    /// Densify one row — handy for inspection and tests
    pub fn row_dense(&self, row: usize) -> Vec<f64> {
        (0..self.n_cols).map(|c| self.get(row, c)).collect()
    }
}

// ─── TfidfVectorizer ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Drop words from the English stop-word list
    remove_stop_words: bool,

    /// term → column index; BTreeMap keeps columns in sorted term order
    vocabulary: BTreeMap<String, usize>,

    /// idf weight per column, empty until fitted
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Unfitted vectorizer that keeps every token
    pub fn new() -> Self {
        Self { remove_stop_words: false, vocabulary: BTreeMap::new(), idf: Vec::new() }
    }

    /// Unfitted vectorizer that drops English stop words
    pub fn english() -> Self {
        Self { remove_stop_words: true, ..Self::new() }
    }

    pub fn is_fitted(&self) -> bool {
        !self.idf.is_empty()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Lowercased tokens of `text`, stop words removed if configured
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        token_pattern()
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !(self.remove_stop_words && is_stop_word(t)))
            .map(str::to_string)
            .collect()
    }

    /// Learn the vocabulary and idf weights from `docs`.
    pub fn fit(&mut self, docs: &[&str]) -> Result<()> {
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        for doc in docs {
            let mut terms = self.analyze(doc);
            terms.sort();
            terms.dedup();
            for term in terms {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        if df.is_empty() {
            bail!("empty vocabulary; perhaps the documents only contain stop words");
        }

        let n_docs = docs.len() as f64;
        self.vocabulary = df.keys().cloned().enumerate().map(|(i, t)| (t, i)).collect();
        self.idf = df
            .values()
            .map(|&d| ((1.0 + n_docs) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        tracing::debug!("Fitted vectorizer: {} terms over {} documents", self.idf.len(), docs.len());
        Ok(())
    }

    /// Weight `docs` against the fitted vocabulary, one row per document.
    pub fn transform(&self, docs: &[&str]) -> Result<SparseMatrix> {
        if !self.is_fitted() {
            bail!("vectorizer has not been fitted");
        }

        let mut matrix = SparseMatrix::empty(self.vocabulary.len());
        for doc in docs {
            let mut row: BTreeMap<usize, f64> = BTreeMap::new();
            for term in self.analyze(doc) {
                if let Some(&col) = self.vocabulary.get(&term) {
                    *row.entry(col).or_insert(0.0) += 1.0;
                }
            }
            for (col, value) in row.iter_mut() {
                *value *= self.idf[*col];
            }

            let norm = row.values().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.values_mut().for_each(|v| *v /= norm);
            }
            matrix.push_row(&row);
        }
        Ok(matrix)
    }

    pub fn fit_transform(&mut self, docs: &[&str]) -> Result<SparseMatrix> {
        self.fit(docs)?;
        self.transform(docs)
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
