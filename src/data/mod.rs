// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the corpus file on disk and the cached
// vector representation.
//
//   data.txt
//       │
//       ▼
//   TextFileLoader    → reads the file, trims whitespace
//       │
//       ▼
//   Preprocessor      → fits TF-IDF on the whole context
//       │                 (uses TfidfVectorizer + stop words)
//       ▼
//   RepresentationBundle → handed to infra::cache
//
// Each module is responsible for exactly one step.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Reads the corpus text file
pub mod loader;

/// Builds the cached TF-IDF bundle from the context
pub mod preprocessor;

/// TF-IDF vectorizer and its sparse output
pub mod vectorizer;

/// English stop-word list
pub mod stop_words;
