// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer is written against these traits, so
// the concrete backends can be swapped without touching it:
//   - TextFileLoader implements ContextSource
//   - Inferencer (burn + pretrained DistilBERT) implements
//     QuestionAnswerer; tests plug in a scripted answerer
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use anyhow::Result;

use crate::domain::{context::Context, qa_result::QaResult};

// ─── ContextSource ────────────────────────────────────────────────────────────
/// Any component that can produce the working corpus.
pub trait ContextSource {
    /// Read the corpus fresh. Fails with `QaError::NotFound`
    /// when the backing file is absent.
    fn load(&self) -> Result<Context>;
}

// ─── QuestionAnswerer ─────────────────────────────────────────────────────────
/// Extractive question answering over a context string.
pub trait QuestionAnswerer {
    /// Return the best-supported span of `context` for `question`
    /// and its confidence in [0, 1].
    fn answer(&self, question: &str, context: &str) -> Result<QaResult>;
}

impl<T: QuestionAnswerer + ?Sized> QuestionAnswerer for Box<T> {
    fn answer(&self, question: &str, context: &str) -> Result<QaResult> {
        (**self).answer(question, context)
    }
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// A store that can write and read back one value of type `T`.
///
/// Implementations:
///   - RepresentationCache → the fitted vectorizer bundle
pub trait Persistable<T> {
    /// Write `value`, replacing whatever was stored before
    fn save(&self, value: &T) -> Result<()>;

    /// Read back the last value written
    fn load(&self) -> Result<T>;
}
