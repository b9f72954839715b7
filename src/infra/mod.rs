// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Concerns that touch the outside world on behalf of the
// other layers:
//
//   cache.rs        — Representation cache
//                     Writes the fitted TF-IDF bundle to a
//                     binary file and reads it back on the
//                     next run.
//
//   model_store.rs  — Pretrained checkpoint files
//                     Downloads config, tokenizer and weights
//                     from the Hugging Face Hub on first use
//                     and serves them from the local hub cache
//                     afterwards.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Binary cache for the vectorized context
pub mod cache;

/// Hugging Face Hub download of the Q&A checkpoint
pub mod model_store;
