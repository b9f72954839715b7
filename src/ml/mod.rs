// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL burn and tokenizers specific code.
// No other layer imports from burn directly — only this one.
//
//   model.rs      — DistilBERT encoder with a span head
//                   • Token + positional embeddings
//                   • Embedding layer normalisation
//                   • 6 post-norm encoder blocks
//                     (multi-head self-attention + GELU FFN)
//                   • Q&A span prediction head (dim → 2)
//
//   inferencer.rs — The QA engine
//                   Fetches the pretrained checkpoint, imports
//                   its weights, tokenises question + context,
//                   runs the model over context windows and
//                   decodes the best answer span
//
// Reference: Burn Book §3 (Building Blocks)
//            Sanh et al. (2019) DistilBERT
//            Devlin et al. (2019) BERT

/// DistilBERT encoder + span head
pub mod model;

/// Pretrained extractive Q&A engine
pub mod inferencer;
