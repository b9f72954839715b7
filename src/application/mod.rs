// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish a
// specific goal (a chat session or a single question).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No clap types here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The interactive question loop and its startup sequence
pub mod session;

// One question, one answer, then exit
pub mod ask_use_case;
