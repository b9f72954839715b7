// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the assistant.
//
// Rules for this layer:
//   - NO burn or tokenizers types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The corpus text the questions are answered against
pub mod context;

// Answer span + confidence returned by the QA engine
pub mod qa_result;

// Error taxonomy shared by every layer
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
