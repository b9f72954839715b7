// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Shared options (file locations, model, answer policy) live
// on the top-level parser; the subcommand picks between the
// interactive loop and a single question.
//
// clap's derive macros generate --help text, defaults and
// type conversion (string → f32, usize, PathBuf).
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::session::{SessionConfig, DEFAULT_THRESHOLD};
use crate::infra::model_store::{DEFAULT_MODEL_ID, DEFAULT_REVISION};
use crate::ml::inferencer::EngineConfig;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Ask questions interactively until `exit` (the default)
    Chat,

    /// Answer one question and exit
    Ask(AskArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct AskArgs {
    /// The natural language question to answer
    #[arg(long, short)]
    pub question: String,
}

/// Options common to every subcommand
#[derive(Args, Debug, Clone)]
pub struct SharedArgs {
    /// Plain-text corpus the questions are answered from
    #[arg(long, global = true, default_value = "data.txt")]
    pub data_file: PathBuf,

    /// Binary cache for the vectorized corpus
    #[arg(long, global = true, default_value = "vectorized_data.pkl")]
    pub cache_file: PathBuf,

    /// Rebuild the cache when data-file changed since it was written
    /// (by default the cache is reused whenever it exists)
    #[arg(long, global = true)]
    pub verify_cache: bool,

    /// Answers scoring below this confidence are withheld
    #[arg(long, global = true, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f32,

    /// Hugging Face Hub id of the extractive Q&A checkpoint
    #[arg(long, global = true, env = "CORPUS_QA_MODEL", default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    /// Hub revision (branch, tag or commit) of the checkpoint
    #[arg(long, global = true, default_value = DEFAULT_REVISION)]
    pub revision: String,

    /// Tokens per model input: [CLS] question [SEP] context [SEP]
    #[arg(long, global = true, default_value_t = 384)]
    pub max_seq_len: usize,

    /// Tokens shared by consecutive context windows
    #[arg(long, global = true, default_value_t = 128)]
    pub doc_stride: usize,

    /// Longest answer span, in tokens
    #[arg(long, global = true, default_value_t = 15)]
    pub max_answer_len: usize,
}

/// The application layer never sees clap types.
impl From<&SharedArgs> for SessionConfig {
    fn from(a: &SharedArgs) -> Self {
        SessionConfig {
            data_file:    a.data_file.clone(),
            cache_file:   a.cache_file.clone(),
            threshold:    a.threshold,
            verify_cache: a.verify_cache,
        }
    }
}

impl From<&SharedArgs> for EngineConfig {
    fn from(a: &SharedArgs) -> Self {
        EngineConfig {
            model_id:       a.model.clone(),
            revision:       a.revision.clone(),
            max_seq_len:    a.max_seq_len,
            doc_stride:     a.doc_stride,
            max_answer_len: a.max_answer_len,
        }
    }
}
