// ============================================================
// Layer 6 — Model Store
// ============================================================
// Materialises the pretrained Q&A checkpoint locally.
//
// Three files are needed from the Hugging Face Hub repo:
//   config.json        — architecture (dim, n_layers, n_heads…)
//   tokenizer.json     — WordPiece vocabulary + BERT normaliser
//   model.safetensors  — the weights
//
// hf-hub downloads each file once into the local hub cache
// (~/.cache/huggingface/hub unless HF_HOME says otherwise)
// and returns the cached path on later runs, so only the very
// first start needs network access.
//
// Every failure here becomes QaError::ModelLoad, which the CLI
// treats as fatal.

use anyhow::Result;
use hf_hub::{api::sync::ApiBuilder, Repo, RepoType};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::domain::error::QaError;

pub const DEFAULT_MODEL_ID: &str = "distilbert-base-uncased-distilled-squad";
pub const DEFAULT_REVISION: &str = "main";

const CONFIG_FILE:    &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE:   &str = "model.safetensors";

/// Local paths of one downloaded checkpoint
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config:    PathBuf,
    pub tokenizer: PathBuf,
    pub weights:   PathBuf,
}

pub struct ModelStore {
    model_id: String,
    revision: String,
}

impl ModelStore {
    pub fn new(model_id: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            revision: revision.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Resolve all checkpoint files, downloading any that are missing
    pub fn fetch(&self) -> Result<ModelFiles> {
        let api = ApiBuilder::new()
            .with_progress(true)
            .build()
            .map_err(|e| QaError::model_load(&self.model_id, e))?;

        let repo = api.repo(Repo::with_revision(
            self.model_id.clone(),
            RepoType::Model,
            self.revision.clone(),
        ));

        let get = |name: &str| -> Result<PathBuf> {
            tracing::debug!("Resolving {}/{}", self.model_id, name);
            repo.get(name)
                .map_err(|e| QaError::model_load(&self.model_id, format!("{name}: {e}")).into())
        };

        let files = ModelFiles {
            config:    get(CONFIG_FILE)?,
            tokenizer: get(TOKENIZER_FILE)?,
            weights:   get(WEIGHTS_FILE)?,
        };

        tracing::info!(
            "Model '{}' available at '{}'",
            self.model_id,
            files.weights.parent().unwrap_or(Path::new("")).display()
        );
        Ok(files)
    }

    /// Load the tokenizer with truncation and padding switched off —
    /// the inferencer builds its own windows.
    pub fn load_tokenizer(&self, path: &Path) -> Result<Tokenizer> {
        let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
            QaError::model_load(
                &self.model_id,
                format!("cannot load tokenizer from '{}': {e}", path.display()),
            )
        })?;

        tokenizer
            .with_truncation(None)
            .map_err(|e| QaError::model_load(&self.model_id, e))?;
        tokenizer.with_padding(None);

        Ok(tokenizer)
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_ID, DEFAULT_REVISION)
    }
}
