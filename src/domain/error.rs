// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Errors whose KIND matters to callers. Everything else flows
// through anyhow with context attached.
//
//   NotFound      — context file missing, fatal at startup
//   ModelLoad     — pretrained model unavailable, fatal at startup
//   Answer        — one question failed, the session carries on
//   CacheCorrupt  — cached bundle could not be decoded
//
// Callers that need to branch on the kind use
// `err.downcast_ref::<QaError>()`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("{} not found. Please create the file and add your context.", .path.display())]
    NotFound { path: PathBuf },

    #[error(
        "Error loading the model '{model}'. Ensure you have internet for the first run \
         to cache the model. ({reason})"
    )]
    ModelLoad { model: String, reason: String },

    #[error("{0}")]
    Answer(String),

    #[error("cached representation '{}' is unreadable: {reason}", .path.display())]
    CacheCorrupt { path: PathBuf, reason: String },
}

impl QaError {
    pub fn answer(reason: impl std::fmt::Display) -> Self {
        Self::Answer(reason.to_string())
    }

    pub fn model_load(model: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ModelLoad {
            model:  model.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_file() {
        let e = QaError::NotFound { path: PathBuf::from("data.txt") };
        let msg = e.to_string();
        assert!(msg.starts_with("data.txt not found"));
        assert!(msg.contains("create the file"));
    }

    #[test]
    fn test_model_load_mentions_network() {
        let e = QaError::model_load("distilbert-base-uncased-distilled-squad", "offline");
        assert!(e.to_string().contains("internet"));
    }
}
