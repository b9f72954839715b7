// ============================================================
// Layer 6 — Representation Cache
// ============================================================
// Saves and restores the fitted TF-IDF bundle so the vectorizer
// is not refitted on every run.
//
// Format: bincode (serde mode, standard config). There is no
// header and no schema version — the file is whatever the last
// save() wrote. Changing RepresentationBundle's fields makes
// old cache files undecodable; load() reports that as
// QaError::CacheCorrupt.
//
// Each access opens, fully reads or writes, and closes the
// file. Writes overwrite in place: there is no temp-file
// rename and no lock, so two processes sharing a cache path
// can clobber each other.
//
// Whether the cache is used at all is decided by the caller
// (see Session::startup), normally from exists() alone.
//
// Reference: Rust Book §9 (Error Handling)
//            bincode crate documentation

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::preprocessor::RepresentationBundle;
use crate::domain::error::QaError;
use crate::domain::traits::Persistable;

/// Reads and writes one RepresentationBundle at a fixed path.
pub struct RepresentationCache {
    path: PathBuf,
}

impl RepresentationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The only validity check the session performs by default
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Persistable<RepresentationBundle> for RepresentationCache {
    fn save(&self, bundle: &RepresentationBundle) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(bundle, bincode::config::standard())
            .context("Cannot encode representation bundle")?;

        fs::write(&self.path, &bytes)
            .with_context(|| format!("Cannot write cache file '{}'", self.path.display()))?;

        tracing::debug!("Saved {} bytes to '{}'", bytes.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<RepresentationBundle> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Cannot read cache file '{}'", self.path.display()))?;

        let (bundle, _read): (RepresentationBundle, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).map_err(
                |e| QaError::CacheCorrupt {
                    path:   self.path.clone(),
                    reason: e.to_string(),
                },
            )?;

        tracing::debug!("Loaded cached bundle from '{}'", self.path.display());
        Ok(bundle)
    }
}
