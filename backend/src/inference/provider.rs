use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tch::TchError;
use thiserror::Error;

use crate::inference::model::Classifier;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found at {path}")]
    ArtifactMissing { path: PathBuf },
    #[error("model artifact at {path} could not be loaded")]
    ArtifactInvalid {
        path: PathBuf,
        #[source]
        source: TchError,
    },
}

/// Owns the classifier lifecycle: one lazy load on first use, then a shared
/// handle for every request in the process.
pub struct ModelProvider {
    artifact_path: PathBuf,
    cell: Mutex<Option<Arc<Classifier>>>,
}

impl ModelProvider {
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            cell: Mutex::new(None),
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Return the loaded classifier, loading it on the first call.
    ///
    /// The lock is held across the load so racing first requests perform a
    /// single load between them. A failed load is not cached: the next call
    /// retries, so serving recovers once the artifact appears on disk.
    pub fn get(&self) -> Result<Arc<Classifier>, ModelError> {
        let mut cell = self.cell.lock().unwrap();
        if let Some(classifier) = cell.as_ref() {
            return Ok(Arc::clone(classifier));
        }

        if !self.artifact_path.exists() {
            log::error!(
                "model artifact not found at {}",
                self.artifact_path.display()
            );
            return Err(ModelError::ArtifactMissing {
                path: self.artifact_path.clone(),
            });
        }

        log::info!("loading classifier from {}", self.artifact_path.display());
        match Classifier::load(&self.artifact_path) {
            Ok(classifier) => {
                let classifier = Arc::new(classifier);
                *cell = Some(Arc::clone(&classifier));
                log::info!("classifier loaded");
                Ok(classifier)
            }
            Err(e) => {
                log::error!(
                    "failed to load classifier from {}: {e}",
                    self.artifact_path.display()
                );
                Err(ModelError::ArtifactInvalid {
                    path: self.artifact_path.clone(),
                    source: e,
                })
            }
        }
    }
}
