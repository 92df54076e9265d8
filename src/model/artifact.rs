//! Model artifact persistence: the {forest, scaler} pair.
//!
//! The trainer writes both halves in one call (atomic temp + rename
//! per file); the server loads them once at startup. A forest is only
//! meaningful with the scaler fitted in the same training run, so the
//! pair is treated as one versioned unit: if either file is missing,
//! unreadable, or carries the wrong format version, the whole artifact
//! is reported absent and the server runs in degraded fallback mode.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::forest::RandomForest;
use crate::model::scaler::StandardScaler;

/// Fixed well-known file names inside the model directory.
pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";

/// Artifact format version; bump on incompatible layout changes.
const ARTIFACT_VERSION: u32 = 1;

/// Persistence failure (save path only; load fails soft).
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Provenance recorded next to the forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
    /// Rows in the training partition.
    pub training_samples: usize,
    /// Accuracy measured on the held-out test partition.
    pub test_accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelFile {
    version: u32,
    metadata: ArtifactMetadata,
    forest: RandomForest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerFile {
    version: u32,
    scaler: StandardScaler,
}

/// The matched {forest, scaler} pair plus provenance, immutable after load.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub forest: RandomForest,
    pub scaler: StandardScaler,
    pub metadata: ArtifactMetadata,
}

impl ModelArtifact {
    pub fn new(forest: RandomForest, scaler: StandardScaler, test_accuracy: f64) -> Self {
        let training_samples = scaler.fitted_on;
        Self {
            forest,
            scaler,
            metadata: ArtifactMetadata {
                trained_at: Utc::now().to_rfc3339(),
                training_samples,
                test_accuracy,
            },
        }
    }

    /// Persist both halves under `dir`, overwriting any prior artifact.
    /// Only the training pipeline calls this.
    pub fn save(&self, dir: &Path) -> Result<(), ArtifactError> {
        std::fs::create_dir_all(dir)?;

        let model = ModelFile {
            version: ARTIFACT_VERSION,
            metadata: self.metadata.clone(),
            forest: self.forest.clone(),
        };
        write_atomic(&dir.join(MODEL_FILE), &serde_json::to_vec(&model)?)?;

        let scaler = ScalerFile {
            version: ARTIFACT_VERSION,
            scaler: self.scaler.clone(),
        };
        write_atomic(&dir.join(SCALER_FILE), &serde_json::to_vec(&scaler)?)?;

        info!(dir = %dir.display(), "Model artifact persisted");
        Ok(())
    }

    /// Load the pair from `dir`, or `None` when the artifact is missing
    /// or corrupt. Evaluated once at startup; logs the reason exactly
    /// once, then the process serves fallback predictions for its
    /// lifetime.
    pub fn load(dir: &Path) -> Option<Self> {
        let model_path = dir.join(MODEL_FILE);
        let scaler_path = dir.join(SCALER_FILE);

        if !model_path.exists() || !scaler_path.exists() {
            warn!(
                dir = %dir.display(),
                "Model artifact not found - run the trainer first. Serving fallback predictions."
            );
            return None;
        }

        let model: ModelFile = match read_json(&model_path) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %model_path.display(), error = %e, "Model file unreadable - serving fallback predictions");
                return None;
            }
        };
        let scaler: ScalerFile = match read_json(&scaler_path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %scaler_path.display(), error = %e, "Scaler file unreadable - serving fallback predictions");
                return None;
            }
        };

        if model.version != ARTIFACT_VERSION || scaler.version != ARTIFACT_VERSION {
            warn!(
                model_version = model.version,
                scaler_version = scaler.version,
                expected = ARTIFACT_VERSION,
                "Artifact format version mismatch - serving fallback predictions"
            );
            return None;
        }

        info!(
            trained_at = %model.metadata.trained_at,
            trees = model.forest.num_trees(),
            test_accuracy = model.metadata.test_accuracy,
            "Model artifact loaded"
        );

        Some(Self {
            forest: model.forest,
            scaler: scaler.scaler,
            metadata: model.metadata,
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}
