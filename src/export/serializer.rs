//! Model artifact format
//!
//! An artifact is a bincode-encoded envelope:
//! magic bytes, pinned format version, metadata, the bincode-encoded
//! [`Estimator`] payload and an FNV-1a checksum of that payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TrainerError};
use crate::schema::FeatureSchema;
use crate::storage::{Location, Storage};
use crate::training::{Estimator, EstimatorKind, MODEL_FILENAME};

/// Metadata stored alongside the fitted estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Columns the estimator expects, in order
    pub schema: FeatureSchema,
    pub estimator: EstimatorKind,
    pub trained_at: DateTime<Utc>,
    pub n_samples: usize,
    /// In-sample R²
    pub r2: Option<f64>,
    /// Version of the crate that wrote the artifact
    pub trainer_version: String,
}

impl ArtifactMetadata {
    pub fn new(schema: FeatureSchema, estimator: EstimatorKind, n_samples: usize) -> Self {
        Self {
            schema,
            estimator,
            trained_at: Utc::now(),
            n_samples,
            r2: None,
            trainer_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_r2(mut self, r2: f64) -> Self {
        self.r2 = Some(r2);
        self
    }
}

/// Serialized artifact envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Magic bytes for format detection
    pub magic: [u8; 4],
    /// Format version
    pub format_version: u32,
    pub metadata: ArtifactMetadata,
    /// Serialized estimator
    pub payload: Vec<u8>,
    /// Checksum for integrity verification
    pub checksum: u64,
}

impl ModelArtifact {
    /// Magic bytes for house-price trainer artifacts
    pub const MAGIC: [u8; 4] = *b"HPTM";
    /// Pinned format version; readers reject anything else
    pub const FORMAT_VERSION: u32 = 1;

    pub fn new(estimator: &Estimator, metadata: ArtifactMetadata) -> Result<Self> {
        let payload = bincode::serialize(estimator)?;
        let checksum = Self::compute_checksum(&payload);
        Ok(Self {
            magic: Self::MAGIC,
            format_version: Self::FORMAT_VERSION,
            metadata,
            payload,
            checksum,
        })
    }

    /// Compute checksum using FNV-1a hash
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    pub fn verify_checksum(&self) -> bool {
        Self::compute_checksum(&self.payload) == self.checksum
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode and verify an artifact, returning the estimator and its metadata
    pub fn from_bytes(bytes: &[u8]) -> Result<(Estimator, ArtifactMetadata)> {
        if bytes.len() < 4 || bytes[..4] != Self::MAGIC {
            return Err(TrainerError::ArtifactError(
                "not a model artifact (bad magic bytes)".to_string(),
            ));
        }

        let artifact: ModelArtifact = bincode::deserialize(bytes)?;

        if artifact.format_version != Self::FORMAT_VERSION {
            return Err(TrainerError::ArtifactError(format!(
                "unsupported artifact format version {} (expected {})",
                artifact.format_version,
                Self::FORMAT_VERSION
            )));
        }
        if !artifact.verify_checksum() {
            return Err(TrainerError::ArtifactError(
                "checksum verification failed - file may be corrupted".to_string(),
            ));
        }

        let estimator: Estimator = bincode::deserialize(&artifact.payload)?;
        if estimator.kind() != artifact.metadata.estimator {
            return Err(TrainerError::ArtifactError(format!(
                "metadata says {} but payload holds {}",
                artifact.metadata.estimator,
                estimator.kind()
            )));
        }

        Ok((estimator, artifact.metadata))
    }
}

/// Write the estimator to `<model_dir>/model.joblib`, creating the directory first.
///
/// Returns the artifact location.
pub fn save_artifact(
    storage: &dyn Storage,
    model_dir: &Location,
    estimator: &Estimator,
    metadata: ArtifactMetadata,
) -> Result<Location> {
    storage.ensure_dir(model_dir)?;

    let target = model_dir.join(MODEL_FILENAME);
    info!("saving model to {}", target);

    let bytes = ModelArtifact::new(estimator, metadata)
        .and_then(|artifact| artifact.to_bytes())
        .map_err(|e| TrainerError::save(target.to_string(), e))?;
    debug!(bytes = bytes.len(), backend = storage.name(), "encoded artifact");

    storage.write(&target, &bytes)?;
    Ok(target)
}

/// Read and verify an artifact written by [`save_artifact`]
pub fn load_artifact(
    storage: &dyn Storage,
    location: &Location,
) -> Result<(Estimator, ArtifactMetadata)> {
    let bytes = storage.read(location)?;
    ModelArtifact::from_bytes(&bytes)
}
