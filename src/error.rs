//! Error types for the training job

use thiserror::Error;

/// Result type alias for trainer operations
pub type Result<T> = std::result::Result<T, TrainerError>;

/// Main error type for the training job
#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Could not load data from {path}: {reason}")]
    LoadFailure { path: String, reason: String },

    #[error("{}", schema_message(.missing, .non_numeric, .with_nulls))]
    SchemaMismatch {
        missing: Vec<String>,
        non_numeric: Vec<String>,
        with_nulls: Vec<String>,
    },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Could not save model to {path}: {reason}")]
    SaveFailure { path: String, reason: String },

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn schema_message(missing: &[String], non_numeric: &[String], with_nulls: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing columns [{}]", missing.join(", ")));
    }
    if !non_numeric.is_empty() {
        parts.push(format!("non-numeric columns [{}]", non_numeric.join(", ")));
    }
    if !with_nulls.is_empty() {
        parts.push(format!("columns with null values [{}]", with_nulls.join(", ")));
    }
    format!("Schema mismatch: {}", parts.join("; "))
}

/// Coarse failure category, used by the entry point to pick an exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Load,
    SchemaMismatch,
    Fit,
    Save,
    Artifact,
}

impl ErrorKind {
    /// Process exit code reported for this kind of failure
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::Load => 3,
            ErrorKind::SchemaMismatch => 4,
            ErrorKind::Fit => 5,
            ErrorKind::Save => 6,
            ErrorKind::Artifact => 7,
        }
    }
}

impl TrainerError {
    pub fn load(path: impl Into<String>, reason: impl ToString) -> Self {
        TrainerError::LoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn save(path: impl Into<String>, reason: impl ToString) -> Self {
        TrainerError::SaveFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TrainerError::ConfigError(_) => ErrorKind::Config,
            TrainerError::LoadFailure { .. } => ErrorKind::Load,
            TrainerError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            TrainerError::TrainingError(_)
            | TrainerError::ShapeError { .. }
            | TrainerError::ModelNotFitted => ErrorKind::Fit,
            TrainerError::SaveFailure { .. } | TrainerError::IoError(_) => ErrorKind::Save,
            TrainerError::ArtifactError(_) => ErrorKind::Artifact,
        }
    }
}

impl From<bincode::Error> for TrainerError {
    fn from(err: bincode::Error) -> Self {
        TrainerError::ArtifactError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrainerError::load("data.csv", "No such file or directory");
        assert_eq!(
            err.to_string(),
            "Could not load data from data.csv: No such file or directory"
        );
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = TrainerError::SchemaMismatch {
            missing: vec!["price".to_string()],
            non_numeric: vec!["bedrooms".to_string()],
            with_nulls: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Schema mismatch: missing columns [price]; non-numeric columns [bedrooms]"
        );
    }

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let kinds = [
            ErrorKind::Config,
            ErrorKind::Load,
            ErrorKind::SchemaMismatch,
            ErrorKind::Fit,
            ErrorKind::Save,
            ErrorKind::Artifact,
        ];
        let mut codes: Vec<u8> = kinds.iter().map(|k| k.exit_code()).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TrainerError = io_err.into();
        assert!(matches!(err, TrainerError::IoError(_)));
        assert_eq!(err.kind(), ErrorKind::Save);
    }
}
