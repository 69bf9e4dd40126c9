//! House-price trainer - batch training job for the house-price regression model
//!
//! Loads a CSV data set, fits an ordinary least squares model (optionally
//! behind feature standardization) and writes the fitted estimator as a
//! single artifact to a local directory or a cloud bucket.
//!
//! # Modules
//!
//! - [`schema`] - Feature/target columns shared by training and inference
//! - [`storage`] - Local filesystem and object store access
//! - [`utils`] - CSV loading and frame-to-matrix projection
//! - [`preprocessing`] - Feature standardization
//! - [`training`] - OLS, the scaled pipeline and the training job
//! - [`export`] - Artifact serialization
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod schema;
pub mod storage;
pub mod utils;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod export;

// Services
pub mod cli;

pub use error::{ErrorKind, Result, TrainerError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ErrorKind, Result, TrainerError};
    pub use crate::export::{load_artifact, save_artifact, ArtifactMetadata, ModelArtifact};
    pub use crate::preprocessing::StandardScaler;
    pub use crate::schema::FeatureSchema;
    pub use crate::storage::{Location, LocalStorage, ObjectStorage, Storage};
    pub use crate::training::{
        Estimator, EstimatorKind, JobConfig, LinearRegression, TrainOutcome, TrainingJob,
    };
    pub use crate::utils::DataLoader;
}
