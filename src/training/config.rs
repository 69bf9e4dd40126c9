//! Training job configuration

use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Local default for the input CSV
pub const DEFAULT_DATA_PATH: &str = "data.csv";

/// Local default for the artifact directory
pub const DEFAULT_MODEL_DIR: &str = "./local_model_output";

/// Platform-provided artifact directory (set by managed training services)
pub const MODEL_DIR_ENV: &str = "AIP_MODEL_DIR";

/// File name of the artifact inside the model directory
pub const MODEL_FILENAME: &str = "model.joblib";

/// Which estimator the job fits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EstimatorKind {
    /// OLS on raw features
    #[default]
    LinearRegression,
    /// Standardization followed by OLS
    ScaledLinearRegression,
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorKind::LinearRegression => write!(f, "linear_regression"),
            EstimatorKind::ScaledLinearRegression => write!(f, "standard_scaler+linear_regression"),
        }
    }
}

/// Configuration for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// CSV source, local path or bucket URI
    pub data_path: String,

    /// Artifact directory, local path or bucket URI
    pub model_dir: String,

    /// Estimator to fit
    pub estimator: EstimatorKind,

    /// Feature and target columns
    pub schema: FeatureSchema,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            data_path: DEFAULT_DATA_PATH.to_string(),
            model_dir: DEFAULT_MODEL_DIR.to_string(),
            estimator: EstimatorKind::default(),
            schema: FeatureSchema::house_prices(),
        }
    }
}

impl JobConfig {
    pub fn new(data_path: impl Into<String>, model_dir: impl Into<String>) -> Self {
        Self {
            data_path: data_path.into(),
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_estimator(mut self, estimator: EstimatorKind) -> Self {
        self.estimator = estimator;
        self
    }

    /// Shorthand for choosing the scaled pipeline
    pub fn with_scaling(self, scale: bool) -> Self {
        self.with_estimator(if scale {
            EstimatorKind::ScaledLinearRegression
        } else {
            EstimatorKind::LinearRegression
        })
    }

    pub fn with_schema(mut self, schema: FeatureSchema) -> Self {
        self.schema = schema;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JobConfig::default();
        assert_eq!(config.data_path, "data.csv");
        assert_eq!(config.model_dir, "./local_model_output");
        assert_eq!(config.estimator, EstimatorKind::LinearRegression);
        assert_eq!(config.schema, FeatureSchema::house_prices());
    }

    #[test]
    fn test_builder() {
        let config = JobConfig::new("gs://b/data.csv", "gs://b/models").with_scaling(true);
        assert_eq!(config.estimator, EstimatorKind::ScaledLinearRegression);
        assert_eq!(config.model_dir, "gs://b/models");
    }
}
