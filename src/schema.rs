//! Feature schema shared by training and inference
//!
//! The schema is the single definition of which columns feed the model and
//! which column is the regression target. It is stored inside every artifact
//! so that a loaded model can project new data the same way it was trained.

use crate::error::{Result, TrainerError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Current schema version for the house-price model
pub const SCHEMA_VERSION: u32 = 1;

/// Ordered feature columns plus target column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub features: Vec<String>,
    pub target: String,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::house_prices()
    }
}

impl FeatureSchema {
    pub fn new(features: &[&str], target: &str) -> Self {
        Self {
            version: SCHEMA_VERSION,
            features: features.iter().map(|s| s.to_string()).collect(),
            target: target.to_string(),
        }
    }

    /// `bedrooms`, `bathrooms`, `sq_footage` → `price`
    pub fn house_prices() -> Self {
        Self::new(&["bedrooms", "bathrooms", "sq_footage"], "price")
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Check that every feature column is present, numeric and null-free.
    pub fn validate_features(&self, df: &DataFrame) -> Result<()> {
        check_columns(df, self.features.iter())
    }

    /// Check features and target. Extra columns are ignored.
    pub fn validate(&self, df: &DataFrame) -> Result<()> {
        check_columns(df, self.features.iter().chain(std::iter::once(&self.target)))
    }
}

fn check_columns<'a>(df: &DataFrame, names: impl Iterator<Item = &'a String>) -> Result<()> {
    let mut missing = Vec::new();
    let mut non_numeric = Vec::new();
    let mut with_nulls = Vec::new();

    for name in names {
        match df.column(name) {
            Err(_) => missing.push(name.clone()),
            Ok(column) => {
                let dtype = column.dtype();
                if !(dtype.is_integer() || dtype.is_float()) {
                    non_numeric.push(name.clone());
                } else if column.null_count() > 0 {
                    with_nulls.push(name.clone());
                }
            }
        }
    }

    if missing.is_empty() && non_numeric.is_empty() && with_nulls.is_empty() {
        Ok(())
    } else {
        Err(TrainerError::SchemaMismatch {
            missing,
            non_numeric,
            with_nulls,
        })
    }
}
