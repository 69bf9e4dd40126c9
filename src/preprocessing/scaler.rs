//! Feature standardization

use crate::error::{Result, TrainerError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standard scaling (z-score normalization): (x - mean) / std
///
/// The spread is the sample standard deviation (ddof = 1) of each training
/// column. Columns with no spread keep a scale of 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature training mean
    pub mean: Option<Array1<f64>>,
    /// Per-feature divisor
    pub scale: Option<Array1<f64>>,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            mean: None,
            scale: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.scale.is_some()
    }

    /// Learn per-column mean and scale from the training matrix
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(TrainerError::TrainingError(
                "cannot fit scaler on empty data".to_string(),
            ));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| TrainerError::TrainingError("empty feature matrix".to_string()))?;

        // A single row has no sample spread; ddof = 1 is undefined there.
        let scale = if x.nrows() > 1 {
            x.std_axis(Axis(0), 1.0)
                .mapv(|s| if s == 0.0 || !s.is_finite() { 1.0 } else { s })
        } else {
            Array1::ones(x.ncols())
        };

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(self)
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(TrainerError::ModelNotFitted),
        };

        if x.ncols() != mean.len() {
            return Err(TrainerError::ShapeError {
                expected: format!("{} features", mean.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok((x - mean) / scale)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(TrainerError::ModelNotFitted),
        };
        Ok(x * scale + mean)
    }
}
