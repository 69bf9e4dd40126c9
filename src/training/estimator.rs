//! Fitted estimators: bare OLS or a scale-then-regress pipeline

use super::config::EstimatorKind;
use super::linear_models::LinearRegression;
use crate::error::Result;
use crate::preprocessing::StandardScaler;
use crate::schema::FeatureSchema;
use crate::utils::feature_matrix;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Standardization followed by linear regression, fitted and applied as one unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaledLinearPipeline {
    pub scaler: StandardScaler,
    pub regressor: LinearRegression,
}

impl ScaledLinearPipeline {
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let scaled = self.scaler.fit_transform(x)?;
        self.regressor.fit(&scaled, y)?;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.regressor.predict(&scaled)
    }
}

/// The model object persisted in an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Estimator {
    Linear(LinearRegression),
    ScaledLinear(ScaledLinearPipeline),
}

impl Estimator {
    /// Unfitted estimator of the requested kind
    pub fn new(kind: EstimatorKind) -> Self {
        match kind {
            EstimatorKind::LinearRegression => Estimator::Linear(LinearRegression::new()),
            EstimatorKind::ScaledLinearRegression => {
                Estimator::ScaledLinear(ScaledLinearPipeline::default())
            }
        }
    }

    pub fn kind(&self) -> EstimatorKind {
        match self {
            Estimator::Linear(_) => EstimatorKind::LinearRegression,
            Estimator::ScaledLinear(_) => EstimatorKind::ScaledLinearRegression,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        match self {
            Estimator::Linear(model) => {
                model.fit(x, y)?;
            }
            Estimator::ScaledLinear(pipeline) => {
                pipeline.fit(x, y)?;
            }
        }
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Estimator::Linear(model) => model.predict(x),
            Estimator::ScaledLinear(pipeline) => pipeline.predict(x),
        }
    }

    /// Predict from a frame holding the schema's feature columns
    pub fn predict_frame(&self, df: &DataFrame, schema: &FeatureSchema) -> Result<Array1<f64>> {
        let x = feature_matrix(df, schema)?;
        self.predict(&x)
    }

    /// R² on the given data
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        match self {
            Estimator::Linear(model) => model.score(x, y),
            Estimator::ScaledLinear(pipeline) => {
                let scaled = pipeline.scaler.transform(x)?;
                pipeline.regressor.score(&scaled, y)
            }
        }
    }

    pub fn regressor(&self) -> &LinearRegression {
        match self {
            Estimator::Linear(model) => model,
            Estimator::ScaledLinear(pipeline) => &pipeline.regressor,
        }
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        match self {
            Estimator::Linear(_) => None,
            Estimator::ScaledLinear(pipeline) => Some(&pipeline.scaler),
        }
    }
}
