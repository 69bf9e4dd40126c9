//! Model training module
//!
//! - [`LinearRegression`]: ordinary least squares, closed form
//! - [`Estimator`]: bare regression or the scale-then-regress pipeline
//! - [`TrainingJob`]: one end-to-end run from CSV to artifact

mod config;
mod estimator;
mod job;
pub mod linear_models;

pub use config::{
    EstimatorKind, JobConfig, DEFAULT_DATA_PATH, DEFAULT_MODEL_DIR, MODEL_DIR_ENV, MODEL_FILENAME,
};
pub use estimator::{Estimator, ScaledLinearPipeline};
pub use job::{TrainOutcome, TrainingJob};
pub use linear_models::LinearRegression;
