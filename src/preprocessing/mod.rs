//! Data preprocessing module
//!
//! Feature scaling applied ahead of the regressor in the scaled pipeline.

mod scaler;

pub use scaler::StandardScaler;
