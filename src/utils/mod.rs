//! Utility functions and helpers

pub mod data_loader;

pub use data_loader::{feature_matrix, features_and_target, DataLoader};
