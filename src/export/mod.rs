//! Model export and serialization module
//!
//! Writes and reads the single binary artifact produced by a training run.

mod serializer;

pub use serializer::{load_artifact, save_artifact, ArtifactMetadata, ModelArtifact};
