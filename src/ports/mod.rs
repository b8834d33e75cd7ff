//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (model families, artifact
//! storage, dataset sources).

mod artifact_store;
mod classifier;
mod dataset;

pub use artifact_store::{ArtifactInfo, ArtifactStore};
pub use classifier::{argmax, RiskClassifier};
pub use dataset::{DatasetError, DatasetSource, TrainingTable};
