//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the two use cases of the application: offline training and
//! per-respondent inference.

pub mod artifact;
mod evaluation;
mod inference;
mod split;
mod training;

#[cfg(test)]
pub(crate) mod fixtures;

pub use artifact::TrainedArtifact;
pub use evaluation::{accuracy, evaluate, ClassificationMetrics, ConfusionMatrix, ModelReport};
pub use inference::{AssessmentRequest, InferenceService};
pub use split::{stratified_split, SplitIndices};
pub use training::{
    records_from_table, TrainedModels, TrainingConfig, TrainingError, TrainingReport,
    TrainingService, REQUIRED_COLUMNS,
};
