//! # Mindscope
//!
//! Depression and anxiety self-assessment scoring with a trained
//! risk-tier classifier.
//!
//! This crate provides:
//! - PHQ-9 / GAD-7 severity scoring and rule-based risk labelling
//! - An offline training pipeline over survey exports (three model families)
//! - Persisted, integrity-checked model artifacts in SQLite
//! - Per-respondent inference with tier guidance
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (scores, records, encoders, outcomes)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (classifiers, CSV, SQLite, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `config` / `logging`: Process setup shared by the binaries

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;

pub use domain::{AssessmentOutcome, ClinicalRecord, RiskLevel, RiskPrediction};

/// Result type for Mindscope operations
pub type Result<T> = std::result::Result<T, MindscopeError>;

/// Main error type for Mindscope
#[derive(Debug, thiserror::Error)]
pub enum MindscopeError {
    #[error("Scoring failed: {0}")]
    Score(#[from] domain::ScoreError),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] domain::EncodingError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] ports::DatasetError),

    #[error("Training failed: {0}")]
    Training(#[from] application::TrainingError),

    #[error("Missing model artifacts: {}", .0.join(", "))]
    MissingArtifact(Vec<String>),

    #[error("Corrupt model artifact '{name}': {reason}")]
    CorruptArtifact { name: String, reason: String },

    #[error("Invalid assessment input: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
