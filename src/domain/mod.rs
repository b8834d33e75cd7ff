//! Domain layer: Core assessment types and scoring rules.
//!
//! This module contains pure Rust types with no I/O.
//! All types are serializable and validate their own invariants.

mod assessment;
pub mod encoder;
mod features;
mod id;
mod questionnaire;
mod recommendations;
mod record;
pub mod scoring;

pub use assessment::{AssessmentOutcome, ConfidenceDistribution, RiskPrediction, TierProbability};
pub use encoder::{CategoricalEncoder, CategoricalField, EncoderSet, EncodingError};
pub use features::{feature_columns, FeatureVector, FEATURE_COLUMNS, NUM_FEATURES};
pub use id::new_assessment_id;
pub use questionnaire::{Questionnaire, QuestionnaireResponses, ANSWER_SCALE};
pub use recommendations::{recommendations_for, GuidanceCategory, TierGuidance};
pub use record::{ClinicalRecord, RawClinicalRecord, NO_TREATMENT};
pub use scoring::{
    anxiety_level, depression_level, risk_level, AnxietyLevel, DepressionLevel, RiskLevel,
    ScoreError,
};

#[cfg(test)]
pub(crate) use record::sample_record;
