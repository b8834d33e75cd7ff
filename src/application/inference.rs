//! Inference service: scores one respondent against the trained artifact.
//!
//! The artifact is loaded once and shared read-only; every call is
//! independent and side-effect free.

use std::sync::Arc;

use serde::Deserialize;

use super::artifact::TrainedArtifact;
use crate::adapters::StorageError;
use crate::domain::{
    anxiety_level, depression_level, AssessmentOutcome, ClinicalRecord, FeatureVector,
    Questionnaire, QuestionnaireResponses, RiskPrediction, ScoreError,
};
use crate::ports::{ArtifactStore, RiskClassifier};
use crate::MindscopeError;

/// Request accepted by the assessment CLI.
///
/// When both answer lists are present they replace the record's sub-scores.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    #[serde(flatten)]
    pub record: ClinicalRecord,
    #[serde(default)]
    pub phq9_answers: Option<Vec<u8>>,
    #[serde(default)]
    pub gad7_answers: Option<Vec<u8>>,
}

/// Service for running risk inference.
#[derive(Clone)]
pub struct InferenceService {
    artifact: Arc<TrainedArtifact>,
}

impl InferenceService {
    /// Load the artifact from `store`.
    ///
    /// # Errors
    /// Returns `MissingArtifact` or `CorruptArtifact` if the bundle is absent
    /// or invalid.
    pub fn load<S>(store: &S) -> Result<Self, MindscopeError>
    where
        S: ArtifactStore,
        S::Error: Into<StorageError>,
    {
        tracing::info!("Initializing inference service...");
        let artifact = TrainedArtifact::load(store)?;
        Ok(Self::from_artifact(Arc::new(artifact)))
    }

    #[must_use]
    pub fn from_artifact(artifact: Arc<TrainedArtifact>) -> Self {
        Self { artifact }
    }

    #[must_use]
    pub fn artifact(&self) -> &TrainedArtifact {
        &self.artifact
    }

    /// Predicted tier and per-class confidence for one record.
    ///
    /// # Errors
    /// - `Score` if a sub-score is outside its scale
    /// - `Validation` for invalid numeric input
    /// - `Encoding` if a categorical value was never seen in training
    pub fn predict(&self, record: &ClinicalRecord) -> Result<RiskPrediction, MindscopeError> {
        depression_level(i64::from(record.depression_score))?;
        anxiety_level(i64::from(record.anxiety_score))?;
        record
            .validate()
            .map_err(|errors| MindscopeError::Validation(errors.join("; ")))?;

        let features = FeatureVector::build(record, &self.artifact.encoders)?;
        tracing::debug!(features = ?features.as_slice(), "Built feature vector");

        let prediction = self.artifact.classifier.predict(&features);
        tracing::info!(
            tier = %prediction.tier,
            confidence = prediction.tier_confidence(),
            "Inference complete"
        );
        Ok(prediction)
    }

    /// Full assessment: severity levels, predicted tier and guidance.
    ///
    /// # Errors
    /// Same as [`InferenceService::predict`].
    pub fn assess(&self, record: &ClinicalRecord) -> Result<AssessmentOutcome, MindscopeError> {
        let prediction = self.predict(record)?;
        Ok(AssessmentOutcome::new(
            record.depression_score,
            depression_level(i64::from(record.depression_score))?,
            record.anxiety_score,
            anxiety_level(i64::from(record.anxiety_score))?,
            prediction,
        ))
    }

    /// Assess a CLI request, scoring item-level answers when supplied.
    ///
    /// # Errors
    /// Returns `InvalidResponses` if only one answer list is present or
    /// either is malformed, plus everything [`InferenceService::assess`]
    /// returns.
    pub fn assess_request(
        &self,
        request: AssessmentRequest,
    ) -> Result<AssessmentOutcome, MindscopeError> {
        let record = match (request.phq9_answers, request.gad7_answers) {
            (Some(phq9), Some(gad7)) => {
                let phq9 = QuestionnaireResponses::new(Questionnaire::Phq9, phq9)?;
                let gad7 = QuestionnaireResponses::new(Questionnaire::Gad7, gad7)?;
                request.record.with_responses(&phq9, &gad7)?
            }
            (None, None) => request.record,
            (Some(_), None) | (None, Some(_)) => {
                return Err(ScoreError::InvalidResponses {
                    scale: "PHQ-9/GAD-7",
                    reason: "answers must be given for both questionnaires".to_string(),
                }
                .into())
            }
        };
        self.assess(&record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::adapters::classifiers::ForestParams;
    use crate::adapters::csv_dataset::CsvDataset;
    use crate::adapters::sqlite::SqliteArtifactStore;
    use crate::application::fixtures::synthetic_csv;
    use crate::application::training::{TrainingConfig, TrainingService};
    use crate::domain::{sample_record, EncodingError, RiskLevel};

    fn trained_store() -> Arc<SqliteArtifactStore> {
        let store = Arc::new(SqliteArtifactStore::in_memory().expect("Should create db"));
        let mut config = TrainingConfig::default();
        config.params.forest = ForestParams {
            n_estimators: 20,
            ..ForestParams::default()
        };
        TrainingService::new(Arc::clone(&store), config)
            .train(&CsvDataset::from_text(synthetic_csv(200, 5)))
            .expect("Training should succeed");
        store
    }

    fn service() -> &'static InferenceService {
        static SERVICE: OnceLock<InferenceService> = OnceLock::new();
        SERVICE.get_or_init(|| {
            InferenceService::load(trained_store().as_ref()).expect("Should load artifact")
        })
    }

    #[test]
    fn test_confidence_is_a_distribution() {
        let prediction = service().predict(&sample_record()).unwrap();

        let total = prediction.confidence.total();
        assert!((total - 1.0).abs() < 1e-6);
        for entry in prediction.confidence.entries() {
            assert!((0.0..=1.0).contains(&entry.probability));
        }
        assert_eq!(prediction.confidence.argmax(), Some(prediction.tier));
    }

    #[test]
    fn test_class_order_comes_from_artifact() {
        let prediction = service().predict(&sample_record()).unwrap();
        let tiers: Vec<RiskLevel> = prediction
            .confidence
            .entries()
            .iter()
            .map(|e| e.tier)
            .collect();
        assert_eq!(tiers, service().artifact().classifier.classes());
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let record = sample_record();
        let a = service().predict(&record).unwrap();
        let b = service().predict(&record).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_category() {
        let record = ClinicalRecord {
            gender: "Unlisted".to_string(),
            ..sample_record()
        };
        let err = service().predict(&record).unwrap_err();
        assert!(matches!(
            err,
            MindscopeError::Encoding(EncodingError::UnknownCategory { ref field, ref value })
                if field == "gender" && value == "Unlisted"
        ));
    }

    #[test]
    fn test_out_of_range_score() {
        let record = ClinicalRecord {
            anxiety_score: 22,
            ..sample_record()
        };
        assert!(matches!(
            service().predict(&record),
            Err(MindscopeError::Score(ScoreError::OutOfRangeScore { .. }))
        ));
    }

    #[test]
    fn test_assess_uses_scoring_functions() {
        let record = ClinicalRecord {
            depression_score: 22,
            anxiety_score: 18,
            ..sample_record()
        };
        let outcome = service().assess(&record).unwrap();
        assert_eq!(outcome.depression_level.as_str(), "Severe");
        assert_eq!(outcome.anxiety_level.as_str(), "Severe");
        assert_eq!(outcome.guidance.tier, outcome.prediction.tier);
    }

    #[test]
    fn test_request_with_answers() {
        let json = serde_json::json!({
            "age": 29,
            "gender": "Female",
            "depressionScore": 0,
            "anxietyScore": 0,
            "stressLevel": "High",
            "sleepHours": 6.5,
            "physicalActivity": "Low",
            "chronicIllness": "No",
            "mentalHealthHistory": "Yes",
            "treatment": "Therapy",
            "treatmentDays": 45,
            "workStatus": "Employed",
            "phq9Answers": [1, 1, 1, 1, 1, 1, 1, 1, 1],
            "gad7Answers": [2, 2, 2, 2, 2, 2, 2]
        });
        let request: AssessmentRequest = serde_json::from_value(json).unwrap();
        let outcome = service().assess_request(request).unwrap();
        assert_eq!(outcome.depression_score, 9);
        assert_eq!(outcome.anxiety_score, 14);
    }

    #[test]
    fn test_request_with_one_answer_list_rejected() {
        let request = AssessmentRequest {
            record: sample_record(),
            phq9_answers: Some(vec![0; 9]),
            gad7_answers: None,
        };
        assert!(matches!(
            service().assess_request(request),
            Err(MindscopeError::Score(ScoreError::InvalidResponses { .. }))
        ));
    }

    #[test]
    fn test_missing_artifact_halts_loading() {
        let store = SqliteArtifactStore::in_memory().unwrap();
        assert!(matches!(
            InferenceService::load(&store),
            Err(MindscopeError::MissingArtifact(ref names)) if names.len() == 3
        ));
    }
}
