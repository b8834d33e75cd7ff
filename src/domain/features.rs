//! Fixed-order numeric feature vector consumed by the risk classifiers.

use serde::{Deserialize, Serialize};

use super::encoder::{CategoricalField, EncoderSet, EncodingError};
use super::record::ClinicalRecord;

/// Number of model inputs.
pub const NUM_FEATURES: usize = 12;

/// Column order shared by training and inference.
///
/// Persisted next to every trained model; a model must never be fed a
/// vector assembled in any other order.
pub const FEATURE_COLUMNS: [&str; NUM_FEATURES] = [
    "Age",
    "Gender_Encoded",
    "Depression_Score",
    "Anxiety_Score",
    "Stress_Level_Encoded",
    "Sleep_Hours",
    "Physical_Activity_Encoded",
    "Chronic_Illness_Encoded",
    "Mental_Health_History_Encoded",
    "Treatment_Encoded",
    "Days_of_Treatment",
    "Work_Status_Encoded",
];

/// Owned copy of [`FEATURE_COLUMNS`], the form persisted with the model.
#[must_use]
pub fn feature_columns() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|c| (*c).to_string()).collect()
}

/// One encoded respondent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; NUM_FEATURES]);

impl FeatureVector {
    /// Encode a record's categoricals and lay out all twelve values.
    ///
    /// # Errors
    /// Returns `EncodingError::UnknownCategory` if any categorical value is
    /// outside its encoder's domain.
    pub fn build(record: &ClinicalRecord, encoders: &EncoderSet) -> Result<Self, EncodingError> {
        let code = |field: CategoricalField| -> Result<f64, EncodingError> {
            encoders
                .encode(field, record.categorical(field))
                .map(|c| c as f64)
        };

        Ok(Self([
            f64::from(record.age),
            code(CategoricalField::Gender)?,
            f64::from(record.depression_score),
            f64::from(record.anxiety_score),
            code(CategoricalField::StressLevel)?,
            record.sleep_hours,
            code(CategoricalField::PhysicalActivity)?,
            code(CategoricalField::ChronicIllness)?,
            code(CategoricalField::MentalHealthHistory)?,
            code(CategoricalField::Treatment)?,
            f64::from(record.treatment_days),
            code(CategoricalField::WorkStatus)?,
        ]))
    }

    #[must_use]
    pub fn from_array(values: [f64; NUM_FEATURES]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> f64 {
        self.0[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::sample_record;

    fn encoders_for(records: &[ClinicalRecord]) -> EncoderSet {
        EncoderSet::fit(|field| records.iter().map(move |r| r.categorical(field)))
    }

    #[test]
    fn test_column_order() {
        let record = sample_record();
        let other = ClinicalRecord {
            gender: "Male".to_string(),
            work_status: "Student".to_string(),
            ..sample_record()
        };
        let encoders = encoders_for(&[record.clone(), other]);
        let v = FeatureVector::build(&record, &encoders).expect("Should encode");

        assert_eq!(v.as_slice().len(), NUM_FEATURES);
        assert!((v.get(0) - 29.0).abs() < f64::EPSILON);
        assert!((v.get(1) - 0.0).abs() < f64::EPSILON); // Female < Male
        assert!((v.get(2) - 12.0).abs() < f64::EPSILON);
        assert!((v.get(3) - 10.0).abs() < f64::EPSILON);
        assert!((v.get(5) - 6.5).abs() < f64::EPSILON);
        assert!((v.get(10) - 45.0).abs() < f64::EPSILON);
        assert!((v.get(11) - 0.0).abs() < f64::EPSILON); // Employed < Student
    }

    #[test]
    fn test_build_is_deterministic() {
        let record = sample_record();
        let encoders = encoders_for(std::slice::from_ref(&record));
        let a = FeatureVector::build(&record, &encoders).unwrap();
        let b = FeatureVector::build(&record, &encoders).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_category_propagates() {
        let record = sample_record();
        let encoders = encoders_for(std::slice::from_ref(&record));
        let unseen = ClinicalRecord {
            stress_level: "Extreme".to_string(),
            ..record
        };
        let err = FeatureVector::build(&unseen, &encoders).unwrap_err();
        assert!(matches!(err, EncodingError::UnknownCategory { ref field, .. } if field == "stress"));
    }

    #[test]
    fn test_feature_columns_owned_copy() {
        let cols = feature_columns();
        assert_eq!(cols.len(), NUM_FEATURES);
        assert_eq!(cols[0], "Age");
        assert_eq!(cols[11], "Work_Status_Encoded");
    }
}
