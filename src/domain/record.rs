//! Respondent records: the complete inference input and the partially
//! populated rows read from training datasets.

use serde::{Deserialize, Serialize};

use super::encoder::CategoricalField;
use super::questionnaire::{Questionnaire, QuestionnaireResponses};
use super::scoring::{ScoreError, GAD7_MAX_SCORE, PHQ9_MAX_SCORE};

/// Complete answers for one respondent.
///
/// This is the request record handed to the inference service by the UI,
/// and the shape of every training row after imputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalRecord {
    pub age: u32,
    pub gender: String,
    /// PHQ-9 sub-score (0-27)
    pub depression_score: u32,
    /// GAD-7 sub-score (0-21)
    pub anxiety_score: u32,
    /// Low / Moderate / High / Severe
    pub stress_level: String,
    pub sleep_hours: f64,
    /// Low / Moderate / High
    pub physical_activity: String,
    /// Yes / No
    pub chronic_illness: String,
    /// Yes / No
    pub mental_health_history: String,
    /// None / Medication / Therapy / Both
    pub treatment: String,
    pub treatment_days: u32,
    pub work_status: String,
}

impl ClinicalRecord {
    /// Raw string value of a categorical field.
    #[must_use]
    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::StressLevel => &self.stress_level,
            CategoricalField::PhysicalActivity => &self.physical_activity,
            CategoricalField::ChronicIllness => &self.chronic_illness,
            CategoricalField::MentalHealthHistory => &self.mental_health_history,
            CategoricalField::Treatment => &self.treatment,
            CategoricalField::WorkStatus => &self.work_status,
        }
    }

    /// Replace both sub-scores with totals from item-level answers.
    ///
    /// # Errors
    /// Returns `ScoreError::InvalidResponses` if the responses belong to the
    /// wrong instruments.
    pub fn with_responses(
        mut self,
        phq9: &QuestionnaireResponses,
        gad7: &QuestionnaireResponses,
    ) -> Result<Self, ScoreError> {
        for (responses, expected) in [(phq9, Questionnaire::Phq9), (gad7, Questionnaire::Gad7)] {
            if responses.questionnaire() != expected {
                return Err(ScoreError::InvalidResponses {
                    scale: expected.name(),
                    reason: format!("got {} responses", responses.questionnaire().name()),
                });
            }
        }
        self.depression_score = phq9.sub_score();
        self.anxiety_score = gad7.sub_score();
        Ok(self)
    }

    /// Validate numeric fields.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.depression_score > PHQ9_MAX_SCORE {
            errors.push(format!(
                "Depression score {} out of range [0, {}]",
                self.depression_score, PHQ9_MAX_SCORE
            ));
        }
        if self.anxiety_score > GAD7_MAX_SCORE {
            errors.push(format!(
                "Anxiety score {} out of range [0, {}]",
                self.anxiety_score, GAD7_MAX_SCORE
            ));
        }
        if !self.sleep_hours.is_finite() || self.sleep_hours < 0.0 {
            errors.push(format!("Sleep hours {} must be >= 0", self.sleep_hours));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A dataset row before imputation.
///
/// Only the three columns with training-time imputation rules may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClinicalRecord {
    pub age: u32,
    pub gender: String,
    pub depression_score: u32,
    pub anxiety_score: u32,
    pub stress_level: String,
    pub sleep_hours: Option<f64>,
    pub physical_activity: Option<String>,
    pub chronic_illness: String,
    pub mental_health_history: String,
    pub treatment: Option<String>,
    pub treatment_days: u32,
    pub work_status: String,
}

impl RawClinicalRecord {
    /// Fill the missing values with the dataset-level substitutes.
    #[must_use]
    pub fn complete(self, sleep_fill: f64, activity_fill: &str) -> ClinicalRecord {
        ClinicalRecord {
            age: self.age,
            gender: self.gender,
            depression_score: self.depression_score,
            anxiety_score: self.anxiety_score,
            stress_level: self.stress_level,
            sleep_hours: self.sleep_hours.unwrap_or(sleep_fill),
            physical_activity: self
                .physical_activity
                .unwrap_or_else(|| activity_fill.to_string()),
            chronic_illness: self.chronic_illness,
            mental_health_history: self.mental_health_history,
            treatment: self.treatment.unwrap_or_else(|| NO_TREATMENT.to_string()),
            treatment_days: self.treatment_days,
            work_status: self.work_status,
        }
    }
}

/// Treatment value assumed when the dataset leaves it blank.
pub const NO_TREATMENT: &str = "None";

#[cfg(test)]
pub(crate) fn sample_record() -> ClinicalRecord {
    ClinicalRecord {
        age: 29,
        gender: "Female".to_string(),
        depression_score: 12,
        anxiety_score: 10,
        stress_level: "High".to_string(),
        sleep_hours: 6.5,
        physical_activity: "Low".to_string(),
        chronic_illness: "No".to_string(),
        mental_health_history: "Yes".to_string(),
        treatment: "Therapy".to_string(),
        treatment_days: 45,
        work_status: "Employed".to_string(),
    }
}
