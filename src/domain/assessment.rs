//! Prediction and assessment result types.

use serde::{Deserialize, Serialize};

use super::id::new_assessment_id;
use super::recommendations::{recommendations_for, TierGuidance};
use super::scoring::{AnxietyLevel, DepressionLevel, RiskLevel};

/// Probability assigned to one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierProbability {
    pub tier: RiskLevel,
    pub probability: f64,
}

/// Per-tier probabilities in the classifier's own class order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceDistribution(Vec<TierProbability>);

impl ConfidenceDistribution {
    /// Pair `probabilities` with `classes` positionally.
    #[must_use]
    pub fn from_classes(classes: &[RiskLevel], probabilities: &[f64]) -> Self {
        debug_assert_eq!(classes.len(), probabilities.len());
        Self(
            classes
                .iter()
                .zip(probabilities)
                .map(|(&tier, &probability)| TierProbability { tier, probability })
                .collect(),
        )
    }

    /// Probability of `tier`; tiers the classifier never saw get zero.
    #[must_use]
    pub fn probability_of(&self, tier: RiskLevel) -> f64 {
        self.0
            .iter()
            .find(|p| p.tier == tier)
            .map_or(0.0, |p| p.probability)
    }

    /// Most probable tier. The first class wins ties.
    #[must_use]
    pub fn argmax(&self) -> Option<RiskLevel> {
        let mut best: Option<&TierProbability> = None;
        for entry in &self.0 {
            if best.map_or(true, |b| entry.probability > b.probability) {
                best = Some(entry);
            }
        }
        best.map(|b| b.tier)
    }

    #[must_use]
    pub fn entries(&self) -> &[TierProbability] {
        &self.0
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().map(|p| p.probability).sum()
    }
}

/// Classifier output for one respondent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub tier: RiskLevel,
    pub confidence: ConfidenceDistribution,
}

impl RiskPrediction {
    /// Probability of the predicted tier.
    #[must_use]
    pub fn tier_confidence(&self) -> f64 {
        self.confidence.probability_of(self.tier)
    }
}

/// Everything shown to the respondent after submitting the screening.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentOutcome {
    /// Unique identifier
    pub id: String,

    pub depression_score: u32,
    pub depression_level: DepressionLevel,
    pub anxiety_score: u32,
    pub anxiety_level: AnxietyLevel,

    /// Learned classifier result
    pub prediction: RiskPrediction,

    /// Static guidance for the predicted tier
    pub guidance: &'static TierGuidance,

    /// Timestamp of the assessment
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl AssessmentOutcome {
    #[must_use]
    pub fn new(
        depression_score: u32,
        depression_level: DepressionLevel,
        anxiety_score: u32,
        anxiety_level: AnxietyLevel,
        prediction: RiskPrediction,
    ) -> Self {
        Self {
            id: new_assessment_id(),
            depression_score,
            depression_level,
            anxiety_score,
            anxiety_level,
            guidance: recommendations_for(prediction.tier),
            prediction,
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_uses_given_class_order() {
        // Alphabetical label order, as produced by the label encoder
        let classes = [RiskLevel::High, RiskLevel::Low, RiskLevel::Moderate];
        let dist = ConfidenceDistribution::from_classes(&classes, &[0.1, 0.7, 0.2]);

        assert!((dist.probability_of(RiskLevel::Low) - 0.7).abs() < 1e-12);
        assert!((dist.probability_of(RiskLevel::High) - 0.1).abs() < 1e-12);
        assert_eq!(dist.argmax(), Some(RiskLevel::Low));
        assert!((dist.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_tier_has_zero_probability() {
        let dist =
            ConfidenceDistribution::from_classes(&[RiskLevel::Low, RiskLevel::Moderate], &[0.4, 0.6]);
        assert_eq!(dist.probability_of(RiskLevel::High), 0.0);
    }

    #[test]
    fn test_argmax_tie_keeps_first() {
        let dist =
            ConfidenceDistribution::from_classes(&[RiskLevel::Moderate, RiskLevel::Low], &[0.5, 0.5]);
        assert_eq!(dist.argmax(), Some(RiskLevel::Moderate));
    }

    #[test]
    fn test_outcome_creation() {
        let prediction = RiskPrediction {
            tier: RiskLevel::High,
            confidence: ConfidenceDistribution::from_classes(&[RiskLevel::High], &[1.0]),
        };
        let outcome = AssessmentOutcome::new(
            22,
            DepressionLevel::Severe,
            18,
            AnxietyLevel::Severe,
            prediction,
        );
        assert_eq!(outcome.guidance.tier, RiskLevel::High);
        assert_eq!(outcome.id.len(), 36);
        assert!((outcome.prediction.tier_confidence() - 1.0).abs() < f64::EPSILON);
    }
}
