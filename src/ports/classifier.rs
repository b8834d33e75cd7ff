//! Classifier port: the capability every trained risk model exposes.
//!
//! Concrete model families live in `adapters::classifiers`.

use crate::domain::{ConfidenceDistribution, FeatureVector, RiskLevel, RiskPrediction};

/// A fitted multi-class risk classifier.
pub trait RiskClassifier: Send + Sync {
    /// Tiers in the model's internal class order.
    ///
    /// `predict_proba` returns probabilities in exactly this order.
    fn classes(&self) -> &[RiskLevel];

    /// Per-class probabilities for one feature vector.
    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64>;

    /// Most probable class index for one feature vector.
    fn predict_index(&self, features: &FeatureVector) -> usize {
        argmax(&self.predict_proba(features))
    }

    /// Predicted tier plus the full distribution.
    fn predict(&self, features: &FeatureVector) -> RiskPrediction {
        let probabilities = self.predict_proba(features);
        let classes = self.classes();
        let tier = classes[argmax(&probabilities)];
        let confidence = ConfidenceDistribution::from_classes(classes, &probabilities);
        RiskPrediction { tier, confidence }
    }
}

/// Index of the largest value; the first one wins ties.
#[must_use]
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.9]), 0);
        assert_eq!(argmax(&[]), 0);
    }
}
