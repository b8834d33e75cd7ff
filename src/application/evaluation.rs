//! Classification metrics for held-out evaluation.
//!
//! Multi-class precision, recall and F1 are support-weighted averages over
//! the classes. A class with no predicted (or no true) rows contributes zero
//! instead of failing.

use serde::Serialize;

use crate::adapters::classifiers::ModelFamily;
use crate::domain::RiskLevel;

/// Weighted test-set metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Counts of (true class, predicted class) pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Row/column labels
    pub classes: Vec<RiskLevel>,
    /// `counts[true][predicted]`
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    #[must_use]
    pub fn new(classes: &[RiskLevel], y_true: &[usize], y_pred: &[usize]) -> Self {
        let n = classes.len();
        let mut counts = vec![vec![0; n]; n];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t < n && p < n {
                counts[t][p] += 1;
            }
        }
        Self {
            classes: classes.to_vec(),
            counts,
        }
    }

    /// Correctly classified rows.
    #[must_use]
    pub fn trace(&self) -> usize {
        (0..self.counts.len()).map(|i| self.counts[i][i]).sum()
    }
}

/// Evaluation of one trained family.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub family: ModelFamily,
    pub train_accuracy: f64,
    pub test: ClassificationMetrics,
    pub confusion: ConfusionMatrix,
}

/// Fraction of matching positions; zero for empty input.
#[must_use]
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Accuracy plus support-weighted precision, recall and F1.
#[must_use]
pub fn evaluate(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> ClassificationMetrics {
    let mut tp = vec![0usize; n_classes];
    let mut fp = vec![0usize; n_classes];
    let mut fn_ = vec![0usize; n_classes];
    let mut support = vec![0usize; n_classes];

    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t >= n_classes || p >= n_classes {
            continue;
        }
        support[t] += 1;
        if t == p {
            tp[t] += 1;
        } else {
            fp[p] += 1;
            fn_[t] += 1;
        }
    }

    let total: usize = support.iter().sum();
    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1 = 0.0;

    if total > 0 {
        for k in 0..n_classes {
            let weight = support[k] as f64 / total as f64;
            let p = ratio(tp[k], tp[k] + fp[k]);
            let r = ratio(tp[k], tp[k] + fn_[k]);
            let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };
            precision += weight * p;
            recall += weight * r;
            f1 += weight * f;
        }
    }

    ClassificationMetrics {
        accuracy: accuracy(y_true, y_pred),
        precision,
        recall,
        f1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [0, 1, 2, 1, 0];
        let m = evaluate(&y, &y, 3);
        assert!((m.accuracy - 1.0).abs() < 1e-12);
        assert!((m.precision - 1.0).abs() < 1e-12);
        assert!((m.recall - 1.0).abs() < 1e-12);
        assert!((m.f1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_averages() {
        // class 0: support 3, class 1: support 1
        let y_true = [0, 0, 0, 1];
        let y_pred = [0, 0, 1, 1];
        let m = evaluate(&y_true, &y_pred, 2);

        assert!((m.accuracy - 0.75).abs() < 1e-12);
        // precision: class0 = 1.0, class1 = 0.5 -> 0.75*1.0 + 0.25*0.5
        assert!((m.precision - 0.875).abs() < 1e-12);
        // recall: class0 = 2/3, class1 = 1.0 -> 0.75*(2/3) + 0.25
        assert!((m.recall - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_is_zero() {
        // Nothing predicted as class 1
        let m = evaluate(&[0, 1], &[0, 0], 2);
        assert!((m.precision - 0.25).abs() < 1e-12);
        assert!(m.f1 >= 0.0);
        assert_eq!(evaluate(&[], &[], 3).accuracy, 0.0);
    }

    #[test]
    fn test_confusion_matrix() {
        let classes = [RiskLevel::High, RiskLevel::Low, RiskLevel::Moderate];
        let cm = ConfusionMatrix::new(&classes, &[0, 1, 2, 2], &[0, 1, 1, 2]);
        assert_eq!(cm.counts[2][1], 1);
        assert_eq!(cm.trace(), 3);
    }
}
