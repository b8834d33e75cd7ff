//! Multinomial logistic regression (softmax) with L2 regularization.
//!
//! Features are standardized with statistics captured at fit time; the
//! scaler is part of the fitted model so inference applies the same
//! transform.

use serde::{Deserialize, Serialize};

use super::ModelError;
use crate::domain::{FeatureVector, NUM_FEATURES};

/// Hyperparameters for gradient-descent training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Maximum full-batch iterations
    pub max_iter: usize,
    /// Step size
    pub learning_rate: f64,
    /// Stop once every gradient component is below this
    pub tolerance: f64,
    /// Inverse regularization strength (larger = weaker penalty)
    pub c: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 0.5,
            tolerance: 1e-6,
            c: 1.0,
        }
    }
}

/// Fitted softmax regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// One weight row per class, over standardized features
    weights: Vec<[f64; NUM_FEATURES]>,
    intercepts: Vec<f64>,
    scaler_mean: [f64; NUM_FEATURES],
    scaler_std: [f64; NUM_FEATURES],
    /// Iterations actually run
    n_iter: usize,
}

fn softmax_in_place(logits: &mut [f64]) {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for z in logits.iter_mut() {
        *z = (*z - max).exp();
        sum += *z;
    }
    for z in logits.iter_mut() {
        *z /= sum;
    }
}

impl LogisticRegression {
    /// Fit by full-batch gradient descent on the mean cross-entropy plus
    /// `||W||² / (2·C·n)`.
    ///
    /// # Errors
    /// Returns `ModelError` on empty or mismatched input or invalid parameters.
    pub fn fit(
        x: &[FeatureVector],
        y: &[usize],
        n_classes: usize,
        params: &LogisticParams,
    ) -> Result<Self, ModelError> {
        super::check_training_input(x, y, n_classes)?;
        if params.c <= 0.0 || params.learning_rate <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "C and learning rate must be positive (C={}, lr={})",
                params.c, params.learning_rate
            )));
        }

        let n = x.len() as f64;
        let (scaler_mean, scaler_std) = standardization(x);
        let z: Vec<[f64; NUM_FEATURES]> = x
            .iter()
            .map(|v| standardize(v, &scaler_mean, &scaler_std))
            .collect();

        let mut model = Self {
            weights: vec![[0.0; NUM_FEATURES]; n_classes],
            intercepts: vec![0.0; n_classes],
            scaler_mean,
            scaler_std,
            n_iter: 0,
        };

        let penalty = 1.0 / (params.c * n);
        let mut probs = vec![0.0; n_classes];

        for iter in 0..params.max_iter {
            let mut w_grad = vec![[0.0; NUM_FEATURES]; n_classes];
            let mut b_grad = vec![0.0; n_classes];

            for (row, &label) in z.iter().zip(y) {
                model.class_probabilities(row, &mut probs);
                for k in 0..n_classes {
                    let error = probs[k] - if k == label { 1.0 } else { 0.0 };
                    b_grad[k] += error;
                    for (g, &xj) in w_grad[k].iter_mut().zip(row) {
                        *g += error * xj;
                    }
                }
            }

            let mut max_grad: f64 = 0.0;
            for k in 0..n_classes {
                b_grad[k] /= n;
                max_grad = max_grad.max(b_grad[k].abs());
                model.intercepts[k] -= params.learning_rate * b_grad[k];

                for j in 0..NUM_FEATURES {
                    let g = w_grad[k][j] / n + penalty * model.weights[k][j];
                    max_grad = max_grad.max(g.abs());
                    model.weights[k][j] -= params.learning_rate * g;
                }
            }

            model.n_iter = iter + 1;
            if max_grad < params.tolerance {
                break;
            }
        }

        if model.n_iter == params.max_iter {
            tracing::debug!(
                max_iter = params.max_iter,
                "Logistic regression reached max_iter before converging"
            );
        }

        Ok(model)
    }

    fn class_probabilities(&self, standardized: &[f64; NUM_FEATURES], out: &mut [f64]) {
        for (k, logit) in out.iter_mut().enumerate() {
            *logit = self.intercepts[k]
                + self.weights[k]
                    .iter()
                    .zip(standardized)
                    .map(|(w, v)| w * v)
                    .sum::<f64>();
        }
        softmax_in_place(out);
    }

    /// Softmax class probabilities for one feature vector.
    #[must_use]
    pub fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let z = standardize(features, &self.scaler_mean, &self.scaler_std);
        let mut probs = vec![0.0; self.intercepts.len()];
        self.class_probabilities(&z, &mut probs);
        probs
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.intercepts.len()
    }
}

/// Per-column mean and standard deviation; constant columns get std 1.
fn standardization(x: &[FeatureVector]) -> ([f64; NUM_FEATURES], [f64; NUM_FEATURES]) {
    let n = x.len() as f64;
    let mut mean = [0.0; NUM_FEATURES];
    for v in x {
        for (m, &value) in mean.iter_mut().zip(v.as_slice()) {
            *m += value / n;
        }
    }

    let mut std = [0.0; NUM_FEATURES];
    for v in x {
        for j in 0..NUM_FEATURES {
            let d = v.get(j) - mean[j];
            std[j] += d * d / n;
        }
    }
    for s in &mut std {
        *s = s.sqrt();
        if *s < 1e-12 {
            *s = 1.0;
        }
    }

    (mean, std)
}

fn standardize(
    v: &FeatureVector,
    mean: &[f64; NUM_FEATURES],
    std: &[f64; NUM_FEATURES],
) -> [f64; NUM_FEATURES] {
    let mut out = [0.0; NUM_FEATURES];
    for j in 0..NUM_FEATURES {
        out[j] = (v.get(j) - mean[j]) / std[j];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(score: f64) -> FeatureVector {
        let mut values = [1.0; NUM_FEATURES];
        values[2] = score;
        FeatureVector::from_array(values)
    }

    #[test]
    fn test_softmax_normalizes() {
        let mut logits = vec![1000.0, 1001.0, 999.0];
        softmax_in_place(&mut logits);
        assert!((logits.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(logits[1] > logits[0] && logits[0] > logits[2]);
    }

    #[test]
    fn test_learns_ordered_classes() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for s in 0..30 {
            x.push(row(f64::from(s)));
            y.push(match s {
                0..=9 => 0,
                10..=19 => 1,
                _ => 2,
            });
        }

        let model = LogisticRegression::fit(&x, &y, 3, &LogisticParams::default()).unwrap();
        let low = model.predict_proba(&row(2.0));
        let high = model.predict_proba(&row(28.0));

        assert!(low[0] > low[2]);
        assert!(high[2] > high[0]);
        for p in low.iter().chain(&high) {
            assert!((0.0..=1.0).contains(p));
        }
        assert!((high.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_parameters() {
        let params = LogisticParams {
            c: 0.0,
            ..LogisticParams::default()
        };
        assert!(LogisticRegression::fit(&[row(1.0)], &[0], 1, &params).is_err());
    }
}
