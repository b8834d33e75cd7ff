//! Random forest: bootstrap-aggregated decision trees with per-node
//! feature subsampling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTreeClassifier, FeatureSelection, TreeParams};
use super::ModelError;
use crate::domain::{FeatureVector, NUM_FEATURES};

/// Hyperparameters for the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    /// Features considered per node (None = floor(sqrt(n_features)))
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: Some(15),
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn features_per_node(&self) -> usize {
        self.max_features
            .unwrap_or_else(|| (NUM_FEATURES as f64).sqrt().floor() as usize)
            .clamp(1, NUM_FEATURES)
    }
}

/// Fitted random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    n_classes: usize,
    trees: Vec<DecisionTreeClassifier>,
}

impl RandomForestClassifier {
    /// Fit `n_estimators` trees, each on a bootstrap sample of `x`.
    ///
    /// A single seeded stream drives both the bootstrap draws and feature
    /// subsampling, so equal seeds give equal forests.
    ///
    /// # Errors
    /// Returns `ModelError` on empty or mismatched input or zero estimators.
    pub fn fit(
        x: &[FeatureVector],
        y: &[usize],
        n_classes: usize,
        params: &ForestParams,
    ) -> Result<Self, ModelError> {
        super::check_training_input(x, y, n_classes)?;
        if params.n_estimators == 0 {
            return Err(ModelError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            ..TreeParams::default()
        };
        let k = params.features_per_node();
        let n = x.len();
        let mut rng = ChaCha20Rng::seed_from_u64(params.seed);

        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut selection = FeatureSelection::Random { k, rng: &mut rng };
            trees.push(DecisionTreeClassifier::fit_on(
                x,
                y,
                &sample,
                n_classes,
                &tree_params,
                &mut selection,
            ));
        }

        tracing::debug!(
            n_estimators = trees.len(),
            max_features = k,
            "Random forest fitted"
        );

        Ok(Self { n_classes, trees })
    }

    /// Mean of the per-tree leaf distributions.
    #[must_use]
    pub fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let mut sum = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba(features)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        sum.iter_mut().for_each(|p| *p /= n_trees);
        sum
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Vec<FeatureVector>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let mut values = [0.0; NUM_FEATURES];
            for (j, v) in values.iter_mut().enumerate() {
                *v = f64::from(i) + j as f64;
            }
            x.push(FeatureVector::from_array(values));
            y.push(usize::from(i >= 20));
        }
        (x, y)
    }

    fn small() -> ForestParams {
        ForestParams {
            n_estimators: 15,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_default_feature_subsample() {
        assert_eq!(ForestParams::default().features_per_node(), 3);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = data();
        let a = RandomForestClassifier::fit(&x, &y, 2, &small()).unwrap();
        let b = RandomForestClassifier::fit(&x, &y, 2, &small()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_estimators(), 15);
    }

    #[test]
    fn test_separates_classes() {
        let (x, y) = data();
        let forest = RandomForestClassifier::fit(&x, &y, 2, &small()).unwrap();

        let low = forest.predict_proba(&x[0]);
        let high = forest.predict_proba(&x[39]);
        assert!(low[0] > 0.5);
        assert!(high[1] > 0.5);
        assert!((low.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = data();
        let params = ForestParams {
            n_estimators: 0,
            ..ForestParams::default()
        };
        assert!(RandomForestClassifier::fit(&x, &y, 2, &params).is_err());
    }
}
