//! CART decision tree (Gini impurity) for multi-class risk prediction.
//!
//! Leaves keep the class distribution of the training rows that reached
//! them, so `predict_proba` returns leaf class frequencies.

use rand::seq::index;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use super::ModelError;
use crate::domain::{FeatureVector, NUM_FEATURES};

/// Hyperparameters for a single tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum rows required to attempt a split
    pub min_samples_split: usize,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: Some(10),
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Candidate features considered at each node.
pub(crate) enum FeatureSelection<'a> {
    /// Every feature, in column order
    All,
    /// `k` features drawn without replacement per node
    Random { k: usize, rng: &'a mut ChaCha20Rng },
}

impl FeatureSelection<'_> {
    fn candidates(&mut self) -> Vec<usize> {
        match self {
            Self::All => (0..NUM_FEATURES).collect(),
            Self::Random { k, rng } => {
                let k = (*k).clamp(1, NUM_FEATURES);
                index::sample(&mut **rng, NUM_FEATURES, k).into_vec()
            }
        }
    }
}

struct TreeBuilder<'a> {
    x: &'a [FeatureVector],
    y: &'a [usize],
    n_classes: usize,
    params: &'a TreeParams,
}

struct BestSplit {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

/// Gini = 1 - Σ p_i²
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

impl TreeBuilder<'_> {
    fn leaf(&self, counts: &[usize], n_samples: usize) -> TreeNode {
        let distribution = counts
            .iter()
            .map(|&c| c as f64 / n_samples as f64)
            .collect();
        TreeNode::Leaf {
            distribution,
            n_samples,
        }
    }

    fn build(
        &self,
        indices: &[usize],
        depth: usize,
        selection: &mut FeatureSelection<'_>,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = class_counts(self.y, indices, self.n_classes);

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if pure || depth_reached || n_samples < self.params.min_samples_split {
            return self.leaf(&counts, n_samples);
        }

        let Some(best) = self.find_best_split(indices, &counts, selection) else {
            return self.leaf(&counts, n_samples);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i].get(best.feature_idx) <= best.threshold);

        tracing::trace!(
            feature = best.feature_idx,
            threshold = best.threshold,
            gain = best.gain,
            depth,
            "tree split"
        );

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left: Box::new(self.build(&left_idx, depth + 1, selection)),
            right: Box::new(self.build(&right_idx, depth + 1, selection)),
        }
    }

    fn find_best_split(
        &self,
        indices: &[usize],
        parent_counts: &[usize],
        selection: &mut FeatureSelection<'_>,
    ) -> Option<BestSplit> {
        let n = indices.len();
        let parent_impurity = gini(parent_counts, n);
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;

        for feature_idx in selection.candidates() {
            let mut column: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.x[i].get(feature_idx), self.y[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.to_vec();

            for pos in 0..n - 1 {
                let (value, label) = column[pos];
                left_counts[label] += 1;
                right_counts[label] -= 1;

                let next_value = column[pos + 1].0;
                if next_value <= value {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let weighted = (n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature_idx,
                        threshold: (value + next_value) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Fitted decision tree classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    n_classes: usize,
    root: TreeNode,
}

impl DecisionTreeClassifier {
    /// Fit on all rows, considering every feature at every node.
    ///
    /// # Errors
    /// Returns `ModelError` on empty or mismatched input.
    pub fn fit(
        x: &[FeatureVector],
        y: &[usize],
        n_classes: usize,
        params: &TreeParams,
    ) -> Result<Self, ModelError> {
        super::check_training_input(x, y, n_classes)?;
        let indices: Vec<usize> = (0..x.len()).collect();
        Ok(Self::fit_on(x, y, &indices, n_classes, params, &mut FeatureSelection::All))
    }

    /// Fit on a subset of rows (indices may repeat, as in a bootstrap sample).
    pub(crate) fn fit_on(
        x: &[FeatureVector],
        y: &[usize],
        indices: &[usize],
        n_classes: usize,
        params: &TreeParams,
        selection: &mut FeatureSelection<'_>,
    ) -> Self {
        let builder = TreeBuilder {
            x,
            y,
            n_classes,
            params,
        };
        Self {
            n_classes,
            root: builder.build(indices, 0, selection),
        }
    }

    /// Class distribution of the leaf `features` falls into.
    #[must_use]
    pub fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { distribution, .. } => return distribution.clone(),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features.get(*feature_idx) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }
}
