//! Risk classifier implementations.
//!
//! Three model families are trained side by side and the best one is kept.
//! Every family works on label indices `0..n_classes`; [`RiskModel`] owns
//! the mapping from index to [`RiskLevel`].

mod forest;
mod logistic;
mod tree;

pub use forest::{ForestParams, RandomForestClassifier};
pub use logistic::{LogisticParams, LogisticRegression};
pub use tree::{DecisionTreeClassifier, TreeParams};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{FeatureVector, RiskLevel};
use crate::ports::RiskClassifier;

/// Model fitting errors.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Feature rows ({x}) and labels ({y}) differ in length")]
    LengthMismatch { x: usize, y: usize },

    #[error("Label {label} out of range for {n_classes} classes")]
    InvalidLabel { label: usize, n_classes: usize },

    #[error("Invalid hyperparameter: {0}")]
    InvalidParameter(String),
}

pub(crate) fn check_training_input(
    x: &[FeatureVector],
    y: &[usize],
    n_classes: usize,
) -> Result<(), ModelError> {
    if x.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(ModelError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
        return Err(ModelError::InvalidLabel { label, n_classes });
    }
    Ok(())
}

/// Candidate model families, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    Linear,
    DecisionTree,
    Ensemble,
}

impl ModelFamily {
    /// Evaluation order. Earlier families win accuracy ties.
    pub const ALL: [ModelFamily; 3] = [Self::Linear, Self::DecisionTree, Self::Ensemble];

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Linear => "Logistic Regression",
            Self::DecisionTree => "Decision Tree",
            Self::Ensemble => "Random Forest",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Hyperparameters for every family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub logistic: LogisticParams,
    pub tree: TreeParams,
    pub forest: ForestParams,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            logistic: LogisticParams::default(),
            tree: TreeParams::default(),
            forest: ForestParams::default(),
        }
    }
}

impl ModelParams {
    /// Reseed the stochastic families.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.forest.seed = seed;
        self
    }
}

/// A fitted model of one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", content = "model")]
pub enum FittedModel {
    Linear(LogisticRegression),
    DecisionTree(DecisionTreeClassifier),
    Ensemble(RandomForestClassifier),
}

impl FittedModel {
    #[must_use]
    pub fn family(&self) -> ModelFamily {
        match self {
            Self::Linear(_) => ModelFamily::Linear,
            Self::DecisionTree(_) => ModelFamily::DecisionTree,
            Self::Ensemble(_) => ModelFamily::Ensemble,
        }
    }

    fn n_classes(&self) -> usize {
        match self {
            Self::Linear(m) => m.n_classes(),
            Self::DecisionTree(m) => m.n_classes(),
            Self::Ensemble(m) => m.n_classes(),
        }
    }

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        match self {
            Self::Linear(m) => m.predict_proba(features),
            Self::DecisionTree(m) => m.predict_proba(features),
            Self::Ensemble(m) => m.predict_proba(features),
        }
    }
}

/// A fitted model together with its class labels.
///
/// `classes` is sorted by label text (High, Low, Moderate when all three
/// are present) and fixes the order of every probability vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskModel {
    classes: Vec<RiskLevel>,
    model: FittedModel,
}

impl RiskModel {
    /// Fit one family on labelled feature vectors.
    ///
    /// # Errors
    /// Returns `ModelError` on empty or mismatched input or invalid
    /// hyperparameters.
    pub fn fit(
        family: ModelFamily,
        params: &ModelParams,
        x: &[FeatureVector],
        y: &[RiskLevel],
    ) -> Result<Self, ModelError> {
        let classes = label_classes(y);
        let n_classes = classes.len();
        let indices: Vec<usize> = y
            .iter()
            .map(|tier| classes.iter().position(|c| c == tier).unwrap_or_default())
            .collect();

        let model = match family {
            ModelFamily::Linear => FittedModel::Linear(LogisticRegression::fit(
                x,
                &indices,
                n_classes,
                &params.logistic,
            )?),
            ModelFamily::DecisionTree => FittedModel::DecisionTree(DecisionTreeClassifier::fit(
                x,
                &indices,
                n_classes,
                &params.tree,
            )?),
            ModelFamily::Ensemble => FittedModel::Ensemble(RandomForestClassifier::fit(
                x,
                &indices,
                n_classes,
                &params.forest,
            )?),
        };

        Ok(Self { classes, model })
    }

    #[must_use]
    pub fn family(&self) -> ModelFamily {
        self.model.family()
    }

    /// Label order and fitted model agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.classes.is_empty() && self.classes.len() == self.model.n_classes()
    }
}

impl RiskClassifier for RiskModel {
    fn classes(&self) -> &[RiskLevel] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        self.model.predict_proba(features)
    }
}

/// Distinct labels sorted by their text, matching a fitted label encoder.
fn label_classes(y: &[RiskLevel]) -> Vec<RiskLevel> {
    let mut classes: Vec<RiskLevel> = y.to_vec();
    classes.sort_by_key(|tier| tier.as_str());
    classes.dedup();
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NUM_FEATURES;

    fn dataset() -> (Vec<FeatureVector>, Vec<RiskLevel>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for dep in 0..=27u32 {
            for anx in (0..=21u32).step_by(3) {
                let mut values = [0.0; NUM_FEATURES];
                values[0] = 30.0;
                values[2] = f64::from(dep);
                values[3] = f64::from(anx);
                values[5] = 7.0;
                x.push(FeatureVector::from_array(values));
                y.push(crate::domain::risk_level(i64::from(dep), i64::from(anx)).unwrap());
            }
        }
        (x, y)
    }

    #[test]
    fn test_label_classes_sorted_by_text() {
        let y = [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High, RiskLevel::Low];
        assert_eq!(
            label_classes(&y),
            vec![RiskLevel::High, RiskLevel::Low, RiskLevel::Moderate]
        );
    }

    #[test]
    fn test_family_order_and_names() {
        let names: Vec<&str> = ModelFamily::ALL.iter().map(|f| f.display_name()).collect();
        assert_eq!(names, ["Logistic Regression", "Decision Tree", "Random Forest"]);
    }

    #[test]
    fn test_every_family_fits_and_predicts() {
        let (x, y) = dataset();
        let params = ModelParams {
            forest: ForestParams {
                n_estimators: 10,
                ..ForestParams::default()
            },
            ..ModelParams::default()
        };

        for family in ModelFamily::ALL {
            let model = RiskModel::fit(family, &params, &x, &y).unwrap();
            assert_eq!(model.family(), family);
            assert!(model.is_consistent());

            let probs = model.predict_proba(&x[0]);
            assert_eq!(probs.len(), 3);
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);

            let prediction = model.predict(&x[0]);
            assert!(model.classes().contains(&prediction.tier));
        }
    }

    #[test]
    fn test_serde_keeps_family() {
        let (x, y) = dataset();
        let model = RiskModel::fit(ModelFamily::DecisionTree, &ModelParams::default(), &x, &y)
            .unwrap();
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("DecisionTree"));
        let restored: RiskModel = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn test_check_training_input() {
        let v = FeatureVector::from_array([0.0; NUM_FEATURES]);
        assert!(matches!(
            check_training_input(&[v], &[0, 1], 2),
            Err(ModelError::LengthMismatch { x: 1, y: 2 })
        ));
        assert!(matches!(
            check_training_input(&[v], &[3], 2),
            Err(ModelError::InvalidLabel { label: 3, .. })
        ));
    }
}
