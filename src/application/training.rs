//! Training service: offline batch job that produces the trained artifact.
//!
//! Pipeline:
//! 1. Read the dataset and impute missing sleep/activity/treatment values
//! 2. Derive severity levels and the rule-based risk label for every row
//! 3. Fit the categorical encoders on the full dataset
//! 4. Build feature vectors and split 80/20, stratified by risk label
//! 5. Train every model family and evaluate it on the held-out rows
//! 6. Keep the most accurate family (earliest wins ties) and persist it

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::artifact::TrainedArtifact;
use super::evaluation::{accuracy, evaluate, ConfusionMatrix, ModelReport};
use super::split::stratified_split;
use crate::adapters::classifiers::{ModelError, ModelFamily, ModelParams, RiskModel};
use crate::adapters::StorageError;
use crate::domain::{
    anxiety_level, depression_level, risk_level, ClinicalRecord, EncoderSet, FeatureVector,
    RawClinicalRecord, RiskLevel,
};
use crate::ports::{ArtifactStore, DatasetError, DatasetSource, RiskClassifier, TrainingTable};
use crate::MindscopeError;

/// Columns the dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Age",
    "Gender",
    "Depression_Score",
    "Anxiety_Score",
    "Stress_Level",
    "Sleep_Hours",
    "Physical_Activity",
    "Chronic_Illness",
    "Mental_Health_History",
    "Treatment",
    "Days_of_Treatment",
    "Work_Status",
];

/// Errors specific to model training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Cannot split dataset: {0}")]
    Split(String),

    #[error("Failed to fit {family}: {source}")]
    Fit {
        family: ModelFamily,
        #[source]
        source: ModelError,
    },
}

/// Training configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Seed for the split and every stochastic model
    pub seed: u64,
    /// Held-out fraction, in (0, 1)
    pub test_size: f64,
    pub params: ModelParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_size: 0.2,
            params: ModelParams::default(),
        }
    }
}

/// Summary of one training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Rule-based label counts over the full dataset
    pub label_counts: BTreeMap<RiskLevel, usize>,
    /// One entry per family, in training order
    pub models: Vec<ModelReport>,
    pub selected: ModelFamily,
    /// Fingerprint of the persisted bundle (empty if not persisted)
    pub fingerprint: String,
}

impl TrainingReport {
    /// Report of the selected family.
    #[must_use]
    pub fn selected_report(&self) -> Option<&ModelReport> {
        self.models.iter().find(|m| m.family == self.selected)
    }
}

/// Fitted models before persistence.
pub struct TrainedModels {
    pub best: RiskModel,
    pub ensemble: RiskModel,
    pub encoders: EncoderSet,
    pub report: TrainingReport,
}

/// Service running the training pipeline against an artifact store.
pub struct TrainingService<S>
where
    S: ArtifactStore,
{
    store: Arc<S>,
    config: TrainingConfig,
}

impl<S> TrainingService<S>
where
    S: ArtifactStore,
    S::Error: Into<StorageError>,
{
    /// Create a new training service.
    pub fn new(store: Arc<S>, config: TrainingConfig) -> Self {
        Self { store, config }
    }

    /// Run the full pipeline and persist the result.
    ///
    /// # Errors
    /// Returns `MissingTrainingColumn` (via `Dataset`) if a required column is
    /// absent, and any parse, split, fit or storage failure.
    pub fn train<D: DatasetSource>(&self, source: &D) -> Result<TrainingReport, MindscopeError> {
        tracing::info!("Starting training pipeline...");

        let table = source.load_table()?;
        let records = records_from_table(&table)?;
        let trained = self.fit(&records)?;

        let fingerprint = TrainedArtifact::save(
            self.store.as_ref(),
            &trained.best,
            &trained.ensemble,
            &trained.encoders,
        )?;

        let mut report = trained.report;
        report.fingerprint = fingerprint;
        Ok(report)
    }

    /// Fit encoders and every model family on complete records.
    ///
    /// # Errors
    /// Returns error if labelling, encoding, splitting or fitting fails.
    pub fn fit(&self, records: &[ClinicalRecord]) -> Result<TrainedModels, MindscopeError> {
        if records.is_empty() {
            return Err(TrainingError::EmptyDataset.into());
        }

        tracing::debug!("Step 2: Deriving labels...");
        let mut labels = Vec::with_capacity(records.len());
        let mut label_counts: BTreeMap<RiskLevel, usize> = BTreeMap::new();
        let mut depression_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut anxiety_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for record in records {
            let dep = i64::from(record.depression_score);
            let anx = i64::from(record.anxiety_score);
            *depression_counts.entry(depression_level(dep)?.as_str()).or_default() += 1;
            *anxiety_counts.entry(anxiety_level(anx)?.as_str()).or_default() += 1;
            let label = risk_level(dep, anx)?;
            *label_counts.entry(label).or_default() += 1;
            labels.push(label);
        }
        tracing::info!(rows = records.len(), labels = ?label_counts, "Derived risk labels");
        tracing::debug!(depression = ?depression_counts, anxiety = ?anxiety_counts, "Severity distribution");

        tracing::debug!("Step 3: Fitting categorical encoders...");
        let encoders = EncoderSet::fit(|field| records.iter().map(move |r| r.categorical(field)));

        tracing::debug!("Step 4: Building features and splitting...");
        let features = records
            .iter()
            .map(|r| FeatureVector::build(r, &encoders))
            .collect::<Result<Vec<_>, _>>()?;
        let split = stratified_split(&labels, self.config.test_size, self.config.seed)?;
        let x_train: Vec<FeatureVector> = split.train.iter().map(|&i| features[i]).collect();
        let y_train: Vec<RiskLevel> = split.train.iter().map(|&i| labels[i]).collect();
        let x_test: Vec<FeatureVector> = split.test.iter().map(|&i| features[i]).collect();
        let y_test: Vec<RiskLevel> = split.test.iter().map(|&i| labels[i]).collect();
        tracing::info!(
            train = x_train.len(),
            test = x_test.len(),
            "Split dataset"
        );

        tracing::debug!("Step 5: Training candidate models...");
        let mut reports = Vec::with_capacity(ModelFamily::ALL.len());
        let mut models = Vec::with_capacity(ModelFamily::ALL.len());

        for family in ModelFamily::ALL {
            let model = RiskModel::fit(family, &self.config.params, &x_train, &y_train)
                .map_err(|source| TrainingError::Fit { family, source })?;
            let report = model_report(&model, &x_train, &y_train, &x_test, &y_test);

            tracing::info!(
                model = %family,
                train_accuracy = report.train_accuracy,
                accuracy = report.test.accuracy,
                precision = report.test.precision,
                recall = report.test.recall,
                f1 = report.test.f1,
                correct = report.confusion.trace(),
                "Evaluated model"
            );

            reports.push(report);
            models.push(model);
        }

        let selected = select_best(&reports).ok_or(TrainingError::EmptyDataset)?;
        let ensemble = models
            .iter()
            .find(|m| m.family() == ModelFamily::Ensemble)
            .cloned()
            .ok_or(TrainingError::EmptyDataset)?;
        let best = models.swap_remove(selected);
        tracing::info!(
            model = %best.family(),
            accuracy = reports[selected].test.accuracy,
            "Selected best model"
        );

        let report = TrainingReport {
            n_rows: records.len(),
            n_train: x_train.len(),
            n_test: x_test.len(),
            label_counts,
            models: reports,
            selected: best.family(),
            fingerprint: String::new(),
        };

        Ok(TrainedModels {
            best,
            ensemble,
            encoders,
            report,
        })
    }
}

/// Index of the report with the highest test accuracy; the earliest wins ties.
fn select_best(reports: &[ModelReport]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, report) in reports.iter().enumerate() {
        if best.map_or(true, |b| report.test.accuracy > reports[b].test.accuracy) {
            best = Some(idx);
        }
    }
    best
}

fn class_indices(model: &RiskModel, y: &[RiskLevel]) -> Vec<usize> {
    let classes = model.classes();
    y.iter()
        .map(|tier| classes.iter().position(|c| c == tier).unwrap_or(classes.len()))
        .collect()
}

fn model_report(
    model: &RiskModel,
    x_train: &[FeatureVector],
    y_train: &[RiskLevel],
    x_test: &[FeatureVector],
    y_test: &[RiskLevel],
) -> ModelReport {
    let n_classes = model.classes().len();
    let train_true = class_indices(model, y_train);
    let train_pred: Vec<usize> = x_train.iter().map(|x| model.predict_index(x)).collect();
    let test_true = class_indices(model, y_test);
    let test_pred: Vec<usize> = x_test.iter().map(|x| model.predict_index(x)).collect();

    ModelReport {
        family: model.family(),
        train_accuracy: accuracy(&train_true, &train_pred),
        test: evaluate(&test_true, &test_pred, n_classes),
        confusion: ConfusionMatrix::new(model.classes(), &test_true, &test_pred),
    }
}

/// Parse and impute every row of `table`.
///
/// Missing sleep hours take the dataset median, missing physical activity
/// the most frequent value (lexicographically smallest on ties), and missing
/// treatment becomes `"None"`. Any other missing cell is an error.
///
/// # Errors
/// Returns `DatasetError::MissingTrainingColumn` for the first absent required
/// column, or a value error for unparsable cells.
pub fn records_from_table(table: &TrainingTable) -> Result<Vec<ClinicalRecord>, DatasetError> {
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !table.has_column(c)) {
        tracing::error!(column = *missing, "Dataset is missing a required column");
        return Err(DatasetError::MissingTrainingColumn((*missing).to_string()));
    }

    tracing::debug!("Step 1: Parsing rows and imputing missing values...");
    let cols = Columns::new(table)?;
    let raw = (0..table.num_rows())
        .map(|row| cols.raw_record(row))
        .collect::<Result<Vec<_>, _>>()?;

    let sleep_fill = median(raw.iter().filter_map(|r| r.sleep_hours)).ok_or_else(|| {
        DatasetError::Parse("Sleep_Hours has no values to impute from".to_string())
    })?;
    let activity_fill = mode(raw.iter().filter_map(|r| r.physical_activity.as_deref()))
        .ok_or_else(|| {
            DatasetError::Parse("Physical_Activity has no values to impute from".to_string())
        })?;

    let imputed_sleep = raw.iter().filter(|r| r.sleep_hours.is_none()).count();
    let imputed_activity = raw.iter().filter(|r| r.physical_activity.is_none()).count();
    let imputed_treatment = raw.iter().filter(|r| r.treatment.is_none()).count();
    tracing::debug!(
        imputed_sleep,
        imputed_activity,
        imputed_treatment,
        activity_fill = %activity_fill,
        "Imputed missing values"
    );

    Ok(raw
        .into_iter()
        .map(|r| r.complete(sleep_fill, &activity_fill))
        .collect())
}

struct Columns<'a> {
    age: &'a [Option<String>],
    gender: &'a [Option<String>],
    depression: &'a [Option<String>],
    anxiety: &'a [Option<String>],
    stress: &'a [Option<String>],
    sleep: &'a [Option<String>],
    activity: &'a [Option<String>],
    illness: &'a [Option<String>],
    history: &'a [Option<String>],
    treatment: &'a [Option<String>],
    days: &'a [Option<String>],
    work: &'a [Option<String>],
}

impl<'a> Columns<'a> {
    fn new(table: &'a TrainingTable) -> Result<Self, DatasetError> {
        Ok(Self {
            age: table.column("Age")?,
            gender: table.column("Gender")?,
            depression: table.column("Depression_Score")?,
            anxiety: table.column("Anxiety_Score")?,
            stress: table.column("Stress_Level")?,
            sleep: table.column("Sleep_Hours")?,
            activity: table.column("Physical_Activity")?,
            illness: table.column("Chronic_Illness")?,
            history: table.column("Mental_Health_History")?,
            treatment: table.column("Treatment")?,
            days: table.column("Days_of_Treatment")?,
            work: table.column("Work_Status")?,
        })
    }

    fn raw_record(&self, row: usize) -> Result<RawClinicalRecord, DatasetError> {
        Ok(RawClinicalRecord {
            age: count(self.age, "Age", row)?,
            gender: text(self.gender, "Gender", row)?,
            depression_score: count(self.depression, "Depression_Score", row)?,
            anxiety_score: count(self.anxiety, "Anxiety_Score", row)?,
            stress_level: text(self.stress, "Stress_Level", row)?,
            sleep_hours: optional_real(self.sleep, "Sleep_Hours", row)?,
            physical_activity: self.activity[row].clone(),
            chronic_illness: text(self.illness, "Chronic_Illness", row)?,
            mental_health_history: text(self.history, "Mental_Health_History", row)?,
            treatment: self.treatment[row].clone(),
            treatment_days: count(self.days, "Days_of_Treatment", row)?,
            work_status: text(self.work, "Work_Status", row)?,
        })
    }
}

fn text(column: &[Option<String>], name: &str, row: usize) -> Result<String, DatasetError> {
    column[row].clone().ok_or_else(|| DatasetError::MissingValue {
        column: name.to_string(),
        row,
    })
}

/// Non-negative integer; `"12.0"` is accepted as 12.
fn count(column: &[Option<String>], name: &str, row: usize) -> Result<u32, DatasetError> {
    let raw = text(column, name, row)?;
    let invalid = || DatasetError::InvalidValue {
        column: name.to_string(),
        row,
        value: raw.clone(),
    };
    if let Ok(v) = raw.parse::<u32>() {
        return Ok(v);
    }
    let v: f64 = raw.parse().map_err(|_| invalid())?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Ok(v as u32)
    } else {
        Err(invalid())
    }
}

fn optional_real(
    column: &[Option<String>],
    name: &str,
    row: usize,
) -> Result<Option<f64>, DatasetError> {
    match &column[row] {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
            _ => Err(DatasetError::InvalidValue {
                column: name.to_string(),
                row,
                value: raw.clone(),
            }),
        },
    }
}

/// Median; the mean of the two middle values for even counts.
fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut v: Vec<f64> = values.collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    Some(if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    })
}

/// Most frequent value; the lexicographically smallest wins ties.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, n) in counts {
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((value, n));
        }
    }
    best.map(|(value, _)| value.to_string())
}
