//! Trained artifact bundle: classifier, encoders and feature column order,
//! saved and loaded together.

use sha2::{Digest, Sha256};

use crate::adapters::classifiers::RiskModel;
use crate::adapters::StorageError;
use crate::domain::{feature_columns, EncoderSet};
use crate::ports::ArtifactStore;
use crate::MindscopeError;

/// Selected classifier.
pub const BEST_MODEL: &str = "best_risk_model";
/// Ensemble model, stored regardless of which family was selected.
pub const ENSEMBLE_MODEL: &str = "random_forest_model";
pub const ENCODERS: &str = "encoders";
pub const FEATURE_COLS: &str = "feature_cols";
/// Digest of the required blobs, written in the same transaction.
pub const FINGERPRINT: &str = "bundle_fingerprint";

/// Blobs that must all be present for inference.
pub const REQUIRED_ARTIFACTS: [&str; 3] = [BEST_MODEL, ENCODERS, FEATURE_COLS];

/// Everything inference needs, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedArtifact {
    pub classifier: RiskModel,
    pub encoders: EncoderSet,
    pub feature_columns: Vec<String>,
    /// SHA-256 over the required blobs
    pub fingerprint: String,
}

impl TrainedArtifact {
    /// Serialize and persist the bundle plus the ensemble model in one
    /// transaction. Returns the bundle fingerprint.
    ///
    /// # Errors
    /// Returns error if serialization or the store write fails.
    pub fn save<S>(
        store: &S,
        classifier: &RiskModel,
        ensemble: &RiskModel,
        encoders: &EncoderSet,
    ) -> Result<String, MindscopeError>
    where
        S: ArtifactStore,
        S::Error: Into<StorageError>,
    {
        let best = serde_json::to_vec(classifier)?;
        let forest = serde_json::to_vec(ensemble)?;
        let enc = serde_json::to_vec(encoders)?;
        let cols = serde_json::to_vec(&feature_columns())?;

        let fingerprint = bundle_fingerprint(&[
            (BEST_MODEL, best.as_slice()),
            (ENCODERS, enc.as_slice()),
            (FEATURE_COLS, cols.as_slice()),
        ]);

        store
            .save_artifacts(&[
                (BEST_MODEL, best.as_slice()),
                (ENSEMBLE_MODEL, forest.as_slice()),
                (ENCODERS, enc.as_slice()),
                (FEATURE_COLS, cols.as_slice()),
                (FINGERPRINT, fingerprint.as_bytes()),
            ])
            .map_err(|e| MindscopeError::Storage(e.into()))?;

        tracing::info!(
            model = %classifier.family(),
            fingerprint = %&fingerprint[..16],
            "Persisted trained artifact"
        );
        Ok(fingerprint)
    }

    /// Whether any required blob is already stored.
    ///
    /// # Errors
    /// Returns error if the store cannot be listed.
    pub fn exists<S>(store: &S) -> Result<bool, MindscopeError>
    where
        S: ArtifactStore,
        S::Error: Into<StorageError>,
    {
        let stored = store
            .list_artifacts()
            .map_err(|e| MindscopeError::Storage(e.into()))?;
        Ok(stored
            .iter()
            .any(|info| REQUIRED_ARTIFACTS.contains(&info.name.as_str())))
    }

    /// Load and validate the bundle.
    ///
    /// # Errors
    /// - `MissingArtifact` naming every absent required blob
    /// - `CorruptArtifact` if a blob fails to deserialize, the digest check
    ///   fails, the feature column order differs from this build's, or the
    ///   blobs were not written by the same save
    pub fn load<S>(store: &S) -> Result<Self, MindscopeError>
    where
        S: ArtifactStore,
        S::Error: Into<StorageError>,
    {
        let names = [BEST_MODEL, ENCODERS, FEATURE_COLS, FINGERPRINT];
        let loaded = store.load_artifacts(&names).map_err(|e| {
            let err: StorageError = e.into();
            match err {
                StorageError::Integrity { name } => MindscopeError::CorruptArtifact {
                    name,
                    reason: "digest mismatch".to_string(),
                },
                other => MindscopeError::Storage(other),
            }
        })?;

        let mut blobs: Vec<(&str, Vec<u8>)> = Vec::with_capacity(REQUIRED_ARTIFACTS.len());
        let mut missing = Vec::new();
        let mut stored_fingerprint = None;
        for (name, blob) in names.into_iter().zip(loaded) {
            match blob {
                Some(bytes) if name == FINGERPRINT => stored_fingerprint = Some(bytes),
                Some(bytes) => blobs.push((name, bytes)),
                None if name == FINGERPRINT => {}
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            tracing::error!(missing = ?missing, "Trained artifact incomplete");
            return Err(MindscopeError::MissingArtifact(missing));
        }

        let fingerprint = bundle_fingerprint(
            &blobs
                .iter()
                .map(|(name, bytes)| (*name, bytes.as_slice()))
                .collect::<Vec<_>>(),
        );
        let (best, enc, cols) = (&blobs[0].1, &blobs[1].1, &blobs[2].1);

        let classifier: RiskModel = decode(BEST_MODEL, best)?;
        if !classifier.is_consistent() {
            return Err(MindscopeError::CorruptArtifact {
                name: BEST_MODEL.to_string(),
                reason: "class labels do not match model outputs".to_string(),
            });
        }
        let encoders: EncoderSet = decode(ENCODERS, enc)?;
        let columns: Vec<String> = decode(FEATURE_COLS, cols)?;

        if columns != feature_columns() {
            return Err(MindscopeError::CorruptArtifact {
                name: FEATURE_COLS.to_string(),
                reason: format!("unexpected feature order {columns:?}"),
            });
        }

        // Blobs from different training runs fail here
        if stored_fingerprint.as_deref() != Some(fingerprint.as_bytes()) {
            tracing::error!("Artifact blobs do not belong to one bundle");
            return Err(MindscopeError::CorruptArtifact {
                name: FINGERPRINT.to_string(),
                reason: "stored fingerprint does not match the loaded blobs".to_string(),
            });
        }

        tracing::info!(
            model = %classifier.family(),
            fingerprint = %&fingerprint[..16],
            "Loaded trained artifact"
        );

        Ok(Self {
            classifier,
            encoders,
            feature_columns: columns,
            fingerprint,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<T, MindscopeError> {
    serde_json::from_slice(bytes).map_err(|e| MindscopeError::CorruptArtifact {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Hex SHA-256 over `name || payload` for each blob in order.
fn bundle_fingerprint(blobs: &[(&str, &[u8])]) -> String {
    let mut hasher = Sha256::new();
    for (name, bytes) in blobs {
        hasher.update(name.as_bytes());
        hasher.update(bytes);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
