//! Categorical encoders fitted on training data.
//!
//! Each encoder is a bijection between the distinct values observed for one
//! field and the codes `0..k`, assigned in lexicographic order. The trained
//! classifier depends on the exact assignment, so encoders are immutable
//! after fitting and unknown values are rejected instead of defaulted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors raised while encoding categorical values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("Unknown category {value:?} for field '{field}'")]
    UnknownCategory { field: String, value: String },

    #[error("Code {code} is outside the domain of field '{field}'")]
    UnknownCode { field: String, code: usize },

    #[error("Encoder set is missing field '{0}'")]
    MissingField(String),

    #[error("Encoder for field '{0}' has unsorted or repeated classes")]
    MalformedEncoder(String),
}

/// The seven categorical inputs of the risk model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoricalField {
    #[serde(rename = "gender")]
    Gender,
    #[serde(rename = "stress")]
    StressLevel,
    #[serde(rename = "activity")]
    PhysicalActivity,
    #[serde(rename = "illness")]
    ChronicIllness,
    #[serde(rename = "history")]
    MentalHealthHistory,
    #[serde(rename = "treatment")]
    Treatment,
    #[serde(rename = "work")]
    WorkStatus,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 7] = [
        Self::Gender,
        Self::StressLevel,
        Self::PhysicalActivity,
        Self::ChronicIllness,
        Self::MentalHealthHistory,
        Self::Treatment,
        Self::WorkStatus,
    ];

    /// Key under which the encoder is persisted.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::StressLevel => "stress",
            Self::PhysicalActivity => "activity",
            Self::ChronicIllness => "illness",
            Self::MentalHealthHistory => "history",
            Self::Treatment => "treatment",
            Self::WorkStatus => "work",
        }
    }

    /// Dataset column holding the raw values.
    #[must_use]
    pub fn column(&self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::StressLevel => "Stress_Level",
            Self::PhysicalActivity => "Physical_Activity",
            Self::ChronicIllness => "Chronic_Illness",
            Self::MentalHealthHistory => "Mental_Health_History",
            Self::Treatment => "Treatment",
            Self::WorkStatus => "Work_Status",
        }
    }
}

impl std::fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Fitted value ↔ code mapping for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    /// Sorted distinct values; a value's index is its code.
    classes: Vec<String>,
}

impl CategoricalEncoder {
    /// Fit on raw values. Codes follow the sorted order of distinct values.
    #[must_use]
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Code for `value`, or `None` when it was not seen at fit time.
    #[must_use]
    pub fn code_of(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    /// Value for `code`, or `None` outside `0..len`.
    #[must_use]
    pub fn value_of(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Fitted domain in code order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Sorted-order invariant; deserialized encoders are checked with this.
    fn is_well_formed(&self) -> bool {
        self.classes.windows(2).all(|w| w[0] < w[1])
    }
}

/// The encoders for every categorical field, versioned with the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<CategoricalField, CategoricalEncoder>")]
#[serde(into = "BTreeMap<CategoricalField, CategoricalEncoder>")]
pub struct EncoderSet {
    encoders: BTreeMap<CategoricalField, CategoricalEncoder>,
}

impl EncoderSet {
    /// Fit one encoder per field using the supplied column accessor.
    pub fn fit<'a, F, I>(mut column: F) -> Self
    where
        F: FnMut(CategoricalField) -> I,
        I: IntoIterator<Item = &'a str>,
    {
        let encoders = CategoricalField::ALL
            .into_iter()
            .map(|field| (field, CategoricalEncoder::fit(column(field))))
            .collect();
        Self { encoders }
    }

    /// Assemble a set from already-fitted encoders.
    ///
    /// # Errors
    /// Returns `EncodingError::MissingField` if any field has no encoder and
    /// `EncodingError::MalformedEncoder` if its classes are not strictly sorted.
    pub fn from_encoders(
        encoders: BTreeMap<CategoricalField, CategoricalEncoder>,
    ) -> Result<Self, EncodingError> {
        for field in CategoricalField::ALL {
            match encoders.get(&field) {
                Some(enc) if enc.is_well_formed() => {}
                Some(_) => {
                    return Err(EncodingError::MalformedEncoder(field.key().to_string()))
                }
                None => return Err(EncodingError::MissingField(field.key().to_string())),
            }
        }
        Ok(Self { encoders })
    }

    #[must_use]
    pub fn get(&self, field: CategoricalField) -> Option<&CategoricalEncoder> {
        self.encoders.get(&field)
    }

    /// Encode one value of `field`.
    ///
    /// # Errors
    /// Returns `EncodingError::UnknownCategory` for values outside the fitted domain.
    pub fn encode(&self, field: CategoricalField, value: &str) -> Result<usize, EncodingError> {
        let encoder = self
            .encoders
            .get(&field)
            .ok_or_else(|| EncodingError::MissingField(field.key().to_string()))?;
        encoder
            .code_of(value)
            .ok_or_else(|| EncodingError::UnknownCategory {
                field: field.key().to_string(),
                value: value.to_string(),
            })
    }

    /// Decode a code of `field` back to its value.
    ///
    /// # Errors
    /// Returns `EncodingError::UnknownCode` for codes outside the domain.
    pub fn decode(&self, field: CategoricalField, code: usize) -> Result<&str, EncodingError> {
        let encoder = self
            .encoders
            .get(&field)
            .ok_or_else(|| EncodingError::MissingField(field.key().to_string()))?;
        encoder.value_of(code).ok_or_else(|| EncodingError::UnknownCode {
            field: field.key().to_string(),
            code,
        })
    }
}

impl TryFrom<BTreeMap<CategoricalField, CategoricalEncoder>> for EncoderSet {
    type Error = EncodingError;

    fn try_from(map: BTreeMap<CategoricalField, CategoricalEncoder>) -> Result<Self, Self::Error> {
        Self::from_encoders(map)
    }
}

impl From<EncoderSet> for BTreeMap<CategoricalField, CategoricalEncoder> {
    fn from(set: EncoderSet) -> Self {
        set.encoders
    }
}
