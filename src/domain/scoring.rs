//! Clinical scoring for the PHQ-9 and GAD-7 questionnaires.
//!
//! Severity bands follow the published cut-offs for each scale. The combined
//! risk tier here is the rule used to label training data; deployed
//! predictions come from the trained classifier instead.

use serde::{Deserialize, Serialize};

/// Highest possible PHQ-9 sub-score (9 items × 3).
pub const PHQ9_MAX_SCORE: u32 = 27;

/// Highest possible GAD-7 sub-score (7 items × 3).
pub const GAD7_MAX_SCORE: u32 = 21;

/// Highest value a single questionnaire answer can take.
pub const MAX_ITEM_ANSWER: u8 = 3;

/// Errors raised by the scoring functions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("{scale} score {score} out of range [0, {max}]")]
    OutOfRangeScore {
        scale: &'static str,
        score: i64,
        max: u32,
    },

    #[error("Invalid {scale} responses: {reason}")]
    InvalidResponses { scale: &'static str, reason: String },
}

/// Depression severity derived from a PHQ-9 sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DepressionLevel {
    Minimal,
    Mild,
    Moderate,
    #[serde(rename = "Moderately Severe")]
    ModeratelySevere,
    Severe,
}

impl DepressionLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::ModeratelySevere => "Moderately Severe",
            Self::Severe => "Severe",
        }
    }

    /// Inclusive score band for this level.
    #[must_use]
    pub fn score_range(&self) -> (u32, u32) {
        match self {
            Self::Minimal => (0, 4),
            Self::Mild => (5, 9),
            Self::Moderate => (10, 14),
            Self::ModeratelySevere => (15, 19),
            Self::Severe => (20, PHQ9_MAX_SCORE),
        }
    }
}

impl std::fmt::Display for DepressionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anxiety severity derived from a GAD-7 sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnxietyLevel {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

impl AnxietyLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }

    /// Inclusive score band for this level.
    #[must_use]
    pub fn score_range(&self) -> (u32, u32) {
        match self {
            Self::Minimal => (0, 4),
            Self::Mild => (5, 9),
            Self::Moderate => (10, 14),
            Self::Severe => (15, GAD7_MAX_SCORE),
        }
    }
}

impl std::fmt::Display for AnxietyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse mental-health risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// No significant indicators
    Low,
    /// Lifestyle changes and support advised
    Moderate,
    /// Professional help strongly recommended
    High,
}

impl RiskLevel {
    /// All tiers, lowest first.
    pub const ALL: [RiskLevel; 3] = [Self::Low, Self::Moderate, Self::High];

    /// Label used in datasets and persisted artifacts.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }

    /// Parse a tier label as written by [`RiskLevel::as_str`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Low" => Some(Self::Low),
            "Moderate" => Some(Self::Moderate),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_range(scale: &'static str, score: i64, max: u32) -> Result<u32, ScoreError> {
    if (0..=i64::from(max)).contains(&score) {
        Ok(score as u32)
    } else {
        Err(ScoreError::OutOfRangeScore { scale, score, max })
    }
}

/// Map a PHQ-9 sub-score to its depression severity.
///
/// # Errors
/// Returns `ScoreError::OutOfRangeScore` outside `[0, 27]`.
pub fn depression_level(score: i64) -> Result<DepressionLevel, ScoreError> {
    let score = check_range("PHQ-9", score, PHQ9_MAX_SCORE)?;
    Ok(match score {
        0..=4 => DepressionLevel::Minimal,
        5..=9 => DepressionLevel::Mild,
        10..=14 => DepressionLevel::Moderate,
        15..=19 => DepressionLevel::ModeratelySevere,
        _ => DepressionLevel::Severe,
    })
}

/// Map a GAD-7 sub-score to its anxiety severity.
///
/// # Errors
/// Returns `ScoreError::OutOfRangeScore` outside `[0, 21]`.
pub fn anxiety_level(score: i64) -> Result<AnxietyLevel, ScoreError> {
    let score = check_range("GAD-7", score, GAD7_MAX_SCORE)?;
    Ok(match score {
        0..=4 => AnxietyLevel::Minimal,
        5..=9 => AnxietyLevel::Mild,
        10..=14 => AnxietyLevel::Moderate,
        _ => AnxietyLevel::Severe,
    })
}

/// Rule-based risk tier from the mean of both sub-scores.
///
/// Only used to label training rows.
///
/// # Errors
/// Returns `ScoreError::OutOfRangeScore` if either score is outside its scale.
pub fn risk_level(depression_score: i64, anxiety_score: i64) -> Result<RiskLevel, ScoreError> {
    let dep = check_range("PHQ-9", depression_score, PHQ9_MAX_SCORE)?;
    let anx = check_range("GAD-7", anxiety_score, GAD7_MAX_SCORE)?;

    let risk = f64::from(dep + anx) / 2.0;
    Ok(if risk < 5.0 {
        RiskLevel::Low
    } else if risk < 12.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depression_boundaries() {
        for s in 0..=4 {
            assert_eq!(depression_level(s).unwrap(), DepressionLevel::Minimal);
        }
        assert_eq!(depression_level(5).unwrap(), DepressionLevel::Mild);
        assert_eq!(depression_level(9).unwrap(), DepressionLevel::Mild);
        assert_eq!(depression_level(10).unwrap(), DepressionLevel::Moderate);
        assert_eq!(depression_level(14).unwrap(), DepressionLevel::Moderate);
        assert_eq!(depression_level(15).unwrap(), DepressionLevel::ModeratelySevere);
        assert_eq!(depression_level(19).unwrap(), DepressionLevel::ModeratelySevere);
        assert_eq!(depression_level(20).unwrap(), DepressionLevel::Severe);
        assert_eq!(depression_level(27).unwrap(), DepressionLevel::Severe);
    }

    #[test]
    fn test_anxiety_boundaries() {
        for s in 0..=4 {
            assert_eq!(anxiety_level(s).unwrap(), AnxietyLevel::Minimal);
        }
        assert_eq!(anxiety_level(5).unwrap(), AnxietyLevel::Mild);
        assert_eq!(anxiety_level(9).unwrap(), AnxietyLevel::Mild);
        assert_eq!(anxiety_level(10).unwrap(), AnxietyLevel::Moderate);
        assert_eq!(anxiety_level(14).unwrap(), AnxietyLevel::Moderate);
        assert_eq!(anxiety_level(15).unwrap(), AnxietyLevel::Severe);
        assert_eq!(anxiety_level(21).unwrap(), AnxietyLevel::Severe);
    }

    #[test]
    fn test_levels_match_declared_ranges() {
        for s in 0..=PHQ9_MAX_SCORE {
            let (lo, hi) = depression_level(i64::from(s)).unwrap().score_range();
            assert!(lo <= s && s <= hi);
        }
        for s in 0..=GAD7_MAX_SCORE {
            let (lo, hi) = anxiety_level(i64::from(s)).unwrap().score_range();
            assert!(lo <= s && s <= hi);
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            depression_level(28),
            Err(ScoreError::OutOfRangeScore { max: 27, .. })
        ));
        assert!(depression_level(-1).is_err());
        assert!(anxiety_level(22).is_err());
        assert!(risk_level(5, 22).is_err());
        assert!(risk_level(-3, 0).is_err());
    }

    #[test]
    fn test_risk_symmetric_and_monotonic() {
        for dep in 0..=21 {
            for anx in 0..=21 {
                assert_eq!(risk_level(dep, anx).unwrap(), risk_level(anx, dep).unwrap());
            }
        }
        for dep in 0..=27 {
            for anx in 0..21 {
                assert!(risk_level(dep, anx).unwrap() <= risk_level(dep, anx + 1).unwrap());
            }
        }
        for anx in 0..=21 {
            for dep in 0..27 {
                assert!(risk_level(dep, anx).unwrap() <= risk_level(dep + 1, anx).unwrap());
            }
        }
    }

    #[test]
    fn test_risk_thresholds() {
        // mean 4.5 vs 5.0
        assert_eq!(risk_level(5, 4).unwrap(), RiskLevel::Low);
        assert_eq!(risk_level(5, 5).unwrap(), RiskLevel::Moderate);
        // mean 11.5 vs 12.0
        assert_eq!(risk_level(12, 11).unwrap(), RiskLevel::Moderate);
        assert_eq!(risk_level(12, 12).unwrap(), RiskLevel::High);
    }

    #[test]
    fn test_reference_scenarios() {
        assert_eq!(depression_level(2).unwrap(), DepressionLevel::Minimal);
        assert_eq!(anxiety_level(1).unwrap(), AnxietyLevel::Minimal);
        assert_eq!(risk_level(2, 1).unwrap(), RiskLevel::Low);

        assert_eq!(depression_level(12).unwrap(), DepressionLevel::Moderate);
        assert_eq!(anxiety_level(10).unwrap(), AnxietyLevel::Moderate);
        assert_eq!(risk_level(12, 10).unwrap(), RiskLevel::Moderate);

        assert_eq!(depression_level(22).unwrap(), DepressionLevel::Severe);
        assert_eq!(anxiety_level(18).unwrap(), AnxietyLevel::Severe);
        assert_eq!(risk_level(22, 18).unwrap(), RiskLevel::High);
    }

    #[test]
    fn test_labels_round_trip() {
        for tier in RiskLevel::ALL {
            assert_eq!(RiskLevel::from_label(tier.as_str()), Some(tier));
        }
        assert_eq!(RiskLevel::from_label("LOW"), None);
        assert_eq!(DepressionLevel::ModeratelySevere.to_string(), "Moderately Severe");
    }
}
