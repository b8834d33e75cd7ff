//! PHQ-9 and GAD-7 item definitions and response validation.

use serde::{Deserialize, Serialize};

use super::scoring::{ScoreError, MAX_ITEM_ANSWER};

/// Shared four-point answer scale ("Over the last 2 weeks, how often...").
pub const ANSWER_SCALE: [(u8, &str); 4] = [
    (0, "Not at all"),
    (1, "Several days"),
    (2, "More than half the days"),
    (3, "Nearly every day"),
];

const PHQ9_ITEMS: [&str; 9] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself or feeling that you are a failure or have let your family down",
    "Trouble concentrating on things, such as reading the newspaper or watching television",
    "Moving or speaking so slowly that other people could have noticed, or so fidgety or restless that you have been moving around a lot more than usual",
    "Thoughts that you would be better off dead or of hurting yourself in some way",
];

const GAD7_ITEMS: [&str; 7] = [
    "Feeling nervous, anxious, or on edge",
    "Not being able to stop or control worrying",
    "Worrying too much about different things",
    "Trouble relaxing",
    "Being so restless that it is hard to sit still",
    "Becoming easily annoyed or irritable",
    "Feeling afraid as if something awful might happen",
];

/// The two supported screening instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Questionnaire {
    /// Patient Health Questionnaire (depression)
    Phq9,
    /// Generalized Anxiety Disorder scale
    Gad7,
}

impl Questionnaire {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Phq9 => "PHQ-9",
            Self::Gad7 => "GAD-7",
        }
    }

    #[must_use]
    pub fn items(&self) -> &'static [&'static str] {
        match self {
            Self::Phq9 => &PHQ9_ITEMS,
            Self::Gad7 => &GAD7_ITEMS,
        }
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items().len()
    }

    /// Highest reachable sub-score.
    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.item_count() as u32 * u32::from(MAX_ITEM_ANSWER)
    }
}

/// Validated item-level answers for one questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireResponses {
    questionnaire: Questionnaire,
    answers: Vec<u8>,
}

impl QuestionnaireResponses {
    /// Validate answers against the instrument.
    ///
    /// # Errors
    /// Returns `ScoreError::InvalidResponses` on a wrong item count or an
    /// answer above 3.
    pub fn new(questionnaire: Questionnaire, answers: Vec<u8>) -> Result<Self, ScoreError> {
        if answers.len() != questionnaire.item_count() {
            return Err(ScoreError::InvalidResponses {
                scale: questionnaire.name(),
                reason: format!(
                    "expected {} answers, got {}",
                    questionnaire.item_count(),
                    answers.len()
                ),
            });
        }
        if let Some((idx, answer)) = answers
            .iter()
            .enumerate()
            .find(|(_, &a)| a > MAX_ITEM_ANSWER)
        {
            return Err(ScoreError::InvalidResponses {
                scale: questionnaire.name(),
                reason: format!("item {} answer {} exceeds {}", idx + 1, answer, MAX_ITEM_ANSWER),
            });
        }

        Ok(Self {
            questionnaire,
            answers,
        })
    }

    #[must_use]
    pub fn questionnaire(&self) -> Questionnaire {
        self.questionnaire
    }

    #[must_use]
    pub fn answers(&self) -> &[u8] {
        &self.answers
    }

    /// Summed item total.
    #[must_use]
    pub fn sub_score(&self) -> u32 {
        self.answers.iter().map(|&a| u32::from(a)).sum()
    }
}
