use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shuffle::shuffle;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least 2 answers, got {len}")]
    TooFewAnswers { len: usize },

    #[error("correct answer index {index} is out of range for {len} answers")]
    CorrectIndexOutOfRange { index: usize, len: usize },

    #[error("correct answer {answer:?} appears more than once")]
    DuplicateCorrectAnswer { answer: String },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(QuestionError::UnknownDifficulty(s.to_string())),
        }
    }
}

//
// ─── RAW QUESTION ──────────────────────────────────────────────────────────────
//

/// A question record as handed over by a question provider, before shuffling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuestion {
    pub question_text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl RawQuestion {
    #[must_use]
    pub fn new(
        question_text: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Self {
        Self {
            question_text: question_text.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers,
            category: None,
            difficulty: None,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with its answers in display order.
///
/// The correct answer's text appears exactly once in `answers`, so scoring can
/// compare committed answers by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    answers: Vec<String>,
    correct_index: usize,
    category: Option<String>,
    difficulty: Option<Difficulty>,
}

impl Question {
    /// Build a question from answers already in display order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, fewer than two answers are given,
    /// `correct_index` is out of range, or the correct answer text is duplicated.
    pub fn new(
        text: impl Into<String>,
        answers: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if answers.len() < 2 {
            return Err(QuestionError::TooFewAnswers { len: answers.len() });
        }
        let Some(correct) = answers.get(correct_index) else {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                len: answers.len(),
            });
        };
        if answers.iter().filter(|answer| *answer == correct).count() != 1 {
            return Err(QuestionError::DuplicateCorrectAnswer {
                answer: correct.clone(),
            });
        }

        Ok(Self {
            text,
            answers,
            correct_index,
            category: None,
            difficulty: None,
        })
    }

    /// Merge a provider record's answers (correct one last) and shuffle them.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the merged record violates the question invariants.
    pub fn from_raw<R: Rng + ?Sized>(raw: RawQuestion, rng: &mut R) -> Result<Self, QuestionError> {
        let RawQuestion {
            question_text,
            correct_answer,
            incorrect_answers,
            category,
            difficulty,
        } = raw;

        let mut answers = incorrect_answers;
        answers.push(correct_answer.clone());
        shuffle(&mut answers, rng);

        let len = answers.len();
        let correct_index = answers
            .iter()
            .position(|answer| *answer == correct_answer)
            .ok_or(QuestionError::CorrectIndexOutOfRange { index: len, len })?;

        Ok(Self::new(question_text, answers, correct_index)?.with_metadata(category, difficulty))
    }

    #[must_use]
    pub fn with_metadata(mut self, category: Option<String>, difficulty: Option<Difficulty>) -> Self {
        self.category = category;
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.answers[self.correct_index]
    }

    /// Value comparison against the correct answer text.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer() == answer
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }
}
