use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::model::Question;

/// Round to two decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//
// ─── VERDICT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Pass only when strictly more than half of the answers are correct.
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.5 { Self::Pass } else { Self::Fail }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pass => "Pass",
            Verdict::Fail => "Fail",
        }
    }

    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Score for a set of committed answers.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    total: usize,
    correct_count: usize,
    wrong_count: usize,
    score_percent: f64,
    verdict: Verdict,
    duration_seconds: Option<f64>,
}

impl QuizSummary {
    /// Score `selected` against `questions`. Unanswered questions count as wrong.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_answers(
        questions: &[Question],
        selected: &BTreeMap<usize, String>,
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    ) -> Self {
        let total = questions.len();
        let correct_count = questions
            .iter()
            .enumerate()
            .filter(|(index, question)| {
                selected
                    .get(index)
                    .is_some_and(|answer| question.is_correct(answer))
            })
            .count();
        let wrong_count = total - correct_count;

        let ratio = if total == 0 {
            0.0
        } else {
            correct_count as f64 / total as f64
        };

        let duration_seconds = match (started_at, finished_at) {
            (Some(start), Some(end)) => {
                Some(round2((end - start).num_milliseconds() as f64 / 1000.0))
            }
            _ => None,
        };

        Self {
            total,
            correct_count,
            wrong_count,
            score_percent: round2(ratio * 100.0),
            verdict: Verdict::from_ratio(ratio),
            duration_seconds,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.wrong_count
    }

    #[must_use]
    pub fn score_percent(&self) -> f64 {
        self.score_percent
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Seconds between start and finish, `None` until both are recorded.
    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_seconds
    }
}
