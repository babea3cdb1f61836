use quiz_core::model::{Question, QuizSummary};
use quiz_core::session::{LoadStatus, QuizPhase, QuizSession};

use crate::vm::time_fmt::{format_duration, format_fixed2};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub index: usize,
    pub label: String,
    pub chosen: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub prompt: String,
    pub meta: Option<String>,
    pub progress_label: String,
    pub choices: Vec<ChoiceVm>,
    pub advance_label: &'static str,
    pub can_advance: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub verdict_label: &'static str,
    pub passed: bool,
    pub correct: usize,
    pub wrong: usize,
    pub score_str: String,
    pub duration_str: String,
}

impl From<&QuizSummary> for ResultsVm {
    fn from(summary: &QuizSummary) -> Self {
        Self {
            verdict_label: summary.verdict().label(),
            passed: summary.verdict().is_pass(),
            correct: summary.correct_count(),
            wrong: summary.wrong_count(),
            score_str: format_fixed2(summary.score_percent()),
            duration_str: format_duration(summary.duration_seconds()),
        }
    }
}

/// What the quiz page should show for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizScreen {
    Welcome {
        loading: bool,
        error: Option<String>,
        can_start: bool,
        question_count: usize,
    },
    Question(QuestionVm),
    Results(ResultsVm),
}

#[must_use]
pub fn quiz_screen(session: &QuizSession) -> QuizScreen {
    match session.phase() {
        QuizPhase::NotStarted => QuizScreen::Welcome {
            loading: session.is_loading(),
            error: match session.load_status() {
                LoadStatus::Failed { message } => Some(message.clone()),
                _ => None,
            },
            can_start: session.can_start(),
            question_count: session.questions().len(),
        },
        QuizPhase::InProgress => match session.current_question() {
            Some(question) => QuizScreen::Question(question_vm(session, question)),
            None => QuizScreen::Welcome {
                loading: false,
                error: None,
                can_start: false,
                question_count: 0,
            },
        },
        QuizPhase::Finished => QuizScreen::Results(ResultsVm::from(&session.summary())),
    }
}

fn question_vm(session: &QuizSession, question: &Question) -> QuestionVm {
    let progress = session.progress();
    let meta = match (question.category(), question.difficulty()) {
        (Some(category), Some(difficulty)) => Some(format!("{category} · {difficulty}")),
        (Some(category), None) => Some(category.to_string()),
        (None, Some(difficulty)) => Some(difficulty.to_string()),
        (None, None) => None,
    };

    QuestionVm {
        prompt: question.text().to_string(),
        meta,
        progress_label: format!("Question {} of {}", progress.position, progress.total),
        choices: question
            .answers()
            .iter()
            .enumerate()
            .map(|(index, label)| ChoiceVm {
                index,
                label: label.clone(),
                chosen: session.highlighted() == Some(index),
            })
            .collect(),
        advance_label: if progress.is_last { "Finish" } else { "Next" },
        can_advance: session.can_advance(),
    }
}
