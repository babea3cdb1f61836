use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Question, QuizSummary};

//
// ─── PHASE & LOAD STATUS ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizPhase {
    NotStarted,
    InProgress,
    Finished,
}

/// Identifies one in-flight question load. Results carrying any other ticket are stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(Uuid);

impl LoadTicket {
    fn issue() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoadTicket({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading(LoadTicket),
    Loaded,
    Failed { message: String },
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    Loaded {
        ticket: LoadTicket,
        questions: Vec<Question>,
    },
    LoadFailed {
        ticket: LoadTicket,
        message: String,
    },
    Start,
    SelectAnswer {
        index: usize,
    },
    Advance,
    Restart,
}

impl QuizEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            QuizEvent::Loaded { .. } => "loaded",
            QuizEvent::LoadFailed { .. } => "load_failed",
            QuizEvent::Start => "start",
            QuizEvent::SelectAnswer { .. } => "select_answer",
            QuizEvent::Advance => "advance",
            QuizEvent::Restart => "restart",
        }
    }
}

/// Why an event was not applied. The session is left untouched in every case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("{event} is not valid while {phase:?}")]
    InvalidPhase {
        event: &'static str,
        phase: QuizPhase,
    },

    #[error("questions are already loaded")]
    AlreadyLoaded,

    #[error("a question load is already in flight")]
    LoadInFlight,

    #[error("load result does not belong to the in-flight request")]
    StaleTicket,

    #[error("there are no questions to start")]
    NoQuestions,

    #[error("answer index {index} is out of range for {len} answers")]
    AnswerOutOfRange { index: usize, len: usize },

    #[error("no answer selected for question {index}")]
    NoSelection { index: usize },
}

/// Position within an active quiz, for "Question 2 of 5" style displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub is_last: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz run over a fixed question set.
///
/// Every transition returns a new session and leaves `self` untouched, so callers
/// can keep the previous state around and compare.
#[derive(Clone, PartialEq)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_index: usize,
    selected_answers: BTreeMap<usize, String>,
    highlighted: Option<usize>,
    phase: QuizPhase,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    load_status: LoadStatus,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            current_index: 0,
            selected_answers: BTreeMap::new(),
            highlighted: None,
            phase: QuizPhase::NotStarted,
            started_at: None,
            finished_at: None,
            load_status: LoadStatus::Idle,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question on screen. `None` outside `InProgress`.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == QuizPhase::InProgress {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    #[must_use]
    pub fn selected_answers(&self) -> &BTreeMap<usize, String> {
        &self.selected_answers
    }

    #[must_use]
    pub fn selected_answer(&self, index: usize) -> Option<&str> {
        self.selected_answers.get(&index).map(String::as_str)
    }

    /// Transient choice highlight for the current question.
    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.load_status, LoadStatus::Loading(_))
    }

    #[must_use]
    pub fn can_start(&self) -> bool {
        self.phase == QuizPhase::NotStarted && self.has_questions()
    }

    /// True when the current question has a committed answer.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.phase == QuizPhase::InProgress
            && self.selected_answers.contains_key(&self.current_index)
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        QuizProgress {
            position: (self.current_index + 1).min(total),
            total,
            answered: self.selected_answers.len(),
            is_last: total > 0 && self.current_index + 1 >= total,
        }
    }

    /// Score derived from the committed answers. Meaningful once `Finished`.
    #[must_use]
    pub fn summary(&self) -> QuizSummary {
        QuizSummary::from_answers(
            &self.questions,
            &self.selected_answers,
            self.started_at,
            self.finished_at,
        )
    }

    /// Open a question load and return the ticket its result must carry.
    ///
    /// Only one question set is ever accepted per session; a failed load may be retried.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the quiz has started, questions are already present,
    /// or another load is in flight.
    pub fn request_load(&self) -> Result<(Self, LoadTicket), TransitionError> {
        self.expect_phase("request_load", QuizPhase::NotStarted)?;
        if self.has_questions() {
            return Err(TransitionError::AlreadyLoaded);
        }
        match self.load_status {
            LoadStatus::Idle | LoadStatus::Failed { .. } => {}
            LoadStatus::Loading(_) => return Err(TransitionError::LoadInFlight),
            LoadStatus::Loaded => return Err(TransitionError::AlreadyLoaded),
        }

        let ticket = LoadTicket::issue();
        let mut next = self.clone();
        next.load_status = LoadStatus::Loading(ticket);
        Ok((next, ticket))
    }

    /// Apply `event` at time `now`.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` describing why the event is not legal in the current state.
    pub fn try_apply(&self, event: QuizEvent, now: DateTime<Utc>) -> Result<Self, TransitionError> {
        match event {
            QuizEvent::Loaded { ticket, questions } => {
                self.expect_ticket(ticket)?;
                let mut next = self.clone();
                if questions.is_empty() {
                    next.load_status = LoadStatus::Failed {
                        message: "no questions available".to_string(),
                    };
                } else {
                    next.questions = questions;
                    next.load_status = LoadStatus::Loaded;
                }
                Ok(next)
            }
            QuizEvent::LoadFailed { ticket, message } => {
                self.expect_ticket(ticket)?;
                let mut next = self.clone();
                next.load_status = LoadStatus::Failed { message };
                Ok(next)
            }
            QuizEvent::Start => {
                self.expect_phase("start", QuizPhase::NotStarted)?;
                if !self.has_questions() {
                    return Err(TransitionError::NoQuestions);
                }
                let mut next = self.clone();
                next.started_at = Some(now);
                next.current_index = 0;
                next.highlighted = None;
                next.phase = QuizPhase::InProgress;
                Ok(next)
            }
            QuizEvent::SelectAnswer { index } => {
                self.expect_phase("select_answer", QuizPhase::InProgress)?;
                let question = &self.questions[self.current_index];
                let Some(answer) = question.answer(index) else {
                    return Err(TransitionError::AnswerOutOfRange {
                        index,
                        len: question.answers().len(),
                    });
                };
                let mut next = self.clone();
                next.selected_answers
                    .insert(self.current_index, answer.to_string());
                next.highlighted = Some(index);
                Ok(next)
            }
            QuizEvent::Advance => {
                self.expect_phase("advance", QuizPhase::InProgress)?;
                if !self.selected_answers.contains_key(&self.current_index) {
                    return Err(TransitionError::NoSelection {
                        index: self.current_index,
                    });
                }
                let mut next = self.clone();
                next.highlighted = None;
                if self.current_index + 1 < self.questions.len() {
                    next.current_index += 1;
                } else {
                    next.finished_at = Some(now);
                    next.phase = QuizPhase::Finished;
                }
                Ok(next)
            }
            QuizEvent::Restart => {
                self.expect_phase("restart", QuizPhase::Finished)?;
                let mut next = self.clone();
                next.selected_answers.clear();
                next.highlighted = None;
                next.started_at = None;
                next.finished_at = None;
                next.current_index = 0;
                next.phase = QuizPhase::NotStarted;
                Ok(next)
            }
        }
    }

    /// Apply `event`, keeping the current state when it is rejected.
    #[must_use]
    pub fn apply(&self, event: QuizEvent, now: DateTime<Utc>) -> Self {
        let name = event.name();
        match self.try_apply(event, now) {
            Ok(next) => next,
            Err(err) => {
                log::debug!("ignored {name} event: {err}");
                self.clone()
            }
        }
    }

    #[must_use]
    pub fn start(&self, now: DateTime<Utc>) -> Self {
        self.apply(QuizEvent::Start, now)
    }

    #[must_use]
    pub fn select_answer(&self, index: usize, now: DateTime<Utc>) -> Self {
        self.apply(QuizEvent::SelectAnswer { index }, now)
    }

    #[must_use]
    pub fn advance(&self, now: DateTime<Utc>) -> Self {
        self.apply(QuizEvent::Advance, now)
    }

    #[must_use]
    pub fn restart(&self, now: DateTime<Utc>) -> Self {
        self.apply(QuizEvent::Restart, now)
    }

    fn expect_phase(&self, event: &'static str, phase: QuizPhase) -> Result<(), TransitionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(TransitionError::InvalidPhase {
                event,
                phase: self.phase,
            })
        }
    }

    fn expect_ticket(&self, ticket: LoadTicket) -> Result<(), TransitionError> {
        match self.load_status {
            LoadStatus::Loading(current) if current == ticket => Ok(()),
            _ => Err(TransitionError::StaleTicket),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current_index", &self.current_index)
            .field("answered", &self.selected_answers.len())
            .field("highlighted", &self.highlighted)
            .field("phase", &self.phase)
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .field("load_status", &self.load_status)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Verdict;
    use crate::time::{fixed_clock, fixed_now};
    use chrono::Duration;

    fn abcd(correct: usize) -> Question {
        let answers = ["A", "B", "C", "D"].iter().map(|s| (*s).to_string()).collect();
        Question::new("Pick one", answers, correct).unwrap()
    }

    fn loaded(questions: Vec<Question>) -> QuizSession {
        let (session, ticket) = QuizSession::new().request_load().unwrap();
        session
            .try_apply(QuizEvent::Loaded { ticket, questions }, fixed_now())
            .unwrap()
    }

    fn two_question_session() -> QuizSession {
        loaded(vec![abcd(1), abcd(3)])
    }

    #[test]
    fn new_session_is_empty_and_not_started() {
        let session = QuizSession::new();
        assert_eq!(session.phase(), QuizPhase::NotStarted);
        assert!(session.questions().is_empty());
        assert_eq!(session.load_status(), &LoadStatus::Idle);
        assert_eq!(session.started_at(), None);
        assert_eq!(session.finished_at(), None);
    }

    #[test]
    fn load_is_accepted_once() {
        let session = two_question_session();
        assert_eq!(session.questions().len(), 2);
        assert_eq!(session.load_status(), &LoadStatus::Loaded);
        assert_eq!(session.request_load().unwrap_err(), TransitionError::AlreadyLoaded);
    }

    #[test]
    fn second_request_while_loading_is_rejected() {
        let (session, _ticket) = QuizSession::new().request_load().unwrap();
        assert!(session.is_loading());
        assert_eq!(session.request_load().unwrap_err(), TransitionError::LoadInFlight);
    }

    #[test]
    fn stale_ticket_cannot_overwrite_questions() {
        let (_discarded, stale) = QuizSession::new().request_load().unwrap();
        let (fresh, _current) = QuizSession::new().request_load().unwrap();

        let err = fresh
            .try_apply(
                QuizEvent::Loaded {
                    ticket: stale,
                    questions: vec![abcd(0)],
                },
                fixed_now(),
            )
            .unwrap_err();
        assert_eq!(err, TransitionError::StaleTicket);
        assert_eq!(
            fresh.apply(
                QuizEvent::Loaded {
                    ticket: stale,
                    questions: vec![abcd(0)],
                },
                fixed_now()
            ),
            fresh
        );
    }

    #[test]
    fn load_failure_keeps_session_empty_and_allows_retry() {
        let (session, ticket) = QuizSession::new().request_load().unwrap();
        let failed = session.apply(
            QuizEvent::LoadFailed {
                ticket,
                message: "network down".to_string(),
            },
            fixed_now(),
        );

        assert!(failed.questions().is_empty());
        assert_eq!(failed.phase(), QuizPhase::NotStarted);
        assert_eq!(
            failed.load_status(),
            &LoadStatus::Failed {
                message: "network down".to_string()
            }
        );
        assert!(!failed.can_start());
        assert_eq!(failed.start(fixed_now()), failed);
        assert!(failed.request_load().is_ok());
    }

    #[test]
    fn empty_question_set_is_recorded_as_failure() {
        let (session, ticket) = QuizSession::new().request_load().unwrap();
        let next = session.apply(
            QuizEvent::Loaded {
                ticket,
                questions: Vec::new(),
            },
            fixed_now(),
        );
        assert!(matches!(next.load_status(), LoadStatus::Failed { .. }));
        assert_eq!(next.phase(), QuizPhase::NotStarted);
    }

    #[test]
    fn start_requires_questions() {
        let err = QuizSession::new()
            .try_apply(QuizEvent::Start, fixed_now())
            .unwrap_err();
        assert_eq!(err, TransitionError::NoQuestions);
    }

    #[test]
    fn start_records_time_and_enters_progress() {
        let session = two_question_session().start(fixed_now());
        assert_eq!(session.phase(), QuizPhase::InProgress);
        assert_eq!(session.started_at(), Some(fixed_now()));
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_question(), Some(&abcd(1)));
    }

    #[test]
    fn select_answer_requires_progress_phase() {
        let err = two_question_session()
            .try_apply(QuizEvent::SelectAnswer { index: 0 }, fixed_now())
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidPhase {
                event: "select_answer",
                phase: QuizPhase::NotStarted
            }
        );
    }

    #[test]
    fn select_answer_overwrites_without_advancing() {
        let session = two_question_session()
            .start(fixed_now())
            .select_answer(0, fixed_now())
            .select_answer(2, fixed_now());

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.selected_answer(0), Some("C"));
        assert_eq!(session.highlighted(), Some(2));
        assert_eq!(session.selected_answers().len(), 1);
    }

    #[test]
    fn select_answer_rejects_out_of_range_index() {
        let session = two_question_session().start(fixed_now());
        let err = session
            .try_apply(QuizEvent::SelectAnswer { index: 4 }, fixed_now())
            .unwrap_err();
        assert_eq!(err, TransitionError::AnswerOutOfRange { index: 4, len: 4 });
    }

    #[test]
    fn advance_without_selection_is_a_no_op() {
        let session = two_question_session().start(fixed_now());
        let next = session.advance(fixed_now());

        assert_eq!(next.current_index(), session.current_index());
        assert_eq!(next.phase(), session.phase());
        assert_eq!(
            session
                .try_apply(QuizEvent::Advance, fixed_now())
                .unwrap_err(),
            TransitionError::NoSelection { index: 0 }
        );
    }

    #[test]
    fn advance_clears_highlight_and_moves_on() {
        let session = two_question_session()
            .start(fixed_now())
            .select_answer(1, fixed_now())
            .advance(fixed_now());

        assert_eq!(session.current_index(), 1);
        assert_eq!(session.highlighted(), None);
        assert!(!session.can_advance());
        assert!(session.progress().is_last);
    }

    #[test]
    fn advance_on_last_question_finishes() {
        let mut clock = fixed_clock();
        let started = clock.now();
        let mut session = two_question_session().start(started);
        session = session.select_answer(1, clock.now()).advance(clock.now());
        clock.advance(Duration::milliseconds(4_250));
        session = session.select_answer(3, clock.now()).advance(clock.now());

        assert_eq!(session.phase(), QuizPhase::Finished);
        assert_eq!(session.finished_at(), Some(clock.now()));
        assert_eq!(session.summary().duration_seconds(), Some(4.25));
        assert_eq!(session.current_question(), None);
    }

    #[test]
    fn restart_only_from_finished() {
        let session = two_question_session().start(fixed_now());
        let err = session
            .try_apply(QuizEvent::Restart, fixed_now())
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidPhase { event: "restart", .. }));
    }

    #[test]
    fn restart_preserves_question_set() {
        let finished = two_question_session()
            .start(fixed_now())
            .select_answer(1, fixed_now())
            .advance(fixed_now())
            .select_answer(0, fixed_now())
            .advance(fixed_now());
        assert_eq!(finished.phase(), QuizPhase::Finished);

        let restarted = finished.restart(fixed_now());
        assert_eq!(restarted.phase(), QuizPhase::NotStarted);
        assert_eq!(restarted.started_at(), None);
        assert_eq!(restarted.finished_at(), None);

        let again = restarted.start(fixed_now());
        assert_eq!(again.phase(), QuizPhase::InProgress);
        assert_eq!(again.questions(), finished.questions());
        assert!(again.selected_answers().is_empty());
        assert_eq!(again.current_index(), 0);
    }

    #[test]
    fn scenario_one_right_one_wrong_fails() {
        let session = two_question_session()
            .start(fixed_now())
            .select_answer(1, fixed_now())
            .advance(fixed_now())
            .select_answer(2, fixed_now())
            .advance(fixed_now());

        let summary = session.summary();
        assert_eq!(session.phase(), QuizPhase::Finished);
        assert_eq!(summary.correct_count(), 1);
        assert_eq!(summary.wrong_count(), 1);
        assert!((summary.score_percent() - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.verdict(), Verdict::Fail);
        assert_eq!(summary.verdict().label(), "Fail");
    }

    #[test]
    fn scenario_all_right_passes() {
        let session = two_question_session()
            .start(fixed_now())
            .select_answer(1, fixed_now())
            .advance(fixed_now())
            .select_answer(3, fixed_now())
            .advance(fixed_now());

        let summary = session.summary();
        assert_eq!(summary.correct_count(), 2);
        assert_eq!(summary.wrong_count(), 0);
        assert!((summary.score_percent() - 100.0).abs() < f64::EPSILON);
        assert_eq!(summary.verdict().label(), "Pass");
    }

    #[test]
    fn progress_reports_position() {
        let session = two_question_session().start(fixed_now());
        assert_eq!(
            session.progress(),
            QuizProgress {
                position: 1,
                total: 2,
                answered: 0,
                is_last: false,
            }
        );
    }
}
