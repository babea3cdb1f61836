use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{Question, RawQuestion};
use quiz_core::session::{LoadTicket, QuizEvent, QuizSession};

use crate::Clock;
use crate::error::LoadError;
use crate::provider::QuestionProvider;

/// Drives a `QuizSession`: loads its question set once and stamps events with the clock.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    provider: Arc<dyn QuestionProvider>,
    amount: u32,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, provider: Arc<dyn QuestionProvider>) -> Self {
        Self {
            clock,
            provider,
            amount: crate::QuizConfig::DEFAULT_AMOUNT,
        }
    }

    #[must_use]
    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn amount(&self) -> u32 {
        self.amount
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fetch and shuffle a question set.
    ///
    /// Records that break the question invariants are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the provider fails or nothing usable comes back.
    pub async fn fetch_questions(&self) -> Result<Vec<Question>, LoadError> {
        let raw = self.provider.fetch(self.amount).await?;
        build_questions(raw, &mut rand::rng())
    }

    /// Turn a fetch outcome into the event that completes `ticket`.
    ///
    /// Failures are logged here and carried as `LoadFailed`; they never escape as errors.
    #[must_use]
    pub fn completion_event(
        ticket: LoadTicket,
        result: Result<Vec<Question>, LoadError>,
    ) -> QuizEvent {
        match result {
            Ok(questions) => {
                log::info!("loaded {} questions", questions.len());
                QuizEvent::Loaded { ticket, questions }
            }
            Err(err) => {
                log::warn!("question load failed: {err}");
                QuizEvent::LoadFailed {
                    ticket,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Load the question set for `session` if it does not have one yet.
    ///
    /// The returned session is either `Loaded` or `Failed`; a session that cannot
    /// take a load (already started, already loaded) comes back unchanged.
    pub async fn load(&self, session: &QuizSession) -> QuizSession {
        let (pending, ticket) = match session.request_load() {
            Ok(requested) => requested,
            Err(err) => {
                log::debug!("skipping question load: {err}");
                return session.clone();
            }
        };

        let result = self.fetch_questions().await;
        pending.apply(Self::completion_event(ticket, result), self.now())
    }

    /// Discard any previous run and load a fresh question set.
    pub async fn new_quiz(&self) -> QuizSession {
        self.load(&QuizSession::new()).await
    }

    /// Apply a user event at the current time.
    #[must_use]
    pub fn dispatch(&self, session: &QuizSession, event: QuizEvent) -> QuizSession {
        session.apply(event, self.now())
    }
}

fn build_questions<R: rand::Rng + ?Sized>(
    raw: Vec<RawQuestion>,
    rng: &mut R,
) -> Result<Vec<Question>, LoadError> {
    if raw.is_empty() {
        return Err(LoadError::Empty);
    }

    let received = raw.len();
    let questions: Vec<Question> = raw
        .into_iter()
        .filter_map(|record| {
            let text = record.question_text.clone();
            Question::from_raw(record, rng)
                .inspect_err(|err| log::warn!("dropping question {text:?}: {err}"))
                .ok()
        })
        .collect();

    if questions.is_empty() {
        return Err(LoadError::NoValidQuestions { dropped: received });
    }
    Ok(questions)
}
