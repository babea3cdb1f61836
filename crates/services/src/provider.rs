use async_trait::async_trait;
use quiz_core::model::RawQuestion;

use crate::error::ProviderError;

/// Source of quiz content. A quiz asks it for `amount` questions once per session.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch up to `amount` question records.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the source cannot be reached or replies with garbage.
    async fn fetch(&self, amount: u32) -> Result<Vec<RawQuestion>, ProviderError>;
}

/// Provider backed by a fixed list of records. Useful for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionProvider {
    questions: Vec<RawQuestion>,
}

impl StaticQuestionProvider {
    #[must_use]
    pub fn new(questions: Vec<RawQuestion>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionProvider for StaticQuestionProvider {
    async fn fetch(&self, amount: u32) -> Result<Vec<RawQuestion>, ProviderError> {
        let amount = usize::try_from(amount).unwrap_or(usize::MAX);
        Ok(self.questions.iter().take(amount).cloned().collect())
    }
}
