//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted by a `QuestionProvider`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("invalid provider url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("question request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("trivia api returned code {code}: {reason}")]
    Api { code: u8, reason: &'static str },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("provider is unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted while turning provider records into a question set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("no questions available")]
    Empty,
    #[error("all {dropped} questions from the provider were malformed")]
    NoValidQuestions { dropped: usize },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors emitted while validating quiz configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("amount must be between 1 and {max}, got {value}")]
    InvalidAmount { value: String, max: u32 },
    #[error("invalid category id: {0}")]
    InvalidCategory(String),
    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(String),
    #[error("invalid question type: {0}")]
    InvalidQuestionKind(String),
    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(String),
    #[error("api url cannot be empty")]
    EmptyApiUrl,
}
