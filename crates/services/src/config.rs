use std::time::Duration;

use quiz_core::model::Difficulty;

use crate::error::ConfigError;
use crate::opentdb::{OpenTdbConfig, QuestionKind};

pub const ENV_API_URL: &str = "QUIZ_API_URL";
pub const ENV_AMOUNT: &str = "QUIZ_AMOUNT";
pub const ENV_CATEGORY: &str = "QUIZ_CATEGORY";
pub const ENV_DIFFICULTY: &str = "QUIZ_DIFFICULTY";
pub const ENV_QUESTION_TYPE: &str = "QUIZ_QUESTION_TYPE";
pub const ENV_TIMEOUT_SECS: &str = "QUIZ_TIMEOUT_SECS";

/// Quiz settings: how many questions to ask and where to get them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub amount: u32,
    pub api: OpenTdbConfig,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            amount: Self::DEFAULT_AMOUNT,
            api: OpenTdbConfig::default(),
        }
    }
}

impl QuizConfig {
    pub const DEFAULT_AMOUNT: u32 = 5;
    /// Upper bound accepted by the Open Trivia DB per request.
    pub const MAX_AMOUNT: u32 = 50;

    /// Defaults overlaid with `QUIZ_*` environment variables.
    ///
    /// Invalid values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(ENV_API_URL) {
            config.api.base_url = value.trim().to_string();
        }
        apply_env(ENV_AMOUNT, read(ENV_AMOUNT), |value| {
            config.amount = parse_amount(value)?;
            Ok(())
        });
        apply_env(ENV_CATEGORY, read(ENV_CATEGORY), |value| {
            config.api.category = Some(parse_category(value)?);
            Ok(())
        });
        apply_env(ENV_DIFFICULTY, read(ENV_DIFFICULTY), |value| {
            config.api.difficulty = Some(parse_difficulty(value)?);
            Ok(())
        });
        apply_env(ENV_QUESTION_TYPE, read(ENV_QUESTION_TYPE), |value| {
            config.api.kind = Some(value.parse::<QuestionKind>()?);
            Ok(())
        });
        apply_env(ENV_TIMEOUT_SECS, read(ENV_TIMEOUT_SECS), |value| {
            config.api.timeout = parse_timeout(value)?;
            Ok(())
        });

        config
    }
}

fn apply_env(
    key: &str,
    value: Option<String>,
    apply: impl FnOnce(&str) -> Result<(), ConfigError>,
) {
    if let Some(value) = value {
        if let Err(err) = apply(&value) {
            log::warn!("ignoring {key}: {err}");
        }
    }
}

/// # Errors
///
/// Returns `ConfigError::InvalidAmount` unless `raw` is an integer in `1..=MAX_AMOUNT`.
pub fn parse_amount(raw: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidAmount {
        value: raw.to_string(),
        max: QuizConfig::MAX_AMOUNT,
    };
    let amount: u32 = raw.trim().parse().map_err(|_| invalid())?;
    if (1..=QuizConfig::MAX_AMOUNT).contains(&amount) {
        Ok(amount)
    } else {
        Err(invalid())
    }
}

/// # Errors
///
/// Returns `ConfigError::InvalidCategory` if `raw` is not a numeric category id.
pub fn parse_category(raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidCategory(raw.to_string()))
}

/// # Errors
///
/// Returns `ConfigError::InvalidDifficulty` unless `raw` is `easy`, `medium` or `hard`.
pub fn parse_difficulty(raw: &str) -> Result<Difficulty, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::InvalidDifficulty(raw.to_string()))
}

/// # Errors
///
/// Returns `ConfigError::InvalidTimeout` unless `raw` is a positive whole number of seconds.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
