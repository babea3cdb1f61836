use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{Difficulty, RawQuestion};
use reqwest::Client;
use serde::Deserialize;
use url::{Url, form_urlencoded};

use crate::error::{ConfigError, ProviderError};
use crate::provider::QuestionProvider;

pub const DEFAULT_BASE_URL: &str = "https://opentdb.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Multiple,
    Boolean,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Multiple => "multiple",
            QuestionKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiple" => Ok(Self::Multiple),
            "boolean" => Ok(Self::Boolean),
            _ => Err(ConfigError::InvalidQuestionKind(s.to_string())),
        }
    }
}

/// Request knobs for the Open Trivia DB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenTdbConfig {
    pub base_url: String,
    pub category: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub kind: Option<QuestionKind>,
    pub timeout: Duration,
}

impl Default for OpenTdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            category: None,
            difficulty: None,
            kind: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OpenTdbConfig {
    /// Build the `api.php` request url for `amount` questions.
    ///
    /// Text fields are requested RFC 3986 percent-encoded so they decode losslessly.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidUrl` if `base_url` does not parse.
    pub fn request_url(&self, amount: u32) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}/api.php", self.base_url.trim_end_matches('/')))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("amount", &amount.to_string());
            query.append_pair("encode", "url3986");
            if let Some(category) = self.category {
                query.append_pair("category", &category.to_string());
            }
            if let Some(difficulty) = self.difficulty {
                query.append_pair("difficulty", difficulty.as_str());
            }
            if let Some(kind) = self.kind {
                query.append_pair("type", kind.as_str());
            }
        }
        Ok(url)
    }
}

/// `QuestionProvider` talking to the Open Trivia DB HTTP API.
#[derive(Clone)]
pub struct OpenTdbProvider {
    client: Client,
    config: OpenTdbConfig,
}

impl OpenTdbProvider {
    /// # Errors
    ///
    /// Returns `ProviderError::Http` if the HTTP client cannot be built.
    pub fn new(config: OpenTdbConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &OpenTdbConfig {
        &self.config
    }
}

#[async_trait]
impl QuestionProvider for OpenTdbProvider {
    async fn fetch(&self, amount: u32) -> Result<Vec<RawQuestion>, ProviderError> {
        let url = self.config.request_url(amount)?;
        log::info!("requesting {amount} questions from {}", url.host_str().unwrap_or("?"));

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status()));
        }

        let body: OpenTdbResponse = response.json().await?;
        body.into_questions()
    }
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct OpenTdbResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<OpenTdbRecord>,
}

#[derive(Debug, Deserialize)]
struct OpenTdbRecord {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    question: String,
    correct_answer: String,
    #[serde(default)]
    incorrect_answers: Vec<String>,
}

impl OpenTdbResponse {
    fn into_questions(self) -> Result<Vec<RawQuestion>, ProviderError> {
        if self.response_code != 0 {
            return Err(ProviderError::Api {
                code: self.response_code,
                reason: response_reason(self.response_code),
            });
        }
        Ok(self.results.into_iter().map(OpenTdbRecord::into_raw).collect())
    }
}

impl OpenTdbRecord {
    fn into_raw(self) -> RawQuestion {
        let difficulty = self.difficulty.as_deref().map(decode).and_then(|raw| {
            raw.parse::<Difficulty>()
                .inspect_err(|err| log::debug!("ignoring difficulty: {err}"))
                .ok()
        });

        RawQuestion {
            question_text: decode(&self.question),
            correct_answer: decode(&self.correct_answer),
            incorrect_answers: self.incorrect_answers.iter().map(|a| decode(a)).collect(),
            category: self.category.as_deref().map(decode),
            difficulty,
        }
    }
}

fn response_reason(code: u8) -> &'static str {
    match code {
        1 => "not enough questions for the query",
        2 => "invalid parameter",
        3 => "session token not found",
        4 => "session token exhausted",
        5 => "rate limited",
        _ => "unknown response code",
    }
}

/// Undo RFC 3986 percent-encoding on a single field.
fn decode(raw: &str) -> String {
    // Reserved characters arrive encoded, so the whole field parses as one key.
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}
