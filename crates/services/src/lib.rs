#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod opentdb;
pub mod provider;
pub mod quiz_loop;

pub use quiz_core::Clock;

pub use config::QuizConfig;
pub use error::{ConfigError, LoadError, ProviderError};
pub use opentdb::{OpenTdbConfig, OpenTdbProvider, QuestionKind};
pub use provider::{QuestionProvider, StaticQuestionProvider};
pub use quiz_loop::QuizLoopService;
