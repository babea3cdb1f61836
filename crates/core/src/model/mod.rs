mod question;
mod summary;

pub use question::{Difficulty, Question, QuestionError, RawQuestion};
pub use summary::{QuizSummary, Verdict, round2};
