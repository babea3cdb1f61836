mod quiz;
#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use quiz::{QuestionPanel, QuizView, ResultsPanel, WelcomePanel};
