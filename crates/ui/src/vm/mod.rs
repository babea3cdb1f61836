mod quiz_vm;
mod time_fmt;

pub use quiz_vm::{ChoiceVm, QuestionVm, QuizScreen, ResultsVm, quiz_screen};
pub use time_fmt::{format_duration, format_fixed2};
