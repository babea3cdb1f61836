use std::sync::Arc;

use services::QuizLoopService;

/// What the composition root (e.g. `crates/app`) hands to the UI.
pub trait UiApp: Send + Sync {
    fn quiz_loop(&self) -> Arc<QuizLoopService>;
}

#[derive(Clone)]
pub struct AppContext {
    quiz_loop: Arc<QuizLoopService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            quiz_loop: app.quiz_loop(),
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}

#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
