use std::sync::Arc;

use dioxus::prelude::*;
use quiz_core::session::{QuizEvent, QuizSession};
use services::QuizLoopService;

use crate::context::AppContext;
use crate::vm::{QuestionVm, QuizScreen, ResultsVm, quiz_screen};

/// Open a load on the current session and apply the result when it arrives.
///
/// The result is applied to whatever session is current by then; a stale ticket is ignored.
fn begin_load(quiz_loop: Arc<QuizLoopService>, mut session: Signal<QuizSession>) {
    let requested = session.peek().request_load();
    let (pending, ticket) = match requested {
        Ok(requested) => requested,
        Err(err) => {
            log::debug!("not loading questions: {err}");
            return;
        }
    };
    session.set(pending);

    spawn(async move {
        let result = quiz_loop.fetch_questions().await;
        let event = QuizLoopService::completion_event(ticket, result);
        let next = session.peek().apply(event, quiz_loop.now());
        session.set(next);
    });
}

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let quiz_loop = ctx.quiz_loop();
    let mut session = use_signal(QuizSession::new);

    {
        let quiz_loop = Arc::clone(&quiz_loop);
        use_effect(move || begin_load(Arc::clone(&quiz_loop), session));
    }

    let dispatch = {
        let quiz_loop = Arc::clone(&quiz_loop);
        use_callback(move |event: QuizEvent| {
            let next = quiz_loop.dispatch(&session.peek(), event);
            session.set(next);
        })
    };

    let retry = {
        let quiz_loop = Arc::clone(&quiz_loop);
        use_callback(move |()| begin_load(Arc::clone(&quiz_loop), session))
    };

    let new_quiz = {
        let quiz_loop = Arc::clone(&quiz_loop);
        use_callback(move |()| {
            session.set(QuizSession::new());
            begin_load(Arc::clone(&quiz_loop), session);
        })
    };

    let screen = quiz_screen(&session.read());

    rsx! {
        div { class: "quiz-container",
            match screen {
                QuizScreen::Welcome { loading, error, can_start, question_count } => rsx! {
                    WelcomePanel {
                        loading,
                        error,
                        can_start,
                        question_count,
                        on_start: move |()| dispatch.call(QuizEvent::Start),
                        on_retry: retry,
                    }
                },
                QuizScreen::Question(question) => rsx! {
                    QuestionPanel {
                        question,
                        on_select: move |index| dispatch.call(QuizEvent::SelectAnswer { index }),
                        on_advance: move |()| dispatch.call(QuizEvent::Advance),
                    }
                },
                QuizScreen::Results(results) => rsx! {
                    ResultsPanel {
                        results,
                        on_restart: move |()| dispatch.call(QuizEvent::Restart),
                        on_new_quiz: new_quiz,
                    }
                },
            }
        }
    }
}

#[component]
pub fn WelcomePanel(
    loading: bool,
    error: Option<String>,
    can_start: bool,
    question_count: usize,
    on_start: EventHandler<()>,
    on_retry: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            h1 { class: "quiz-title", "Quiz App" }

            if loading {
                p { class: "quiz-meta", "Loading questions..." }
            }
            if can_start {
                p { class: "quiz-meta", "{question_count} questions ready" }
            }

            if let Some(message) = error {
                p { class: "quiz-error", "Could not load questions: {message}" }
                button {
                    class: "btn-primary btn-wide",
                    onclick: move |_| on_retry.call(()),
                    "Retry"
                }
            } else {
                button {
                    class: "btn-primary btn-wide",
                    disabled: !can_start,
                    onclick: move |_| on_start.call(()),
                    "Start"
                }
            }
        }
    }
}

#[component]
pub fn QuestionPanel(
    question: QuestionVm,
    on_select: EventHandler<usize>,
    on_advance: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            h1 { "Quiz App" }
            p { class: "quiz-progress", "{question.progress_label}" }
            if let Some(meta) = question.meta.as_ref() {
                p { class: "quiz-meta", "{meta}" }
            }
            h2 { "{question.prompt}" }

            ul { class: "choices",
                {question.choices.iter().map(|choice| {
                    let index = choice.index;
                    rsx! {
                        li { key: "{index}",
                            button {
                                class: if choice.chosen { "choice chosen" } else { "choice" },
                                onclick: move |_| on_select.call(index),
                                "{choice.label}"
                            }
                        }
                    }
                })}
            }

            button {
                class: "btn-primary btn-advance",
                disabled: !question.can_advance,
                onclick: move |_| on_advance.call(()),
                "{question.advance_label}"
            }
        }
    }
}

#[component]
pub fn ResultsPanel(
    results: ResultsVm,
    on_restart: EventHandler<()>,
    on_new_quiz: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            h1 { "Quiz Results" }
            h2 {
                class: if results.passed { "verdict pass" } else { "verdict fail" },
                "{results.verdict_label}"
            }
            p { "Correct answers: {results.correct}" }
            p { "Wrong answers: {results.wrong}" }
            p { "Score: {results.score_str}" }
            p { "Time taken: {results.duration_str}" }

            div { class: "results-actions",
                button {
                    class: "btn-primary",
                    onclick: move |_| on_restart.call(()),
                    "Restart"
                }
                button {
                    class: "btn-primary",
                    onclick: move |_| on_new_quiz.call(()),
                    "New quiz"
                }
            }
        }
    }
}
