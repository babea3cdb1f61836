use std::sync::Arc;

use dioxus::prelude::*;
use quiz_core::model::RawQuestion;
use services::{ProviderError, QuestionProvider, StaticQuestionProvider};

use super::test_harness::{drive_dom, setup_quiz_harness};
use crate::views::{QuestionPanel, ResultsPanel, WelcomePanel};
use crate::vm::{ChoiceVm, QuestionVm, ResultsVm};

struct FailingProvider;

#[async_trait::async_trait]
impl QuestionProvider for FailingProvider {
    async fn fetch(&self, _amount: u32) -> Result<Vec<RawQuestion>, ProviderError> {
        Err(ProviderError::Unavailable("offline".to_string()))
    }
}

fn render_root(root: fn() -> Element) -> String {
    let mut dom = VirtualDom::new(root);
    dom.rebuild_in_place();
    drive_dom(&mut dom);
    dioxus_ssr::render(&dom)
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_offers_start_once_questions_load() {
    let provider = StaticQuestionProvider::new(vec![
        RawQuestion::new("Largest planet?", "Jupiter", vec!["Mars".into(), "Venus".into()]),
        RawQuestion::new("Smallest planet?", "Mercury", vec!["Earth".into(), "Mars".into()]),
    ]);
    let mut harness = setup_quiz_harness(Arc::new(provider));

    harness.rebuild();
    assert!(harness.render().contains("Quiz App"));

    let html = harness.drive_until("2 questions ready").await;
    assert!(html.contains("2 questions ready"), "missing ready text in {html}");
    assert!(html.contains("Start"), "missing start button in {html}");
    assert!(!html.contains("Retry"), "unexpected retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_shows_retry_when_load_fails() {
    let mut harness = setup_quiz_harness(Arc::new(FailingProvider));

    harness.rebuild();
    let html = harness.drive_until("Retry").await;
    assert!(html.contains("Could not load questions"), "missing error in {html}");
    assert!(html.contains("offline"), "missing cause in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[test]
fn welcome_panel_disables_start_while_loading() {
    fn root() -> Element {
        rsx! {
            WelcomePanel {
                loading: true,
                error: None,
                can_start: false,
                question_count: 0,
                on_start: move |()| {},
                on_retry: move |()| {},
            }
        }
    }

    let html = render_root(root);
    assert!(html.contains("Loading questions..."), "missing loading text in {html}");
    assert!(html.contains("disabled"), "start should be disabled in {html}");
}

#[test]
fn question_panel_marks_chosen_answer() {
    fn root() -> Element {
        let question = QuestionVm {
            prompt: "Best planet?".to_string(),
            meta: Some("Science · easy".to_string()),
            progress_label: "Question 1 of 5".to_string(),
            choices: ["Earth", "Mars"]
                .iter()
                .enumerate()
                .map(|(index, label)| ChoiceVm {
                    index,
                    label: (*label).to_string(),
                    chosen: index == 1,
                })
                .collect(),
            advance_label: "Next",
            can_advance: true,
        };
        rsx! {
            QuestionPanel {
                question,
                on_select: move |_index: usize| {},
                on_advance: move |()| {},
            }
        }
    }

    let html = render_root(root);
    assert!(html.contains("Best planet?"), "missing prompt in {html}");
    assert!(html.contains("Question 1 of 5"), "missing progress in {html}");
    assert!(html.contains("choice chosen"), "missing highlight in {html}");
    assert!(html.contains("Next"), "missing advance label in {html}");
}

#[test]
fn results_panel_renders_score_and_verdict() {
    fn root() -> Element {
        let results = ResultsVm {
            verdict_label: "Fail",
            passed: false,
            correct: 1,
            wrong: 1,
            score_str: "50.00".to_string(),
            duration_str: "12.35 seconds".to_string(),
        };
        rsx! {
            ResultsPanel {
                results,
                on_restart: move |()| {},
                on_new_quiz: move |()| {},
            }
        }
    }

    let html = render_root(root);
    assert!(html.contains("Quiz Results"), "missing title in {html}");
    assert!(html.contains("Fail"), "missing verdict in {html}");
    assert!(html.contains("Correct answers: 1"), "missing correct count in {html}");
    assert!(html.contains("Score: 50.00"), "missing score in {html}");
    assert!(html.contains("Time taken: 12.35 seconds"), "missing duration in {html}");
    assert!(html.contains("Restart"), "missing restart in {html}");
}
