use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use quiz_core::time::fixed_now;
use services::{Clock, QuestionProvider, QuizLoopService};

use crate::context::{UiApp, build_app_context};
use crate::views::QuizView;

struct TestApp {
    quiz_loop: Arc<QuizLoopService>,
}

impl UiApp for TestApp {
    fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewHarnessRoot(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    rsx! { QuizView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive pending work until the rendered html contains `needle`, or give up.
    pub async fn drive_until(&mut self, needle: &str) -> String {
        for _ in 0..10 {
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_quiz_harness(provider: Arc<dyn QuestionProvider>) -> ViewHarness {
    let quiz_loop = Arc::new(QuizLoopService::new(Clock::fixed(fixed_now()), provider));
    let app = Arc::new(TestApp { quiz_loop });
    let dom = VirtualDom::new_with_props(ViewHarnessRoot, ViewHarnessProps { app });
    ViewHarness { dom }
}
