//! Send orchestration
//!
//! Sequences the presentation and transport calls for one question:
//! read input, show the user bubble and the loading placeholder, lock the
//! controls, wait for the backend, then swap the placeholder for the answer
//! (or the fixed error message) and unlock the controls.

use crate::api::{ChatApi, ChatResponse};
use crate::error::RequestError;
use crate::state::Sender;
use crate::ui::{ChatUi, Trigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Idle,
    Sending,
}

pub struct ChatController {
    state: ChatState,
    error_message: String,
}

impl ChatController {
    pub fn new(error_message: impl Into<String>) -> Self {
        Self {
            state: ChatState::Idle,
            error_message: error_message.into(),
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Start a submit cycle.
    ///
    /// Returns the question to send when the controller moved to `Sending`,
    /// `None` when the trigger had no effect.
    pub fn begin_send(&mut self, ui: &mut ChatUi, trigger: Trigger) -> Option<String> {
        if self.state == ChatState::Sending {
            tracing::debug!(?trigger, "submit ignored while a request is in flight");
            return None;
        }
        if !ui.accepts(trigger) {
            return None;
        }

        let question = ui.get_input();
        if question.is_empty() {
            return None;
        }

        ui.append_message(&question, Sender::User, false);
        ui.append_message("", Sender::Bot, true);
        ui.toggle_input(true);
        self.state = ChatState::Sending;

        tracing::info!(?trigger, chars = question.chars().count(), "question submitted");
        Some(question)
    }

    /// Close the submit cycle with the transport outcome.
    ///
    /// Always re-enables the input exactly once, whatever the outcome.
    pub fn finish_send(&mut self, ui: &mut ChatUi, outcome: Result<ChatResponse, RequestError>) {
        if self.state != ChatState::Sending {
            tracing::warn!("transport result arrived with no request in flight");
            return;
        }

        ui.remove_loading();
        match outcome {
            Ok(response) => {
                tracing::info!(chars = response.answer.chars().count(), "answer received");
                ui.append_message(&response.answer, Sender::Bot, false);
            }
            Err(err) => {
                tracing::error!(error = %err, "showing error message instead of an answer");
                ui.append_message(&self.error_message, Sender::Bot, false);
            }
        }

        self.state = ChatState::Idle;
        ui.toggle_input(false);
    }

    /// Run a full submit cycle, awaiting the transport in place.
    ///
    /// Returns whether a request was sent.
    pub async fn handle_send(&mut self, ui: &mut ChatUi, api: &dyn ChatApi, trigger: Trigger) -> bool {
        let Some(question) = self.begin_send(ui, trigger) else {
            return false;
        };

        let outcome = api.send_message(&question).await;
        self.finish_send(ui, outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Bubble;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    const ERROR_MESSAGE: &str = "오류가 발생했습니다.";

    struct StubApi {
        reply: Result<ChatResponse, RequestError>,
        queries: Mutex<Vec<String>>,
    }

    impl StubApi {
        fn answering(answer: &str) -> Self {
            Self {
                reply: Ok(ChatResponse {
                    answer: answer.to_string(),
                }),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(RequestError::new("server responded with status 500")),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatApi for StubApi {
        async fn send_message(&self, query: &str) -> Result<ChatResponse, RequestError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.reply.clone()
        }
    }

    fn typed(text: &str) -> ChatUi {
        let mut ui = ChatUi::complete();
        ui.input_mut().unwrap().set_value(text);
        ui
    }

    fn conversation(ui: &ChatUi) -> Vec<(Sender, Option<String>)> {
        ui.chat_box()
            .unwrap()
            .bubbles()
            .iter()
            .map(|b| (b.sender, b.text()))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input_is_noop() {
        let api = StubApi::answering("unused");
        let mut controller = ChatController::new(ERROR_MESSAGE);

        for input in ["", "   ", "\t\n"] {
            let mut ui = typed(input);
            let sent = controller.handle_send(&mut ui, &api, Trigger::Enter).await;

            assert!(!sent);
            assert!(ui.chat_box().unwrap().is_empty());
            assert!(!ui.input_disabled());
        }
        assert_eq!(controller.state(), ChatState::Idle);
        assert!(api.queries().is_empty());
    }

    #[tokio::test]
    async fn test_happy_path() {
        let api = StubApi::answering("X is Y");
        let mut controller = ChatController::new(ERROR_MESSAGE);
        let mut ui = typed("What is X?");

        let sent = controller.handle_send(&mut ui, &api, Trigger::Click).await;

        assert!(sent);
        assert_eq!(api.queries(), vec!["What is X?".to_string()]);
        assert_eq!(
            conversation(&ui),
            vec![
                (Sender::User, Some("What is X?".to_string())),
                (Sender::Bot, Some("X is Y".to_string())),
            ]
        );
        assert!(!ui.has_loading());
        assert!(!ui.input_disabled());
        assert!(!ui.send_button().unwrap().is_disabled());
        assert_eq!(controller.state(), ChatState::Idle);
    }

    #[test]
    fn test_loading_bubble_shows_while_sending() {
        let mut controller = ChatController::new(ERROR_MESSAGE);
        let mut ui = typed("What is X?");

        let question = controller.begin_send(&mut ui, Trigger::Enter);

        assert_eq!(question.as_deref(), Some("What is X?"));
        assert_eq!(controller.state(), ChatState::Sending);
        assert!(ui.input_disabled());
        assert!(ui.send_button().unwrap().is_disabled());

        let bubbles = ui.chat_box().unwrap().bubbles();
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0].sender, Sender::User);
        assert!(bubbles[1].is_loading());

        controller.finish_send(
            &mut ui,
            Ok(ChatResponse {
                answer: "X is Y".to_string(),
            }),
        );
        assert!(!ui.chat_box().unwrap().bubbles().iter().any(Bubble::is_loading));
    }

    #[tokio::test]
    async fn test_failure_path_shows_fixed_message() {
        let api = StubApi::failing();
        let mut controller = ChatController::new(ERROR_MESSAGE);
        let mut ui = typed("What is X?");

        let sent = controller.handle_send(&mut ui, &api, Trigger::Enter).await;

        assert!(sent);
        assert_eq!(
            conversation(&ui),
            vec![
                (Sender::User, Some("What is X?".to_string())),
                (Sender::Bot, Some(ERROR_MESSAGE.to_string())),
            ]
        );
        assert!(!ui.has_loading());
        assert!(!ui.input_disabled());
        assert_eq!(controller.state(), ChatState::Idle);
    }

    #[test]
    fn test_second_submit_while_sending_has_no_effect() {
        let mut controller = ChatController::new(ERROR_MESSAGE);
        let mut ui = typed("first");
        assert!(controller.begin_send(&mut ui, Trigger::Enter).is_some());

        // Disabled controls reject both triggers
        ui.input_mut().unwrap().set_value("second");
        assert_eq!(controller.begin_send(&mut ui, Trigger::Enter), None);
        assert_eq!(controller.begin_send(&mut ui, Trigger::Click), None);

        // Even if the controls get re-enabled behind our back
        ui.toggle_input(false);
        assert_eq!(controller.begin_send(&mut ui, Trigger::Click), None);

        assert_eq!(ui.chat_box().unwrap().bubbles().len(), 2);
        assert_eq!(ui.input().unwrap().value(), "second");
        assert_eq!(controller.state(), ChatState::Sending);
    }

    #[test]
    fn test_finish_without_request_is_ignored() {
        let mut controller = ChatController::new(ERROR_MESSAGE);
        let mut ui = ChatUi::complete();

        controller.finish_send(&mut ui, Err(RequestError::new("late")));

        assert!(ui.chat_box().unwrap().is_empty());
        assert_eq!(controller.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_multiline_answer_keeps_line_breaks() {
        let api = StubApi::answering("line one\nline two");
        let mut controller = ChatController::new(ERROR_MESSAGE);
        let mut ui = typed("q");

        controller.handle_send(&mut ui, &api, Trigger::Enter).await;

        let last = ui.chat_box().unwrap().bubbles().last().unwrap().clone();
        assert_eq!(last.text().as_deref(), Some("line one\nline two"));
    }

    #[tokio::test]
    async fn test_input_is_trimmed_before_sending() {
        let api = StubApi::answering("ok");
        let mut controller = ChatController::new(ERROR_MESSAGE);
        let mut ui = typed("  padded question  ");

        controller.handle_send(&mut ui, &api, Trigger::Enter).await;

        assert_eq!(api.queries(), vec!["padded question".to_string()]);
        assert_eq!(ui.input().unwrap().value(), "");
    }
}
