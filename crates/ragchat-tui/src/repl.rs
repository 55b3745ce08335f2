//! Line-oriented front end: one question per line on stdin.

use std::io::{self, Write};
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use ragchat_core::ui::Bubble;
use ragchat_core::{ChatApi, ChatBox, ChatController, ChatUi, Config, InputField, Trigger};

const PROMPT: &str = "질문> ";
const ANSWER_BANNER: &str = "=== 답변 ===";

/// Words that end the loop
fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Surface without a send button; questions only arrive as Enter on the input.
pub fn line_surface(config: &Config) -> ChatUi {
    ChatUi::new(Some(ChatBox::new()), Some(InputField::new()), None)
        .with_render_mode(config.render_mode())
}

/// Push one question through the controller and return the bot's reply text.
///
/// Bubbles are only needed until the reply is read, so the box is cleared
/// afterwards and a long session does not accumulate them.
pub async fn ask(
    ui: &mut ChatUi,
    controller: &mut ChatController,
    api: &dyn ChatApi,
    question: &str,
) -> Option<String> {
    ui.input_mut()?.set_value(question);

    if !controller.handle_send(ui, api, Trigger::Enter).await {
        return None;
    }

    let reply = ui
        .chat_box()
        .and_then(|chat_box| chat_box.bubbles().last())
        .and_then(Bubble::text);
    ui.clear_messages();
    reply
}

pub async fn run(config: &Config, api: &dyn ChatApi) -> Result<()> {
    let mut ui = line_surface(config);
    let mut controller = ChatController::new(config.error_message());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("RAG chat. 종료하려면 'exit' 입력.");
    loop {
        print!("\n{PROMPT}");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if is_exit(&line) {
            break;
        }

        if let Some(answer) = ask(&mut ui, &mut controller, api, &line).await {
            println!("\n{ANSWER_BANNER}");
            println!("{answer}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubApi;
    use pretty_assertions::assert_eq;
    use ragchat_core::ChatState;

    #[test]
    fn test_is_exit() {
        assert!(is_exit("exit"));
        assert!(is_exit("  QUIT "));
        assert!(!is_exit("exit now"));
        assert!(!is_exit(""));
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let api = StubApi::answering("X is Y");
        let config = Config::new();
        let mut ui = line_surface(&config);
        let mut controller = ChatController::new(config.error_message());

        let answer = ask(&mut ui, &mut controller, &api, " What is X? ").await;

        assert_eq!(answer.as_deref(), Some("X is Y"));
        assert_eq!(api.queries(), vec!["What is X?".to_string()]);
        assert_eq!(controller.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_ask_failure_returns_error_message() {
        let api = StubApi::failing();
        let config = Config {
            error_message: Some("Something went wrong.".to_string()),
            ..Config::new()
        };
        let mut ui = line_surface(&config);
        let mut controller = ChatController::new(config.error_message());

        let answer = ask(&mut ui, &mut controller, &api, "q").await;

        assert_eq!(answer.as_deref(), Some("Something went wrong."));
        assert!(!ui.has_loading());
    }

    #[tokio::test]
    async fn test_repeated_asks_do_not_accumulate_bubbles() {
        let api = StubApi::answering("same answer");
        let config = Config::new();
        let mut ui = line_surface(&config);
        let mut controller = ChatController::new(config.error_message());

        ask(&mut ui, &mut controller, &api, "first").await;
        let second = ask(&mut ui, &mut controller, &api, "second").await;

        assert_eq!(second.as_deref(), Some("same answer"));
        assert!(ui.chat_box().unwrap().is_empty());
        assert_eq!(api.queries(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_ask_blank_line_sends_nothing() {
        let api = StubApi::answering("unused");
        let config = Config::new();
        let mut ui = line_surface(&config);
        let mut controller = ChatController::new(config.error_message());

        assert_eq!(ask(&mut ui, &mut controller, &api, "   ").await, None);
        assert!(api.queries().is_empty());
    }
}
