use std::sync::Arc;
use ratatui::layout::Rect;
use tokio::task::{JoinError, JoinHandle};
use ragchat_core::{ChatApi, ChatController, ChatResponse, ChatUi, Config, RequestError, Trigger};

pub type PendingReply = JoinHandle<Result<ChatResponse, RequestError>>;

pub struct App {
    pub should_quit: bool,

    // Chat surface and the controller driving it
    pub ui: ChatUi,
    pub controller: ChatController,

    // Transport
    pub api: Arc<dyn ChatApi>,
    pub endpoint: String,
    pub pending: Option<PendingReply>,

    pub animation_frame: u8, // 0-2 for loading dots

    // Areas from the last draw, for mouse hit-testing
    pub chat_area: Option<Rect>,
    pub send_button_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config, api: Arc<dyn ChatApi>, endpoint: String) -> Self {
        Self {
            should_quit: false,
            ui: ChatUi::complete().with_render_mode(config.render_mode()),
            controller: ChatController::new(config.error_message()),
            api,
            endpoint,
            pending: None,
            animation_frame: 0,
            chat_area: None,
            send_button_area: None,
        }
    }

    /// Begin a submit cycle and hand the request to a background task.
    pub fn submit(&mut self, trigger: Trigger) {
        let Some(question) = self.controller.begin_send(&mut self.ui, trigger) else {
            return;
        };

        self.animation_frame = 0;
        let api = Arc::clone(&self.api);
        self.pending = Some(tokio::spawn(async move { api.send_message(&question).await }));
    }

    /// Apply the result of the background request.
    pub fn complete(&mut self, joined: Result<Result<ChatResponse, RequestError>, JoinError>) {
        self.pending = None;
        let outcome = joined.unwrap_or_else(|err| Err(RequestError::from(err)));
        self.controller.finish_send(&mut self.ui, outcome);
    }

    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.ui.has_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat(&mut self, delta: i32) {
        if let Some(chat_box) = self.ui.chat_box_mut() {
            chat_box.scroll_by(delta);
        }
    }

    pub fn page_size(&self) -> i32 {
        self.ui.chat_box().map(|b| b.page_size()).unwrap_or(1)
    }
}
