use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use ragchat_core::{ChatApi, ChatResponse, Config, RequestError};
use crate::app::App;

/// Canned transport that records every query it receives
#[derive(Clone)]
pub struct StubApi {
    reply: Result<ChatResponse, RequestError>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StubApi {
    pub fn answering(answer: &str) -> Self {
        Self {
            reply: Ok(ChatResponse {
                answer: answer.to_string(),
            }),
            queries: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(RequestError::new("server responded with status 500")),
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<String> {
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

pub fn app_with(api: StubApi) -> App {
    App::new(&Config::new(), Arc::new(api), "http://test.invalid/api/chat".to_string())
}
