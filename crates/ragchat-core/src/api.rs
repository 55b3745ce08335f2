use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Path of the chat endpoint, relative to the backend base URL
pub const CHAT_PATH: &str = "/api/chat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

/// Backend reply. Only `answer` is read; anything else the server sends is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Something that can answer a chat query.
///
/// One attempt per call: no retry, no timeout, no cancellation.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, query: &str) -> Result<ChatResponse, RequestError>;
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CHAT_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_query(&self, query: &str) -> Result<ChatResponse, RequestError> {
        let request = ChatRequest {
            query: query.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RequestError::new(format!(
                "server responded with status {}",
                response.status()
            )));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }
}

#[async_trait]
impl ChatApi for ChatClient {
    async fn send_message(&self, query: &str) -> Result<ChatResponse, RequestError> {
        tracing::debug!(endpoint = %self.endpoint, chars = query.chars().count(), "sending chat query");

        match self.post_query(query).await {
            Ok(response) => Ok(response),
            Err(err) => {
                tracing::error!(endpoint = %self.endpoint, error = %err, "chat request failed");
                Err(err)
            }
        }
    }
}
