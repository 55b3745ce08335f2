pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod state;
pub mod ui;

// Re-export main types for convenience
pub use api::{ChatApi, ChatClient, ChatRequest, ChatResponse};
pub use chat::{ChatController, ChatState};
pub use config::{Config, RenderMode};
pub use error::RequestError;
pub use state::{Message, Sender};
pub use ui::{ChatBox, ChatUi, InputField, SendButton, Trigger};
