//! UI-agnostic message types
//!
//! A message only lives as long as it takes to turn it into a bubble in the
//! conversation box; nothing here is persisted.

use serde::{Deserialize, Serialize};

/// Who a message bubble belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Label drawn in place of the profile icon
    pub fn icon(&self) -> &'static str {
        match self {
            Sender::User => "👤 You",
            Sender::Bot => "💬 Bot",
        }
    }
}

/// A chat message about to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub is_loading: bool,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            is_loading: false,
        }
    }

    pub fn loading(sender: Sender) -> Self {
        Self {
            text: String::new(),
            sender,
            is_loading: true,
        }
    }
}
