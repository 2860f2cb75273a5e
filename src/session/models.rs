use chrono::Local;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// A single entry in a conversation. Immutable once created; the
/// timestamp captures local wall-clock time at construction.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
            timestamp: Local::now().format("%H:%M").to_string(),
        }
    }
}

/// Index entry for one session.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SessionMeta {
    pub id: String,
    pub display_label: String,
}

/// One named conversation thread with its ordered, append-only
/// message log.
#[derive(Clone, Debug)]
pub struct Session {
    pub meta: SessionMeta,
    pub messages: Vec<Message>,
}
