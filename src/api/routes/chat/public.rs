//! Public types for the relay chat API
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}
