//! HTTP client for the relay API.

use std::time::Duration;

use anyhow::{Error, Result, bail};
use serde_json::json;

use crate::api::public::chat::ChatReply;
use crate::session::Message;

pub struct RelayClient {
    api_url: String,
    client: reqwest::Client,
}

impl RelayClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Send a full conversation and return the normalized reply. The
    /// relay holds no memory between calls so the entire history
    /// travels every time.
    pub async fn send(&self, messages: &[Message]) -> Result<String, Error> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.api_url))
            .timeout(Duration::from_secs(90))
            .json(&json!({ "messages": messages }))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("relay returned status {}", response.status());
        }

        let reply: ChatReply = response.json().await?;
        Ok(reply.reply)
    }
}
