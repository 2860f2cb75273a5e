use std::time::Duration;

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Substituted when the provider returns no usable reply text.
pub const NO_REPLY_TEXT: &str = "Sin respuesta";

/// The provider's expected message shape.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct OutboundMessage {
    pub role: String,
    pub content: String,
}

/// Request a single chat completion from an OpenRouter compatible
/// API. One request per call, no retries.
pub async fn completion(
    messages: &[OutboundMessage],
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<Value, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
    });
    let url = format!(
        "{}/api/v1/chat/completions",
        api_hostname.trim_end_matches('/')
    );
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

/// Pull the first candidate's reply text out of a completion
/// response, falling back to a fixed placeholder when it's absent.
pub fn extract_reply(resp: &Value) -> String {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or(NO_REPLY_TEXT)
        .to_string()
}
