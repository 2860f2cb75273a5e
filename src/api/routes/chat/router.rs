//! Router for the relay chat API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, routing::post};
use serde_json::Value;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::AppConfig;
use crate::openrouter::{OutboundMessage, completion, extract_reply};

type SharedState = Arc<RwLock<AppState>>;

const EMPTY_REQUEST_TEXT: &str = "No se recibió ningún mensaje para procesar.";

/// Forward a full conversation to the completion provider and return
/// the normalized reply. The relay holds no state between calls.
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<Value>,
) -> Result<axum::Json<public::ChatReply>, ApiError> {
    // The body is validated by hand so that a missing, non-array or
    // empty `messages` all get the same 400 instead of an extractor
    // rejection
    let messages = payload
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Validation(EMPTY_REQUEST_TEXT.to_string()))?;

    if messages.is_empty() {
        return Err(ApiError::Validation(EMPTY_REQUEST_TEXT.to_string()));
    }

    let outbound = messages
        .iter()
        .map(|msg| OutboundMessage {
            role: msg["role"].as_str().unwrap_or_default().to_string(),
            content: msg["content"].as_str().unwrap_or_default().to_string(),
        })
        .collect::<Vec<OutboundMessage>>();

    let (api_hostname, api_key, model) = {
        let shared_state = state.read().expect("Unable to read shared state");
        let AppConfig {
            openrouter_api_hostname,
            openrouter_api_key,
            openrouter_model,
            ..
        } = &shared_state.config;
        (
            openrouter_api_hostname.clone(),
            openrouter_api_key.clone(),
            openrouter_model.clone(),
        )
    };

    let resp = completion(&outbound, &api_hostname, &api_key, &model)
        .await
        .map_err(ApiError::Upstream)?;

    Ok(axum::Json(public::ChatReply {
        reply: extract_reply(&resp),
    }))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
