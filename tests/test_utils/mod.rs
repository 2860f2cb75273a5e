//! Test utilities for integration tests
use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};

use charla::api::AppState;
use charla::api::app;
use charla::core::AppConfig;

/// Creates a test application router pointed at the given provider
/// hostname (usually a mockito server).
pub fn test_app(provider_hostname: &str) -> Router {
    let app_config = AppConfig {
        storage_path: String::from("./"),
        relay_api_url: String::from("http://127.0.0.1:3001"),
        allowed_origins: None,
        openrouter_api_hostname: provider_hostname.to_string(),
        openrouter_api_key: String::from("test-api-key"),
        openrouter_model: String::from("openai/gpt-3.5-turbo"),
    };
    let app_state = AppState::new(app_config);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
