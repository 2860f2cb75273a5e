use std::time::Duration;

use async_trait::async_trait;

use super::PeriodicJob;
use crate::core::AppConfig;

/// Pings the relay's liveness endpoint so an idle deployment doesn't
/// cold start on the next real message. Failures are logged and
/// otherwise ignored.
#[derive(Debug)]
pub struct KeepAlivePing;

#[async_trait]
impl PeriodicJob for KeepAlivePing {
    fn interval(&self) -> Duration {
        // Every 10 minutes
        Duration::from_secs(60 * 10)
    }

    async fn run_job(&self, config: &AppConfig) {
        let url = format!("{}/ping", config.relay_api_url.trim_end_matches('/'));
        match reqwest::get(&url).await {
            Ok(resp) => {
                tracing::debug!("Keep-alive ping: {}", resp.status());
            }
            Err(e) => {
                tracing::warn!("Keep-alive ping failed: {}", e);
            }
        }
    }
}
