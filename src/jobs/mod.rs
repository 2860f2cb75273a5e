//! Background jobs that run on a fixed schedule.

use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::core::AppConfig;

mod keep_alive;
pub use keep_alive::KeepAlivePing;

#[async_trait]
pub trait PeriodicJob {
    /// How often the job runs.
    fn interval(&self) -> Duration;

    /// One run of the job. Failures are logged and never bubble up.
    async fn run_job(&self, config: &AppConfig);
}

/// Spawn a job in its own tokio task, running once immediately and
/// then on every interval tick until the handle is aborted.
pub fn spawn_periodic_job<J>(config: AppConfig, job: J) -> JoinHandle<()>
where
    J: PeriodicJob + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(job.interval());
        loop {
            interval.tick().await;
            job.run_job(&config).await;
        }
    })
}
