//! Long-lived digest daemon.
//!
//! Ticks once a minute and attempts a guarded digest run each tick. A
//! failed delivery is logged and retried on a later tick; the send-state
//! marker keeps each (date, period) to a single delivery.

use std::time::Duration;
use taskbrief::{Config, DigestRunner, RunLock, RunOutcome};

/// Seconds between run attempts.
const TICK_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::info!(
        "taskbrief starting (evening hour {}, UTC{:+})",
        config.evening_hour,
        config.utc_offset_hours
    );

    let runner = DigestRunner::new(config).map_err(|e| anyhow::anyhow!("{e}"))?;
    let lock = RunLock::new();

    let mut interval = tokio::time::interval(Duration::from_secs(TICK_INTERVAL_SECS));
    loop {
        interval.tick().await;
        match runner.run_now(&lock).await {
            Ok(RunOutcome::Sent(period)) => tracing::info!("digest sent ({period})"),
            Ok(RunOutcome::AlreadySent(period)) => {
                tracing::debug!("digest already sent ({period})");
            }
            Ok(RunOutcome::Busy) => tracing::debug!("previous run still in progress"),
            Err(e) => tracing::error!("digest run failed, will retry: {e}"),
        }
    }
}
