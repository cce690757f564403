//! Digest run orchestration.
//!
//! One run: acquire the run lock, check the send-state marker, issue the
//! two queries, format the digest for the current period, deliver it,
//! and record the send. Each run terminates as `Sent`, `AlreadySent`, or
//! `Busy`; delivery failures propagate without touching the marker so
//! the next run retries the same period.

use crate::clock::{self, Period, day_bounds};
use crate::config::Config;
use crate::error::Result;
use crate::format::{EVENING_TITLE, MORNING_TITLE, format_digest};
use crate::notion::{QueryClient, TaskFilter};
use crate::slack::Notifier;
use crate::state::{SendRecord, load_record, write_record};
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::{debug, info};

/// Duplicate-run guard shared by everything that may trigger a digest.
///
/// An explicit value rather than process-global state, so overlapping
/// runs can be exercised deterministically in tests. Cloning shares the
/// underlying lock.
#[derive(Clone, Default)]
pub struct RunLock {
    inner: Arc<tokio::sync::Mutex<()>>,
}

impl RunLock {
    /// Create a fresh, unheld lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock without waiting.
    pub fn try_acquire(&self) -> Option<tokio::sync::OwnedMutexGuard<()>> {
        Arc::clone(&self.inner).try_lock_owned().ok()
    }
}

/// Terminal outcome of one digest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A digest was delivered and the marker updated.
    Sent(Period),
    /// The marker already covers this date and period.
    AlreadySent(Period),
    /// Another run holds the lock; nothing was queried or sent.
    Busy,
}

/// Orchestrates the query → format → send → persist pipeline.
pub struct DigestRunner {
    client: QueryClient,
    notifier: Notifier,
    config: Config,
}

impl DigestRunner {
    /// Build a runner and its HTTP clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        let client = QueryClient::new(&config)?;
        let notifier = Notifier::new(&config)?;
        Ok(Self {
            client,
            notifier,
            config,
        })
    }

    /// Run one digest attempt at the current instant in the configured
    /// civil zone.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BriefError::Notify`] when delivery fails;
    /// the send-state marker is left untouched in that case.
    pub async fn run_now(&self, lock: &RunLock) -> Result<RunOutcome> {
        self.run_at(clock::now_with_offset(self.config.utc_offset_hours), lock)
            .await
    }

    /// Run one digest attempt for an explicit instant.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run_now`].
    pub async fn run_at(
        &self,
        now: DateTime<FixedOffset>,
        lock: &RunLock,
    ) -> Result<RunOutcome> {
        let Some(_guard) = lock.try_acquire() else {
            debug!("another digest run is in progress, skipping");
            return Ok(RunOutcome::Busy);
        };

        let bounds = day_bounds(now);
        let period = clock::period_of(now, self.config.evening_hour);
        let marker = SendRecord {
            date: bounds.date,
            period,
        };

        if load_record(&self.config.state_path) == Some(marker) {
            debug!("digest already sent for {} {period}", bounds.date);
            return Ok(RunOutcome::AlreadySent(period));
        }

        let due = self
            .client
            .query(&TaskFilter::due_today_open(bounds.date))
            .await;
        let edited = self
            .client
            .query(&TaskFilter::edited_today_active(&bounds))
            .await;

        let message = match period {
            Period::Morning => format_digest(&due, MORNING_TITLE),
            Period::Evening => format_digest(&edited, EVENING_TITLE),
        };

        self.notifier.send(&message).await?;
        write_record(&self.config.state_path, &marker);
        info!("digest sent for {} {period}", bounds.date);
        Ok(RunOutcome::Sent(period))
    }
}
