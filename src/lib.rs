//! taskbrief: twice-daily Notion task digest delivered to Slack.
//!
//! One digest run queries the task database twice (tasks due today and
//! still open; tasks edited today into an active status), formats the
//! message for the current period (morning or evening), posts it to a
//! Slack incoming webhook, and records a `(date, period)` marker so the
//! same period is never sent twice.
//!
//! # Architecture
//!
//! Leaf-first:
//! - **notion**: filtered queries against the database query endpoint
//! - **format**: Slack mrkdwn rendering with per-task deep links
//! - **slack**: webhook delivery
//! - **state**: the persisted send marker
//! - **run**: the orchestrator tying the above together behind a
//!   [`run::RunLock`]
//!
//! Two entry points share the library: a ticking daemon (`taskbrief`)
//! and an HTTP-triggered hook service (`taskbrief-hook`, see [`server`]).

pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod notion;
pub mod run;
pub mod server;
pub mod slack;
pub mod state;

pub use clock::Period;
pub use config::Config;
pub use error::{BriefError, Result};
pub use run::{DigestRunner, RunLock, RunOutcome};
pub use state::SendRecord;
