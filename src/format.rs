//! Digest message rendering.
//!
//! Turns a query outcome into the Slack mrkdwn message body: a title
//! line followed by one bullet per task, each deep-linking back to the
//! source page.

use crate::notion::{QueryOutcome, Task};

/// Title line for the morning digest.
pub const MORNING_TITLE: &str = "🌅 Today's tasks";
/// Title line for the evening digest.
pub const EVENING_TITLE: &str = "🌆 Today's progress";

/// Second line rendered when a successful query matched nothing.
pub const NO_TASKS_LINE: &str = "No tasks found.";

/// Placeholder for tasks without a title.
const UNTITLED: &str = "(untitled)";
/// Placeholder for tasks without a status.
const NO_STATUS: &str = "(no status)";

/// Render the digest body for one query outcome.
///
/// A failed query is rendered explicitly instead of masquerading as an
/// empty task list.
pub fn format_digest(outcome: &QueryOutcome, title: &str) -> String {
    match outcome {
        QueryOutcome::Failed(reason) => {
            format!("{title}\n⚠ Task list could not be fetched: {reason}")
        }
        QueryOutcome::Tasks(tasks) if tasks.is_empty() => format!("{title}\n{NO_TASKS_LINE}"),
        QueryOutcome::Tasks(tasks) => {
            let mut lines = Vec::with_capacity(tasks.len() + 1);
            lines.push(title.to_owned());
            lines.extend(tasks.iter().map(bullet));
            lines.join("\n")
        }
    }
}

/// One `• *<url|name>* – status` bullet line.
fn bullet(task: &Task) -> String {
    let name = task.name.as_deref().unwrap_or(UNTITLED);
    let status = task.status.as_deref().unwrap_or(NO_STATUS);
    format!("• *<{}|{}>* – {}", task_url(&task.id), name, status)
}

/// Canonical deep link for a page identifier.
///
/// Notion page URLs use the identifier without separator dashes.
pub fn task_url(id: &str) -> String {
    format!("https://www.notion.so/{}", id.replace('-', ""))
}
