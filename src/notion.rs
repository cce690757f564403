//! Notion task database client.
//!
//! Issues filtered queries against `POST /v1/databases/{id}/query` and
//! parses page objects into [`Task`] records. Query failures are
//! fail-open: they never abort a run, but they surface as
//! [`QueryOutcome::Failed`] so the digest can say so instead of
//! rendering a misleading empty list.

use crate::clock::DayBounds;
use crate::config::Config;
use crate::error::{BriefError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Pinned Notion API version header value.
const NOTION_VERSION: &str = "2022-06-28";

/// Database property holding the primary task name.
const PROP_NAME: &str = "Name";
/// Fallback title property used by older databases.
const PROP_TITLE: &str = "Title";
/// Database property holding the task status.
const PROP_STATUS: &str = "Status";
/// Database property holding the due date.
const PROP_DUE: &str = "Due";

/// Status value marking a finished task.
const STATUS_DONE: &str = "Done";
/// Status value marking a task being worked on.
const STATUS_IN_PROGRESS: &str = "In progress";

/// A task record read from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Opaque page identifier.
    pub id: String,
    /// Task name, if the title property has content.
    pub name: Option<String>,
    /// Status name, if the status property is set.
    pub status: Option<String>,
    /// Due date, if set.
    pub due: Option<NaiveDate>,
    /// Last-edited timestamp.
    pub last_edited: Option<DateTime<FixedOffset>>,
}

impl Task {
    /// Parse a task from a Notion page object. Returns `None` when the
    /// page has no `id`.
    pub fn from_page(page: &Value) -> Option<Self> {
        let id = page.get("id")?.as_str()?.to_owned();
        let props = page.get("properties").cloned().unwrap_or(Value::Null);

        let name = title_text(&props, PROP_NAME).or_else(|| title_text(&props, PROP_TITLE));
        let status = status_name(&props);
        let due = props
            .get(PROP_DUE)
            .and_then(|p| p.get("date"))
            .and_then(|d| d.get("start"))
            .and_then(Value::as_str)
            .and_then(parse_date);
        let last_edited = page
            .get("last_edited_time")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok());

        Some(Self {
            id,
            name,
            status,
            due,
            last_edited,
        })
    }
}

fn title_text(props: &Value, key: &str) -> Option<String> {
    let text = props
        .get(key)?
        .get("title")?
        .as_array()?
        .first()?
        .get("plain_text")?
        .as_str()?
        .trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_owned())
}

/// Status databases expose `{"status": {"name": ...}}`; older select
/// columns expose `{"select": {"name": ...}}`. Accept either.
fn status_name(props: &Value) -> Option<String> {
    let prop = props.get(PROP_STATUS)?;
    prop.get("status")
        .or_else(|| prop.get("select"))
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Date properties may carry a bare date or a full datetime.
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// Declarative query predicate tree, serialised to the Notion filter
/// JSON shape. Constructed per call; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskFilter {
    /// Every branch must match.
    And(Vec<TaskFilter>),
    /// Any branch may match.
    Or(Vec<TaskFilter>),
    /// Status property equals a value.
    StatusEquals(String),
    /// Status property differs from a value.
    StatusNotEquals(String),
    /// Due date property equals a calendar date.
    DueOn(NaiveDate),
    /// Page was last edited at or after an instant.
    EditedOnOrAfter(DateTime<FixedOffset>),
    /// Page was last edited at or before an instant.
    EditedOnOrBefore(DateTime<FixedOffset>),
}

impl TaskFilter {
    /// Render the filter as Notion's wire JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::And(branches) => {
                json!({ "and": branches.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            Self::Or(branches) => {
                json!({ "or": branches.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            Self::StatusEquals(value) => {
                json!({ "property": PROP_STATUS, "status": { "equals": value } })
            }
            Self::StatusNotEquals(value) => {
                json!({ "property": PROP_STATUS, "status": { "does_not_equal": value } })
            }
            Self::DueOn(date) => {
                json!({ "property": PROP_DUE, "date": { "equals": date.format("%Y-%m-%d").to_string() } })
            }
            Self::EditedOnOrAfter(ts) => {
                json!({ "timestamp": "last_edited_time", "last_edited_time": { "on_or_after": ts.to_rfc3339() } })
            }
            Self::EditedOnOrBefore(ts) => {
                json!({ "timestamp": "last_edited_time", "last_edited_time": { "on_or_before": ts.to_rfc3339() } })
            }
        }
    }

    /// Tasks due on the given date that are not finished.
    pub fn due_today_open(today: NaiveDate) -> Self {
        Self::And(vec![
            Self::DueOn(today),
            Self::StatusNotEquals(STATUS_DONE.to_owned()),
        ])
    }

    /// Tasks edited within the day that moved to an active status.
    pub fn edited_today_active(bounds: &DayBounds) -> Self {
        Self::And(vec![
            Self::EditedOnOrAfter(bounds.start),
            Self::EditedOnOrBefore(bounds.end),
            Self::Or(vec![
                Self::StatusEquals(STATUS_IN_PROGRESS.to_owned()),
                Self::StatusEquals(STATUS_DONE.to_owned()),
            ]),
        ])
    }
}

/// Result of a fail-open query: tasks on success, a reason on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The query succeeded; the list may be empty.
    Tasks(Vec<Task>),
    /// The query failed upstream or in transport.
    Failed(String),
}

/// Client for the database query endpoint.
pub struct QueryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    database_id: String,
}

impl QueryClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::Query`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BriefError::Query(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.notion_base_url.clone(),
            api_key: config.notion_api_key.clone(),
            database_id: config.notion_database_id.clone(),
        })
    }

    /// Run one filtered query.
    ///
    /// Never errors: non-success responses and transport failures are
    /// logged and folded into [`QueryOutcome::Failed`].
    pub async fn query(&self, filter: &TaskFilter) -> QueryOutcome {
        let url = format!("{}/v1/databases/{}/query", self.base_url, self.database_id);
        let body = json!({ "filter": filter.to_json() });

        let response = match self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("task query transport error: {e}");
                return QueryOutcome::Failed(format!("request failed: {e}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let payload = response.text().await.unwrap_or_default();
            warn!("task query returned {status}: {payload}");
            return QueryOutcome::Failed(format!("database returned {status}"));
        }

        let payload: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("task query returned unparsable body: {e}");
                return QueryOutcome::Failed(format!("invalid response body: {e}"));
            }
        };

        let tasks: Vec<Task> = payload
            .get("results")
            .and_then(Value::as_array)
            .map(|pages| pages.iter().filter_map(Task::from_page).collect())
            .unwrap_or_default();
        debug!("task query matched {} tasks", tasks.len());
        QueryOutcome::Tasks(tasks)
    }
}
