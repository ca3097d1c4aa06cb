//! Task model: the nodes of the dependency graph.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ValidationError;
use super::ids::{OwnerId, PriorityId, TaskId};

/// Longest accepted title, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// Caller-managed status. The graph stores it but does not constrain
/// transitions (a task may be `completed` while a prerequisite is `open`).
///
/// Parsed through [`FromStr`], so an unrecognised value surfaces as
/// [`ValidationError::UnknownStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TaskStatus::Open),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "blocked" => Ok(TaskStatus::Blocked),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A stored task.
///
/// Relations are ids, not references: the owner record lives outside the
/// core, the priority lives in the catalog, and edges live in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: OwnerId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority_id: PriorityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a task from validated fields.
    pub fn create(id: TaskId, owner_id: OwnerId, fields: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority_id: fields.priority_id,
            due_at: fields.due_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated patch in place.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority_id) = patch.priority_id {
            self.priority_id = priority_id;
        }
        if let Some(due_at) = patch.due_at {
            self.due_at = due_at;
        }
        self.updated_at = now;
    }
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    pub priority_id: PriorityId,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, priority_id: PriorityId) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::Open,
            priority_id,
            due_at: None,
        }
    }

    pub fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }
}

/// Partial update. `None` leaves a field untouched; the nested options on
/// `description` and `due_at` allow clearing (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<PriorityId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub due_at: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// Query filter for listing an owner's tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority_id: Option<PriorityId>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| s == task.status)
            && self.priority_id.is_none_or(|p| p == task.priority_id)
    }
}

/// Result of an update: the task before and after the patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskChange {
    pub before: Task,
    pub after: Task,
}

impl TaskChange {
    /// Did the update touch an input of the score (priority or due date)?
    pub fn signals_changed(&self) -> bool {
        self.before.priority_id != self.after.priority_id || self.before.due_at != self.after.due_at
    }
}

/// Present-but-null becomes `Some(None)`; an absent field stays `None` via
/// `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong {
            len,
            max: MAX_TITLE_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    fn sample() -> Task {
        Task::create(
            TaskId::new(1),
            OwnerId::new(1),
            NewTask::new("write report", PriorityId::new(1)),
            at(9),
        )
    }

    #[rstest]
    #[case::open("open", TaskStatus::Open)]
    #[case::in_progress("in_progress", TaskStatus::InProgress)]
    #[case::completed("completed", TaskStatus::Completed)]
    #[case::blocked("blocked", TaskStatus::Blocked)]
    fn status_parses_and_displays(#[case] raw: &str, #[case] status: TaskStatus) {
        assert_eq!(raw.parse::<TaskStatus>().unwrap(), status);
        assert_eq!(status.to_string(), raw);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "done".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownStatus("done".into()));
    }

    #[test]
    fn unknown_status_in_a_patch_is_a_validation_error() {
        let err = serde_json::from_str::<TaskPatch>(r#"{"status": "done"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown task status 'done'"), "{err}");

        let patch: TaskPatch = serde_json::from_str(r#"{"status": "blocked"}"#).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::Blocked));
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn blank_titles_are_rejected(#[case] title: &str) {
        let fields = NewTask::new(title, PriorityId::new(1));
        assert_eq!(fields.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn long_titles_are_rejected() {
        let fields = NewTask::new("x".repeat(101), PriorityId::new(1));
        assert_eq!(
            fields.validate(),
            Err(ValidationError::TitleTooLong { len: 101, max: 100 })
        );
        assert!(NewTask::new("x".repeat(100), PriorityId::new(1)).validate().is_ok());
    }

    #[test]
    fn apply_patch_updates_only_given_fields() {
        let mut task = sample();
        task.description = Some("draft".into());

        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            description: Some(None),
            ..TaskPatch::default()
        };
        task.apply(patch, at(10));

        assert_eq!(task.title, "write report");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.description, None);
        assert_eq!(task.created_at, at(9));
        assert_eq!(task.updated_at, at(10));
    }

    #[test]
    fn signals_changed_tracks_priority_and_due_date() {
        let before = sample();

        let mut retitled = before.clone();
        retitled.title = "other".into();
        let change = TaskChange {
            before: before.clone(),
            after: retitled,
        };
        assert!(!change.signals_changed());

        let mut due = before.clone();
        due.due_at = Some(at(18));
        let change = TaskChange { before, after: due };
        assert!(change.signals_changed());
    }

    #[test]
    fn filter_matches_on_status_and_priority() {
        let task = sample();
        assert!(TaskFilter::default().matches(&task));
        assert!(
            TaskFilter {
                status: Some(TaskStatus::Open),
                priority_id: Some(PriorityId::new(1)),
            }
            .matches(&task)
        );
        assert!(
            !TaskFilter {
                status: Some(TaskStatus::Blocked),
                priority_id: None,
            }
            .matches(&task)
        );
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: TaskPatch = serde_json::from_str(r#"{"due_at": null}"#).unwrap();
        assert_eq!(patch.due_at, Some(None));
        assert_eq!(patch.description, None);
    }
}
