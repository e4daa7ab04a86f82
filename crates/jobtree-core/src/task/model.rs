//! Task domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a task record.
pub type TaskId = String;

/// Sortable order key of a task among its siblings.
///
/// Keys are sparse: siblings are normally spaced a configurable gap apart so a
/// new key can be placed between two neighbours without touching either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(i64);

impl Position {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for Position {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Someone is working on it.
    InProgress,
    /// Done.
    Completed,
    /// Dropped without completion.
    Cancelled,
}

/// A unit of work inside a job.
///
/// Tasks form a tree through `parent_id`; siblings are ordered by `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: TaskId,
    /// Job this task belongs to
    pub job_id: String,
    /// Task title
    pub title: String,
    /// Parent task, `None` for a root task
    pub parent_id: Option<TaskId>,
    /// Order key among siblings sharing `parent_id`
    pub position: Position,
    /// Current status
    pub status: TaskStatus,
    /// Concurrency token, bumped by the store on every write
    pub lock_version: u64,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

impl Task {
    /// Creates a pending task with empty timestamps and `lock_version` 0.
    pub fn new(
        id: impl Into<TaskId>,
        job_id: impl Into<String>,
        title: impl Into<String>,
        parent_id: Option<TaskId>,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            title: title.into(),
            parent_id,
            position,
            status: TaskStatus::Pending,
            lock_version: 0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
