//! Move intents and the outbound position records they compile into.

use serde::{Deserialize, Serialize};

use crate::task::{Position, TaskId};

/// Where a moved task lands relative to its new siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "task_id", rename_all = "snake_case")]
pub enum Anchor {
    /// Before every remaining sibling.
    First,
    /// After every remaining sibling.
    Last,
    /// Directly after the given sibling.
    After(TaskId),
    /// Directly before the given sibling.
    Before(TaskId),
}

impl Anchor {
    /// The sibling this anchor points at, if any.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Anchor::After(id) | Anchor::Before(id) => Some(id),
            Anchor::First | Anchor::Last => None,
        }
    }
}

/// Intent to place `task_id` under `parent_id` at `anchor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeMove {
    pub task_id: TaskId,
    pub parent_id: Option<TaskId>,
    pub anchor: Anchor,
}

impl RelativeMove {
    pub fn new(task_id: impl Into<TaskId>, parent_id: Option<TaskId>, anchor: Anchor) -> Self {
        Self {
            task_id: task_id.into(),
            parent_id,
            anchor,
        }
    }
}

/// One record of an outbound batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: TaskId,
    pub position: Position,
    pub parent_id: Option<TaskId>,
    /// Sibling the task now directly follows; audit metadata only.
    pub repositioned_after_id: Option<TaskId>,
    /// Concurrency token of the snapshot the update was compiled against.
    pub lock_version: u64,
    /// Set on the last record of a batch.
    pub finalized: bool,
}

/// Everything one gesture writes, handed to the writer in a single call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBatch {
    pub job_id: String,
    pub updates: Vec<PositionUpdate>,
}

impl PositionBatch {
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}
