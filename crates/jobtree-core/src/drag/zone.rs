use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// Which side of the hovered row a reorder drop lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    Before,
    After,
}

/// One instantaneous drag position reported by the gesture layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DropZone {
    /// Become a sibling of `target_id`, on the `boundary` side.
    Reorder { target_id: TaskId, boundary: Boundary },
    /// Become the last child of `target_id`.
    Nest { target_id: TaskId },
}

impl DropZone {
    pub fn reorder(target_id: impl Into<TaskId>, boundary: Boundary) -> Self {
        Self::Reorder {
            target_id: target_id.into(),
            boundary,
        }
    }

    pub fn nest(target_id: impl Into<TaskId>) -> Self {
        Self::Nest {
            target_id: target_id.into(),
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            DropZone::Reorder { target_id, .. } | DropZone::Nest { target_id } => target_id,
        }
    }
}
