//! Keyboard indent and outdent, expressed as relative moves.

use crate::error::{JobtreeError, Result};
use crate::hierarchy::HierarchyIndex;
use crate::moves::{Anchor, RelativeMove};

/// Nests `task_id` as the last child of its preceding sibling.
///
/// Returns `None` for the first task in its list, which has nothing to
/// nest under.
pub fn indent_move(index: &HierarchyIndex, task_id: &str) -> Result<Option<RelativeMove>> {
    if !index.contains(task_id) {
        return Err(JobtreeError::not_found("task", task_id));
    }
    let siblings = index.children_of(index.parent_of(task_id));
    let Some(at) = siblings.iter().position(|id| id == task_id) else {
        return Ok(None);
    };
    Ok(at
        .checked_sub(1)
        .map(|prev| RelativeMove::new(task_id, Some(siblings[prev].clone()), Anchor::Last)))
}

/// Lifts `task_id` out of its parent, directly after that parent.
///
/// Returns `None` for a root task.
pub fn outdent_move(index: &HierarchyIndex, task_id: &str) -> Result<Option<RelativeMove>> {
    if !index.contains(task_id) {
        return Err(JobtreeError::not_found("task", task_id));
    }
    Ok(index.parent_of(task_id).map(|parent_id| {
        RelativeMove::new(
            task_id,
            index.parent_of(parent_id).map(str::to_string),
            Anchor::After(parent_id.to_string()),
        )
    }))
}
