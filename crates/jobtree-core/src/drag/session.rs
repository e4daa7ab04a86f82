use std::collections::{BTreeSet, HashMap};

use super::zone::{Boundary, DropZone};
use crate::capability::{Capability, CapabilityProvider};
use crate::error::{JobtreeError, Result};
use crate::hierarchy::HierarchyIndex;
use crate::moves::{Anchor, RelativeMove};
use crate::task::TaskId;

/// Lifecycle of one drag gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    Completed,
    Cancelled,
}

/// Result of ending a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// No valid drop zone was ever hovered; nothing to write.
    Cancelled,
    /// One move per move root, in pre-drag visual order.
    Completed(Vec<RelativeMove>),
}

/// State of a single drag gesture.
///
/// Sessions are plain values owned by the caller, so independent hierarchies
/// (and tests) never share drag state.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    phase: DragPhase,
    dragged: BTreeSet<TaskId>,
    roots: Vec<TaskId>,
    last_valid: Option<DropZone>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn dragged_ids(&self) -> &BTreeSet<TaskId> {
        &self.dragged
    }

    /// Dragged tasks whose parent is not dragged, in pre-drag visual order.
    pub fn move_roots(&self) -> &[TaskId] {
        &self.roots
    }

    pub fn last_valid_zone(&self) -> Option<&DropZone> {
        self.last_valid.as_ref()
    }

    /// Starts a gesture over `dragged_ids`.
    ///
    /// Requires the `Edit` capability. Any session that is not mid-drag can
    /// be reused for a new gesture.
    pub fn before_start<I, S>(
        &mut self,
        dragged_ids: I,
        index: &HierarchyIndex,
        capabilities: &dyn CapabilityProvider,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        if self.phase == DragPhase::Dragging {
            return Err(JobtreeError::InvalidDragState(
                "a drag is already in progress".to_string(),
            ));
        }
        capabilities.require(Capability::Edit)?;

        let dragged: BTreeSet<TaskId> = dragged_ids.into_iter().map(Into::into).collect();
        if dragged.is_empty() {
            return Err(JobtreeError::InvalidDragState(
                "nothing selected to drag".to_string(),
            ));
        }
        if let Some(missing) = dragged.iter().find(|id| !index.contains(id)) {
            return Err(JobtreeError::not_found("task", missing.as_str()));
        }

        let rank: HashMap<&str, usize> = index
            .visit_order()
            .into_iter()
            .enumerate()
            .map(|(rank, id)| (id.as_str(), rank))
            .collect();
        let mut roots: Vec<TaskId> = dragged
            .iter()
            .filter(|id| !index.parent_of(id).is_some_and(|p| dragged.contains(p)))
            .cloned()
            .collect();
        roots.sort_by_key(|id| rank.get(id.as_str()).copied().unwrap_or(usize::MAX));

        tracing::debug!(
            "[DragSession] start: {} dragged, move roots {:?}",
            dragged.len(),
            roots
        );

        self.phase = DragPhase::Dragging;
        self.dragged = dragged;
        self.roots = roots;
        self.last_valid = None;
        Ok(())
    }

    /// Checks whether dropping the dragged set on `zone` keeps the tree valid.
    pub fn validate(&self, zone: &DropZone, index: &HierarchyIndex) -> Result<()> {
        let target_id = zone.target_id();
        if !index.contains(target_id) {
            return Err(JobtreeError::not_found("task", target_id));
        }
        match zone {
            DropZone::Nest { target_id } => self.check_parent(target_id, index),
            DropZone::Reorder { target_id, .. } => {
                if self.dragged.contains(target_id) {
                    return Err(JobtreeError::invalid_move(format!(
                        "cannot drop '{}' relative to itself",
                        target_id
                    )));
                }
                match index.parent_of(target_id) {
                    Some(parent_id) => self.check_parent(parent_id, index),
                    None => Ok(()),
                }
            }
        }
    }

    fn check_parent(&self, parent_id: &str, index: &HierarchyIndex) -> Result<()> {
        match self
            .dragged
            .iter()
            .find(|id| id.as_str() == parent_id || index.is_descendant_of(parent_id, id))
        {
            Some(dragged_id) => Err(JobtreeError::invalid_nesting(dragged_id.as_str(), parent_id)),
            None => Ok(()),
        }
    }

    /// Records `zone` as the drop target if it is valid.
    ///
    /// Returns `false` (and changes nothing) for invalid zones or when no
    /// gesture is in progress; the caller should not highlight the zone.
    pub fn move_to(&mut self, zone: DropZone, index: &HierarchyIndex) -> bool {
        if self.phase != DragPhase::Dragging {
            return false;
        }
        match self.validate(&zone, index) {
            Ok(()) => {
                self.last_valid = Some(zone);
                true
            }
            Err(e) => {
                tracing::debug!("[DragSession] rejected zone {:?}: {}", zone, e);
                false
            }
        }
    }

    /// Aborts the gesture.
    pub fn cancel(&mut self) {
        if self.phase == DragPhase::Dragging {
            self.phase = DragPhase::Cancelled;
        }
    }

    /// Ends the gesture and emits one move per move root.
    ///
    /// `final_zone` is validated like any hovered zone. Without any valid zone
    /// the gesture is cancelled. The recorded zone is re-validated against
    /// `index`, which should be the snapshot current at drop time.
    pub fn end(
        &mut self,
        final_zone: Option<DropZone>,
        index: &HierarchyIndex,
    ) -> Result<DragOutcome> {
        if self.phase != DragPhase::Dragging {
            return Err(JobtreeError::InvalidDragState(format!(
                "cannot end a drag in phase {:?}",
                self.phase
            )));
        }
        if let Some(zone) = final_zone {
            self.move_to(zone, index);
        }

        let Some(zone) = self.last_valid.clone() else {
            tracing::debug!("[DragSession] no valid drop zone, cancelling");
            self.phase = DragPhase::Cancelled;
            return Ok(DragOutcome::Cancelled);
        };
        if let Err(e) = self.validate(&zone, index) {
            tracing::warn!("[DragSession] drop zone no longer valid: {}", e);
            self.phase = DragPhase::Cancelled;
            return Err(e);
        }

        let moves = self.resolve(&zone, index);
        self.phase = DragPhase::Completed;
        Ok(DragOutcome::Completed(moves))
    }

    fn resolve(&self, zone: &DropZone, index: &HierarchyIndex) -> Vec<RelativeMove> {
        let (parent_id, first_anchor) = match zone {
            DropZone::Nest { target_id } => {
                let anchor = index
                    .children_of(Some(target_id.as_str()))
                    .iter()
                    .rev()
                    .find(|child| !self.dragged.contains(*child))
                    .map(|child| Anchor::After(child.clone()))
                    .unwrap_or(Anchor::First);
                (Some(target_id.clone()), anchor)
            }
            DropZone::Reorder {
                target_id,
                boundary,
            } => {
                let anchor = match boundary {
                    Boundary::Before => Anchor::Before(target_id.clone()),
                    Boundary::After => Anchor::After(target_id.clone()),
                };
                (index.parent_of(target_id).map(str::to_string), anchor)
            }
        };

        let mut anchor = first_anchor;
        let mut moves = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            moves.push(RelativeMove::new(root.clone(), parent_id.clone(), anchor));
            anchor = Anchor::After(root.clone());
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::StaticCapabilities;
    use crate::task::{Position, Task};

    fn task(id: &str, parent: Option<&str>, position: i64) -> Task {
        Task::new(id, "job-1", id, parent.map(str::to_string), Position::new(position))
    }

    /// a(1000) [a1, a2 [a2x]], b(2000), c(3000)
    fn index() -> HierarchyIndex {
        HierarchyIndex::build(vec![
            task("a", None, 1000),
            task("b", None, 2000),
            task("c", None, 3000),
            task("a1", Some("a"), 1000),
            task("a2", Some("a"), 2000),
            task("a2x", Some("a2"), 1000),
        ])
    }

    fn started(ids: &[&str], index: &HierarchyIndex) -> DragSession {
        let mut session = DragSession::new();
        session
            .before_start(ids.iter().copied(), index, &StaticCapabilities::allow_all())
            .unwrap();
        session
    }

    #[test]
    fn test_before_start_requires_edit() {
        let index = index();
        let mut session = DragSession::new();
        let err = session
            .before_start(["a"], &index, &StaticCapabilities::read_only())
            .unwrap_err();
        assert!(matches!(err, JobtreeError::NotPermitted { .. }));
        assert_eq!(session.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_before_start_rejects_unknown_and_empty() {
        let index = index();
        let mut session = DragSession::new();
        let caps = StaticCapabilities::allow_all();
        assert!(session.before_start(["ghost"], &index, &caps).unwrap_err().is_not_found());
        assert!(matches!(
            session.before_start(Vec::<String>::new(), &index, &caps),
            Err(JobtreeError::InvalidDragState(_))
        ));
    }

    #[test]
    fn test_cannot_start_twice() {
        let index = index();
        let mut session = started(&["a"], &index);
        let err = session
            .before_start(["b"], &index, &StaticCapabilities::allow_all())
            .unwrap_err();
        assert!(matches!(err, JobtreeError::InvalidDragState(_)));
    }

    #[test]
    fn test_move_roots_skip_children_of_dragged_and_follow_visual_order() {
        let index = index();
        let session = started(&["c", "a2x", "a", "a2"], &index);
        assert_eq!(session.move_roots(), ["a", "c"]);

        // Only the direct parent matters: a2x's parent a2 is not selected here.
        let session = started(&["a2x", "a"], &index);
        assert_eq!(session.move_roots(), ["a", "a2x"]);
    }

    #[test]
    fn test_nest_on_self_or_descendant_is_rejected() {
        let index = index();
        let mut session = started(&["a"], &index);
        assert!(!session.move_to(DropZone::nest("a"), &index));
        assert!(!session.move_to(DropZone::nest("a2x"), &index));
        assert!(session.last_valid_zone().is_none());
        assert!(matches!(
            session.validate(&DropZone::nest("a2"), &index),
            Err(JobtreeError::InvalidNesting { .. })
        ));
    }

    #[test]
    fn test_reorder_beside_own_descendant_is_rejected() {
        let index = index();
        let mut session = started(&["a"], &index);
        // a1's parent is the dragged task itself.
        assert!(!session.move_to(DropZone::reorder("a1", Boundary::After), &index));
        assert!(!session.move_to(DropZone::reorder("a", Boundary::After), &index));
        assert!(session.move_to(DropZone::reorder("b", Boundary::After), &index));
    }

    #[test]
    fn test_rejected_zone_keeps_previous_valid_zone() {
        let index = index();
        let mut session = started(&["b"], &index);
        assert!(session.move_to(DropZone::nest("a"), &index));
        assert!(!session.move_to(DropZone::nest("b"), &index));
        assert_eq!(session.last_valid_zone(), Some(&DropZone::nest("a")));
    }

    #[test]
    fn test_end_without_valid_zone_cancels() {
        let index = index();
        let mut session = started(&["a"], &index);
        assert!(!session.move_to(DropZone::nest("a1"), &index));
        assert_eq!(session.end(None, &index).unwrap(), DragOutcome::Cancelled);
        assert_eq!(session.phase(), DragPhase::Cancelled);
    }

    #[test]
    fn test_end_with_invalid_final_zone_uses_last_valid() {
        let index = index();
        let mut session = started(&["c"], &index);
        session.move_to(DropZone::reorder("a", Boundary::After), &index);
        let outcome = session.end(Some(DropZone::nest("c")), &index).unwrap();
        assert_eq!(
            outcome,
            DragOutcome::Completed(vec![RelativeMove::new("c", None, Anchor::After("a".into()))])
        );
        assert_eq!(session.phase(), DragPhase::Completed);
    }

    #[test]
    fn test_nest_anchors_after_last_remaining_child() {
        let index = index();
        let mut session = started(&["a2", "c"], &index);
        let outcome = session.end(Some(DropZone::nest("a")), &index).unwrap();
        assert_eq!(
            outcome,
            DragOutcome::Completed(vec![
                RelativeMove::new("a2", Some("a".into()), Anchor::After("a1".into())),
                RelativeMove::new("c", Some("a".into()), Anchor::After("a2".into())),
            ])
        );
    }

    #[test]
    fn test_nest_into_childless_target_anchors_first() {
        let index = index();
        let mut session = started(&["b"], &index);
        let outcome = session.end(Some(DropZone::nest("a1")), &index).unwrap();
        assert_eq!(
            outcome,
            DragOutcome::Completed(vec![RelativeMove::new("b", Some("a1".into()), Anchor::First)])
        );
    }

    #[test]
    fn test_reorder_before_takes_target_parent() {
        let index = index();
        let mut session = started(&["c"], &index);
        let outcome = session
            .end(Some(DropZone::reorder("a2", Boundary::Before)), &index)
            .unwrap();
        assert_eq!(
            outcome,
            DragOutcome::Completed(vec![RelativeMove::new(
                "c",
                Some("a".into()),
                Anchor::Before("a2".into())
            )])
        );
    }

    #[test]
    fn test_multi_select_chains_after_previous_root() {
        let index = index();
        // a2x lives under the dragged task a, so the only zone offered is invalid.
        let mut session = started(&["c", "a", "b"], &index);
        let outcome = session.end(Some(DropZone::nest("a2x")), &index).unwrap();
        assert_eq!(outcome, DragOutcome::Cancelled);

        let mut session = started(&["c", "b", "a1"], &index);
        let DragOutcome::Completed(moves) = session
            .end(Some(DropZone::reorder("a", Boundary::Before)), &index)
            .unwrap()
        else {
            panic!("expected completed drag");
        };
        assert_eq!(
            moves,
            vec![
                RelativeMove::new("a1", None, Anchor::Before("a".into())),
                RelativeMove::new("b", None, Anchor::After("a1".into())),
                RelativeMove::new("c", None, Anchor::After("b".into())),
            ]
        );
    }

    #[test]
    fn test_end_revalidates_against_drop_time_snapshot() {
        let before = index();
        let mut session = started(&["b"], &before);
        assert!(session.move_to(DropZone::nest("c"), &before));

        // Meanwhile c was nested under b by someone else.
        let after = HierarchyIndex::build(vec![
            task("a", None, 1000),
            task("b", None, 2000),
            task("c", Some("b"), 1000),
        ]);
        let err = session.end(None, &after).unwrap_err();
        assert!(matches!(err, JobtreeError::InvalidNesting { .. }));
        assert_eq!(session.phase(), DragPhase::Cancelled);
    }

    #[test]
    fn test_end_requires_active_drag() {
        let index = index();
        let mut session = DragSession::new();
        assert!(session.end(None, &index).is_err());
        let mut session = started(&["a"], &index);
        session.cancel();
        assert_eq!(session.phase(), DragPhase::Cancelled);
        assert!(!session.move_to(DropZone::nest("b"), &index));
    }
}
