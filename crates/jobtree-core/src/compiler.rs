//! Compiles relative move intents into concrete position updates.
//!
//! Anchors are resolved against the snapshot handed to [`RelativeMoveCompiler::compile`],
//! with every task of the batch removed from its sibling list first. Moves
//! anchored on a batch peer are compiled after that peer, so they see the
//! peer's new key instead of its stale one.

use std::collections::{HashMap, HashSet};

use crate::config::ConfigRoot;
use crate::error::{JobtreeError, Result};
use crate::hierarchy::HierarchyIndex;
use crate::moves::{Anchor, PositionUpdate, RelativeMove};
use crate::position::PositionAllocator;
use crate::task::{Position, TaskId};

/// A move whose anchor was not among the target siblings and was appended
/// at the end instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorFallback {
    pub task_id: TaskId,
    pub anchor_id: TaskId,
}

/// Output of one compile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledBatch {
    /// Moved tasks first in compile order, interleaved with siblings
    /// re-spaced by a renumbering pass. The last record is `finalized`.
    pub updates: Vec<PositionUpdate>,
    pub anchor_fallbacks: Vec<AnchorFallback>,
    /// Parents (`None` for the root list) whose children were renumbered.
    pub renumbered_parents: Vec<Option<TaskId>>,
}

/// Key for a task that is about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInsert {
    pub position: Position,
    pub repositioned_after_id: Option<TaskId>,
    /// Sibling rewrites from a renumbering pass; must be written first.
    pub sibling_updates: Vec<PositionUpdate>,
    pub anchor_fallback: Option<AnchorFallback>,
}

#[derive(Debug, Clone)]
struct Slot {
    id: TaskId,
    position: Position,
}

#[derive(Debug, Clone, Default)]
pub struct RelativeMoveCompiler {
    allocator: PositionAllocator,
    strict_anchors: bool,
}

impl RelativeMoveCompiler {
    pub fn new(allocator: PositionAllocator, strict_anchors: bool) -> Self {
        Self {
            allocator,
            strict_anchors,
        }
    }

    pub fn from_config(config: &ConfigRoot) -> Result<Self> {
        Ok(Self::new(
            PositionAllocator::new(&config.positioning)?,
            config.moves.strict_anchors,
        ))
    }

    pub fn allocator(&self) -> &PositionAllocator {
        &self.allocator
    }

    /// Turns `moves` into position updates against `index`.
    pub fn compile(&self, moves: &[RelativeMove], index: &HierarchyIndex) -> Result<CompiledBatch> {
        validate_moves(moves, index)?;
        let ordered = dependency_order(moves)?;
        let moved: HashSet<&str> = moves.iter().map(|mv| mv.task_id.as_str()).collect();

        let mut lists: HashMap<Option<TaskId>, Vec<Slot>> = HashMap::new();
        let mut builder = Builder::new(self, index);

        for mv in ordered {
            let list = lists
                .entry(mv.parent_id.clone())
                .or_insert_with(|| sibling_slots(index, mv.parent_id.as_deref(), &moved));
            let at = builder.insertion_index(list, &mv.task_id, &mv.anchor)?;
            let (position, after) = builder.allocate_at(list, at, mv.parent_id.as_deref())?;
            list.insert(
                at,
                Slot {
                    id: mv.task_id.clone(),
                    position,
                },
            );
            builder.emit(PositionUpdate {
                id: mv.task_id.clone(),
                position,
                parent_id: mv.parent_id.clone(),
                repositioned_after_id: after,
                lock_version: lock_version(index, &mv.task_id),
                finalized: false,
            });
        }

        let batch = builder.finish();
        tracing::debug!(
            "[RelativeMoveCompiler] compiled {} moves into {} updates ({} fallbacks)",
            moves.len(),
            batch.updates.len(),
            batch.anchor_fallbacks.len()
        );
        Ok(batch)
    }

    /// Resolves a key for a new task under `parent_id` at `anchor`.
    pub fn insert_position(
        &self,
        parent_id: Option<&str>,
        anchor: &Anchor,
        index: &HierarchyIndex,
    ) -> Result<CompiledInsert> {
        if let Some(parent_id) = parent_id.filter(|id| !index.contains(id)) {
            return Err(JobtreeError::not_found("task", parent_id));
        }

        let mut list = sibling_slots(index, parent_id, &HashSet::new());
        let mut builder = Builder::new(self, index);
        let at = builder.insertion_index(&list, "(new task)", anchor)?;
        let (position, after) = builder.allocate_at(&mut list, at, parent_id)?;
        let mut batch = builder.finish();

        Ok(CompiledInsert {
            position,
            repositioned_after_id: after,
            sibling_updates: std::mem::take(&mut batch.updates),
            anchor_fallback: batch.anchor_fallbacks.pop(),
        })
    }
}

/// Accumulates updates for one compile call.
struct Builder<'a> {
    compiler: &'a RelativeMoveCompiler,
    index: &'a HierarchyIndex,
    batch: CompiledBatch,
    emitted: HashMap<TaskId, usize>,
}

impl<'a> Builder<'a> {
    fn new(compiler: &'a RelativeMoveCompiler, index: &'a HierarchyIndex) -> Self {
        Self {
            compiler,
            index,
            batch: CompiledBatch::default(),
            emitted: HashMap::new(),
        }
    }

    fn insertion_index(&mut self, list: &[Slot], task_id: &str, anchor: &Anchor) -> Result<usize> {
        let found = match anchor {
            Anchor::First => Some(0),
            Anchor::Last => Some(list.len()),
            Anchor::After(id) => list.iter().position(|slot| slot.id == *id).map(|i| i + 1),
            Anchor::Before(id) => list.iter().position(|slot| slot.id == *id),
        };
        if let Some(at) = found {
            return Ok(at);
        }

        let anchor_id = anchor.reference().unwrap_or_default().to_string();
        if self.compiler.strict_anchors {
            return Err(JobtreeError::AnchorNotFound {
                task_id: task_id.to_string(),
                anchor_id,
            });
        }
        tracing::warn!(
            "[RelativeMoveCompiler] anchor {} not among siblings of {}, appending at end",
            anchor_id,
            task_id
        );
        self.batch.anchor_fallbacks.push(AnchorFallback {
            task_id: task_id.to_string(),
            anchor_id,
        });
        Ok(list.len())
    }

    /// Key for a slot inserted at `at`, plus the id it will follow.
    ///
    /// Runs one renumbering pass over `list` if the neighbours leave no room.
    fn allocate_at(
        &mut self,
        list: &mut [Slot],
        at: usize,
        parent_id: Option<&str>,
    ) -> Result<(Position, Option<TaskId>)> {
        let position = match self.key_between(list, at) {
            Ok(position) => position,
            Err(e) if e.is_allocation_exhausted() => {
                tracing::info!(
                    "[RelativeMoveCompiler] keys exhausted under {:?}, renumbering {} siblings",
                    parent_id,
                    list.len()
                );
                self.renumber(list, parent_id)?;
                self.key_between(list, at).inspect_err(|e| {
                    tracing::error!("[RelativeMoveCompiler] allocation failed after renumbering: {}", e);
                })?
            }
            Err(e) => return Err(e),
        };
        let after = at.checked_sub(1).map(|i| list[i].id.clone());
        Ok((position, after))
    }

    fn key_between(&self, list: &[Slot], at: usize) -> Result<Position> {
        let prev = at.checked_sub(1).map(|i| list[i].position);
        let next = list.get(at).map(|slot| slot.position);
        self.compiler.allocator.allocate(prev, next)
    }

    fn renumber(&mut self, list: &mut [Slot], parent_id: Option<&str>) -> Result<()> {
        let keys = self.compiler.allocator.renumber(list.len())?;
        for (i, key) in keys.into_iter().enumerate() {
            if list[i].position == key {
                continue;
            }
            list[i].position = key;
            let id = list[i].id.clone();
            match self.emitted.get(&id) {
                Some(&emitted) => self.batch.updates[emitted].position = key,
                None => {
                    // Siblings outside the batch keep their stored parent,
                    // so an orphan keeps its dangling reference.
                    let stored_parent = match self.index.get(&id) {
                        Some(task) => task.parent_id.clone(),
                        None => parent_id.map(str::to_string),
                    };
                    self.emit(PositionUpdate {
                        repositioned_after_id: i.checked_sub(1).map(|j| list[j].id.clone()),
                        lock_version: lock_version(self.index, &id),
                        id,
                        position: key,
                        parent_id: stored_parent,
                        finalized: false,
                    })
                }
            }
        }
        self.batch.renumbered_parents.push(parent_id.map(str::to_string));
        Ok(())
    }

    fn emit(&mut self, update: PositionUpdate) {
        self.emitted.insert(update.id.clone(), self.batch.updates.len());
        self.batch.updates.push(update);
    }

    fn finish(mut self) -> CompiledBatch {
        if let Some(last) = self.batch.updates.last_mut() {
            last.finalized = true;
        }
        self.batch
    }
}

fn sibling_slots(index: &HierarchyIndex, parent_id: Option<&str>, moved: &HashSet<&str>) -> Vec<Slot> {
    index
        .children_of(parent_id)
        .iter()
        .filter(|id| !moved.contains(id.as_str()))
        .filter_map(|id| index.get(id))
        .map(|task| Slot {
            id: task.id.clone(),
            position: task.position,
        })
        .collect()
}

fn lock_version(index: &HierarchyIndex, id: &str) -> u64 {
    index.get(id).map(|task| task.lock_version).unwrap_or_default()
}

fn validate_moves(moves: &[RelativeMove], index: &HierarchyIndex) -> Result<()> {
    let mut seen = HashSet::new();
    for mv in moves {
        if !seen.insert(mv.task_id.as_str()) {
            return Err(JobtreeError::invalid_move(format!(
                "task '{}' appears more than once",
                mv.task_id
            )));
        }
        let task = index
            .get(&mv.task_id)
            .ok_or_else(|| JobtreeError::not_found("task", mv.task_id.as_str()))?;
        if let Some(parent_id) = mv.parent_id.as_deref() {
            let parent = index
                .get(parent_id)
                .ok_or_else(|| JobtreeError::not_found("task", parent_id))?;
            if parent.job_id != task.job_id {
                return Err(JobtreeError::invalid_nesting(task.id.as_str(), parent_id));
            }
        }
        if mv.anchor.reference() == Some(mv.task_id.as_str()) {
            return Err(JobtreeError::invalid_move(format!(
                "task '{}' is anchored on itself",
                mv.task_id
            )));
        }
    }

    // The tree after applying every move must still be acyclic.
    let overrides: HashMap<&str, Option<&str>> = moves
        .iter()
        .map(|mv| (mv.task_id.as_str(), mv.parent_id.as_deref()))
        .collect();
    for mv in moves {
        let mut current = mv.parent_id.as_deref();
        let mut steps = 0;
        while let Some(id) = current {
            if id == mv.task_id || steps > index.len() {
                return Err(JobtreeError::invalid_nesting(
                    mv.task_id.as_str(),
                    mv.parent_id.as_deref().unwrap_or_default(),
                ));
            }
            current = match overrides.get(id) {
                Some(parent) => *parent,
                None => index.parent_of(id),
            };
            steps += 1;
        }
    }
    Ok(())
}

/// Orders moves so that a move anchored on a batch peer follows that peer.
fn dependency_order(moves: &[RelativeMove]) -> Result<Vec<&RelativeMove>> {
    let batch_ids: HashSet<&str> = moves.iter().map(|mv| mv.task_id.as_str()).collect();
    let mut done: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&RelativeMove> = moves.iter().collect();
    let mut ordered = Vec::with_capacity(moves.len());

    while !pending.is_empty() {
        let ready = pending.iter().position(|mv| match mv.anchor.reference() {
            Some(anchor) if batch_ids.contains(anchor) => done.contains(anchor),
            _ => true,
        });
        let Some(i) = ready else {
            return Err(JobtreeError::invalid_move("move anchors form a cycle"));
        };
        let mv = pending.remove(i);
        done.insert(mv.task_id.as_str());
        ordered.push(mv);
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PositioningConfig;
    use crate::task::Task;

    fn task(id: &str, parent: Option<&str>, position: i64) -> Task {
        Task::new(id, "job-1", id, parent.map(str::to_string), Position::new(position))
    }

    fn roots_abc() -> HierarchyIndex {
        HierarchyIndex::build(vec![
            task("a", None, 1000),
            task("b", None, 2000),
            task("c", None, 3000),
        ])
    }

    fn positions(batch: &CompiledBatch) -> Vec<(String, i64)> {
        batch
            .updates
            .iter()
            .map(|u| (u.id.clone(), u.position.value()))
            .collect()
    }

    #[test]
    fn test_drop_between_siblings_takes_midpoint() {
        let index = HierarchyIndex::build(vec![
            task("a", None, 1000),
            task("b", None, 2000),
            task("x", Some("a"), 1000),
        ]);
        let batch = RelativeMoveCompiler::default()
            .compile(&[RelativeMove::new("x", None, Anchor::After("a".into()))], &index)
            .unwrap();
        assert_eq!(batch.updates.len(), 1);
        let update = &batch.updates[0];
        assert_eq!(update.position, Position::new(1500));
        assert_eq!(update.parent_id, None);
        assert_eq!(update.repositioned_after_id.as_deref(), Some("a"));
        assert!(update.finalized);
    }

    #[test]
    fn test_before_anchor_uses_predecessor() {
        let index = roots_abc();
        let compiler = RelativeMoveCompiler::default();
        let batch = compiler
            .compile(&[RelativeMove::new("c", None, Anchor::Before("b".into()))], &index)
            .unwrap();
        assert_eq!(positions(&batch), [("c".to_string(), 1500)]);

        let batch = compiler
            .compile(&[RelativeMove::new("c", None, Anchor::Before("a".into()))], &index)
            .unwrap();
        assert_eq!(positions(&batch), [("c".to_string(), 0)]);
        assert_eq!(batch.updates[0].repositioned_after_id, None);
    }

    #[test]
    fn test_first_and_last_anchors() {
        let index = roots_abc();
        let compiler = RelativeMoveCompiler::default();
        let batch = compiler
            .compile(&[RelativeMove::new("b", None, Anchor::Last)], &index)
            .unwrap();
        assert_eq!(positions(&batch), [("b".to_string(), 4000)]);
        assert_eq!(batch.updates[0].repositioned_after_id.as_deref(), Some("c"));

        let batch = compiler
            .compile(&[RelativeMove::new("c", Some("a".into()), Anchor::First)], &index)
            .unwrap();
        assert_eq!(
            positions(&batch),
            [("c".to_string(), crate::config::DEFAULT_POSITION)]
        );
    }

    #[test]
    fn test_nest_under_childless_root() {
        let index = roots_abc();
        let batch = RelativeMoveCompiler::default()
            .compile(&[RelativeMove::new("b", Some("a".into()), Anchor::First)], &index)
            .unwrap();
        let update = &batch.updates[0];
        assert_eq!(update.parent_id.as_deref(), Some("a"));
        // A later "insert after b" must land strictly above it.
        let next = PositionAllocator::default()
            .allocate(Some(update.position), None)
            .unwrap();
        assert!(next > update.position);
    }

    #[test]
    fn test_chained_moves_are_order_independent() {
        let index = HierarchyIndex::build(vec![
            task("x", None, 1000),
            task("y", None, 2000),
            task("p", None, 3000),
            task("q", None, 4000),
            task("r", None, 5000),
        ]);
        let moves = vec![
            RelativeMove::new("p", None, Anchor::After("x".into())),
            RelativeMove::new("q", None, Anchor::After("p".into())),
            RelativeMove::new("r", None, Anchor::After("q".into())),
        ];
        let compiler = RelativeMoveCompiler::default();
        let expected = compiler.compile(&moves, &index).unwrap();
        assert_eq!(
            positions(&expected),
            [
                ("p".to_string(), 1500),
                ("q".to_string(), 1750),
                ("r".to_string(), 1875)
            ]
        );

        let shuffled = vec![moves[2].clone(), moves[0].clone(), moves[1].clone()];
        let batch = compiler.compile(&shuffled, &index).unwrap();
        let mut got = positions(&batch);
        got.sort();
        assert_eq!(got, positions(&expected));
    }

    #[test]
    fn test_moved_peers_are_not_used_as_neighbours() {
        // b and c both leave the list, so a and d are the only neighbours.
        let index = HierarchyIndex::build(vec![
            task("a", None, 1000),
            task("b", None, 1100),
            task("c", None, 1200),
            task("d", None, 2000),
        ]);
        let batch = RelativeMoveCompiler::default()
            .compile(
                &[
                    RelativeMove::new("c", None, Anchor::After("a".into())),
                    RelativeMove::new("b", None, Anchor::After("c".into())),
                ],
                &index,
            )
            .unwrap();
        assert_eq!(
            positions(&batch),
            [("c".to_string(), 1500), ("b".to_string(), 1750)]
        );
    }

    #[test]
    fn test_missing_anchor_falls_back_to_end_and_is_reported() {
        let index = roots_abc();
        let batch = RelativeMoveCompiler::default()
            .compile(&[RelativeMove::new("a", None, Anchor::After("ghost".into()))], &index)
            .unwrap();
        assert_eq!(positions(&batch), [("a".to_string(), 4000)]);
        assert_eq!(
            batch.anchor_fallbacks,
            [AnchorFallback {
                task_id: "a".into(),
                anchor_id: "ghost".into()
            }]
        );
    }

    #[test]
    fn test_strict_anchors_reject_missing_anchor() {
        let index = roots_abc();
        let compiler = RelativeMoveCompiler::new(PositionAllocator::default(), true);
        let err = compiler
            .compile(&[RelativeMove::new("a", None, Anchor::Before("ghost".into()))], &index)
            .unwrap_err();
        assert!(matches!(err, JobtreeError::AnchorNotFound { .. }));
    }

    #[test]
    fn test_exhausted_keys_trigger_one_renumbering_pass() {
        let index = HierarchyIndex::build(vec![
            task("a", None, 1000),
            task("b", None, 1001),
            task("c", None, 1002),
            task("m", None, 9000),
        ]);
        let batch = RelativeMoveCompiler::default()
            .compile(&[RelativeMove::new("m", None, Anchor::After("a".into()))], &index)
            .unwrap();
        assert_eq!(batch.renumbered_parents, [None]);
        // a, b, c re-spaced to 1000, 2000, 3000; m bisects a and b.
        assert_eq!(
            positions(&batch),
            [
                ("b".to_string(), 2000),
                ("c".to_string(), 3000),
                ("m".to_string(), 1500)
            ]
        );
        assert_eq!(batch.updates[0].repositioned_after_id.as_deref(), Some("a"));
        assert!(batch.updates[2].finalized);
        assert!(!batch.updates[0].finalized);
    }

    #[test]
    fn test_renumbering_keeps_orphan_parent_reference() {
        let index = HierarchyIndex::build(vec![
            task("a", None, 1000),
            task("o", Some("gone"), 1001),
            task("c", None, 1002),
            task("m", None, 9000),
        ]);
        let batch = RelativeMoveCompiler::default()
            .compile(&[RelativeMove::new("m", None, Anchor::After("a".into()))], &index)
            .unwrap();

        assert_eq!(
            positions(&batch),
            [
                ("o".to_string(), 2000),
                ("c".to_string(), 3000),
                ("m".to_string(), 1500)
            ]
        );
        assert_eq!(batch.updates[0].parent_id.as_deref(), Some("gone"));
        assert_eq!(batch.updates[1].parent_id, None);
        assert_eq!(batch.updates[2].parent_id, None);
    }

    #[test]
    fn test_renumbering_updates_already_compiled_peer() {
        let allocator = PositionAllocator::new(&PositioningConfig {
            gap: 4,
            default_position: 100,
            min_position: 0,
        })
        .unwrap();
        let index = HierarchyIndex::build(vec![
            task("a", None, 4),
            task("b", None, 6),
            task("p", None, 50),
            task("q", None, 60),
        ]);
        let batch = RelativeMoveCompiler::new(allocator, false)
            .compile(
                &[
                    RelativeMove::new("p", None, Anchor::After("a".into())),
                    RelativeMove::new("q", None, Anchor::After("p".into())),
                ],
                &index,
            )
            .unwrap();
        // p lands on 5, leaving no room before b=6. The renumber pass moves
        // p to 8 in place and b to 12, then q bisects them.
        assert_eq!(
            positions(&batch),
            [
                ("p".to_string(), 8),
                ("b".to_string(), 12),
                ("q".to_string(), 10)
            ]
        );
        assert_eq!(batch.updates[1].repositioned_after_id.as_deref(), Some("p"));
        assert_eq!(batch.renumbered_parents, [None]);
    }

    #[test]
    fn test_allocation_still_exhausted_after_renumber_is_fatal() {
        let allocator = PositionAllocator::new(&PositioningConfig {
            gap: 1,
            default_position: 100,
            min_position: 0,
        })
        .unwrap();
        let index = HierarchyIndex::build(vec![task("a", None, 1), task("b", None, 2), task("m", None, 50)]);
        let err = RelativeMoveCompiler::new(allocator, false)
            .compile(&[RelativeMove::new("m", None, Anchor::After("a".into()))], &index)
            .unwrap_err();
        assert!(err.is_allocation_exhausted());
    }

    #[test]
    fn test_cycle_through_batch_is_rejected() {
        let index = HierarchyIndex::build(vec![task("a", None, 1000), task("b", None, 2000)]);
        let compiler = RelativeMoveCompiler::default();
        let err = compiler
            .compile(
                &[
                    RelativeMove::new("a", Some("b".into()), Anchor::First),
                    RelativeMove::new("b", Some("a".into()), Anchor::First),
                ],
                &index,
            )
            .unwrap_err();
        assert!(matches!(err, JobtreeError::InvalidNesting { .. }));

        let err = compiler
            .compile(&[RelativeMove::new("a", Some("a".into()), Anchor::First)], &index)
            .unwrap_err();
        assert!(matches!(err, JobtreeError::InvalidNesting { .. }));
    }

    #[test]
    fn test_nesting_under_descendant_is_rejected() {
        let index = HierarchyIndex::build(vec![
            task("a", None, 1000),
            task("a1", Some("a"), 1000),
            task("a1x", Some("a1"), 1000),
        ]);
        let err = RelativeMoveCompiler::default()
            .compile(&[RelativeMove::new("a", Some("a1x".into()), Anchor::Last)], &index)
            .unwrap_err();
        assert_eq!(err, JobtreeError::invalid_nesting("a", "a1x"));
    }

    #[test]
    fn test_malformed_move_sets() {
        let index = roots_abc();
        let compiler = RelativeMoveCompiler::default();
        let duplicate = [
            RelativeMove::new("a", None, Anchor::Last),
            RelativeMove::new("a", None, Anchor::First),
        ];
        assert!(matches!(
            compiler.compile(&duplicate, &index),
            Err(JobtreeError::InvalidMove(_))
        ));

        let self_anchor = [RelativeMove::new("a", None, Anchor::After("a".into()))];
        assert!(matches!(
            compiler.compile(&self_anchor, &index),
            Err(JobtreeError::InvalidMove(_))
        ));

        let anchor_cycle = [
            RelativeMove::new("a", None, Anchor::After("b".into())),
            RelativeMove::new("b", None, Anchor::After("a".into())),
        ];
        assert!(matches!(
            compiler.compile(&anchor_cycle, &index),
            Err(JobtreeError::InvalidMove(_))
        ));

        let unknown = [RelativeMove::new("zz", None, Anchor::Last)];
        assert!(compiler.compile(&unknown, &index).unwrap_err().is_not_found());
    }

    #[test]
    fn test_cross_job_parent_is_rejected() {
        let mut foreign = task("f", None, 1000);
        foreign.job_id = "job-2".into();
        let index = HierarchyIndex::build(vec![task("a", None, 1000), foreign]);
        let err = RelativeMoveCompiler::default()
            .compile(&[RelativeMove::new("a", Some("f".into()), Anchor::First)], &index)
            .unwrap_err();
        assert!(matches!(err, JobtreeError::InvalidNesting { .. }));
    }

    #[test]
    fn test_insert_position_for_new_task() {
        let index = roots_abc();
        let compiler = RelativeMoveCompiler::default();
        let insert = compiler
            .insert_position(None, &Anchor::After("a".into()), &index)
            .unwrap();
        assert_eq!(insert.position, Position::new(1500));
        assert_eq!(insert.repositioned_after_id.as_deref(), Some("a"));
        assert!(insert.sibling_updates.is_empty());
        assert!(insert.anchor_fallback.is_none());

        let insert = compiler.insert_position(Some("b"), &Anchor::Last, &index).unwrap();
        assert_eq!(insert.position.value(), crate::config::DEFAULT_POSITION);

        assert!(compiler
            .insert_position(Some("ghost"), &Anchor::Last, &index)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_insert_position_renumbers_crowded_list() {
        let index = HierarchyIndex::build(vec![task("a", None, 5), task("b", None, 6)]);
        let insert = RelativeMoveCompiler::default()
            .insert_position(None, &Anchor::Before("b".into()), &index)
            .unwrap();
        assert_eq!(insert.position, Position::new(1500));
        assert_eq!(insert.sibling_updates.len(), 2);
        assert!(insert.sibling_updates[1].finalized);
    }
}
