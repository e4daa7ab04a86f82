//! Parent → children index over a flat task snapshot.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::expansion::ExpansionState;
use crate::task::{Task, TaskId};

/// One row of a flattened hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatEntry<'a> {
    pub task: &'a Task,
    pub depth: usize,
    pub has_children: bool,
}

/// Nested, owned view of the hierarchy, derived from an index.
///
/// Holds no back references; rebuilding the index and calling
/// [`HierarchyIndex::tree`] again is the only way to refresh it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyNode {
    pub task: Task,
    pub depth: usize,
    pub expanded: bool,
    pub children: Vec<HierarchyNode>,
}

/// Read-only arena of tasks keyed by id, with ordered child lists.
///
/// The arena only stores `parent_id` back references. Every tree view is
/// derived on demand, and the arena is never mutated after `build`.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    tasks: HashMap<TaskId, Task>,
    roots: Vec<TaskId>,
    children: HashMap<TaskId, Vec<TaskId>>,
}

impl HierarchyIndex {
    /// Indexes a flat task set.
    ///
    /// Child lists are sorted by `(position, id)`. A task whose parent is
    /// missing from the snapshot is indexed as a root.
    pub fn build(tasks: impl IntoIterator<Item = Task>) -> Self {
        let tasks: HashMap<TaskId, Task> = tasks
            .into_iter()
            .map(|task| (task.id.clone(), task))
            .collect();

        let mut roots = Vec::new();
        let mut children: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for task in tasks.values() {
            match task.parent_id.as_deref() {
                Some(parent_id) if tasks.contains_key(parent_id) => children
                    .entry(parent_id.to_string())
                    .or_default()
                    .push(task.id.clone()),
                Some(parent_id) => {
                    tracing::warn!(
                        "[HierarchyIndex] task {} references missing parent {}, indexing as root",
                        task.id,
                        parent_id
                    );
                    roots.push(task.id.clone());
                }
                None => roots.push(task.id.clone()),
            }
        }

        let by_position = |a: &TaskId, b: &TaskId| {
            let (ta, tb) = (&tasks[a], &tasks[b]);
            ta.position.cmp(&tb.position).then_with(|| ta.id.cmp(&tb.id))
        };
        roots.sort_by(by_position);
        for list in children.values_mut() {
            list.sort_by(by_position);
        }

        Self {
            tasks,
            roots,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    /// All indexed tasks, in arbitrary order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Ordered children of `parent`, or the root list for `None`.
    pub fn children_of(&self, parent: Option<&str>) -> &[TaskId] {
        match parent {
            None => &self.roots,
            Some(id) => self.children.get(id).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    pub fn has_children(&self, id: &str) -> bool {
        !self.children_of(Some(id)).is_empty()
    }

    /// Effective parent of `id` in this index.
    ///
    /// Differs from `task.parent_id` only for orphans, which report `None`.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.tasks
            .get(id)
            .and_then(|task| task.parent_id.as_deref())
            .filter(|parent_id| self.tasks.contains_key(*parent_id))
    }

    /// Depth-first pre-order rows, descending only into expanded ids.
    pub fn flatten(&self, expanded: &ExpansionState) -> Vec<FlatEntry<'_>> {
        self.walk(|id| expanded.is_expanded(id))
    }

    /// Pre-order of the whole tree, as if every node were expanded.
    pub fn visit_order(&self) -> Vec<&TaskId> {
        self.walk(|_| true)
            .into_iter()
            .map(|entry| &entry.task.id)
            .collect()
    }

    fn walk(&self, descend: impl Fn(&str) -> bool) -> Vec<FlatEntry<'_>> {
        let mut out = Vec::with_capacity(self.tasks.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&TaskId, usize)> = self.roots.iter().rev().map(|id| (id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id.as_str()) {
                continue;
            }
            let Some(task) = self.tasks.get(id) else {
                continue;
            };
            let kids = self.children_of(Some(id.as_str()));
            out.push(FlatEntry {
                task,
                depth,
                has_children: !kids.is_empty(),
            });
            if descend(id.as_str()) {
                stack.extend(kids.iter().rev().map(|child| (child, depth + 1)));
            }
        }
        out
    }

    /// True iff `ancestor_id` is on the parent chain of `candidate_id`.
    ///
    /// A task is not its own descendant. The walk is bounded by the node
    /// count; a chain longer than that can only be a cycle in corrupt input
    /// and is reported as `true`.
    pub fn is_descendant_of(&self, candidate_id: &str, ancestor_id: &str) -> bool {
        let mut current = self.tasks.get(candidate_id).and_then(|t| t.parent_id.as_deref());
        for _ in 0..=self.tasks.len() {
            match current {
                None => return false,
                Some(id) if id == ancestor_id => return true,
                Some(id) => match self.tasks.get(id) {
                    Some(task) => current = task.parent_id.as_deref(),
                    None => return false,
                },
            }
        }
        tracing::warn!(
            "[HierarchyIndex] parent chain of {} does not terminate, treating as descendant of {}",
            candidate_id,
            ancestor_id
        );
        true
    }

    /// Nested view of the visible tree; collapsed nodes carry no children.
    pub fn tree(&self, expanded: &ExpansionState) -> Vec<HierarchyNode> {
        let mut visited = HashSet::new();
        self.roots
            .iter()
            .filter_map(|id| self.node(id, 0, expanded, &mut visited))
            .collect()
    }

    fn node<'a>(
        &'a self,
        id: &'a str,
        depth: usize,
        expanded: &ExpansionState,
        visited: &mut HashSet<&'a str>,
    ) -> Option<HierarchyNode> {
        if !visited.insert(id) {
            return None;
        }
        let task = self.tasks.get(id)?;
        let is_expanded = expanded.is_expanded(id);
        let children = if is_expanded {
            self.children_of(Some(id))
                .iter()
                .filter_map(|child| self.node(child, depth + 1, expanded, visited))
                .collect()
        } else {
            Vec::new()
        };
        Some(HierarchyNode {
            task: task.clone(),
            depth,
            expanded: is_expanded,
            children,
        })
    }
}
