use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::index::HierarchyIndex;
use crate::task::TaskId;

/// Set of expanded node ids.
///
/// Purely presentational: it is never persisted with tasks and only decides
/// which children [`HierarchyIndex::flatten`] descends into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionState {
    expanded: HashSet<TaskId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand(&mut self, id: impl Into<TaskId>) {
        self.expanded.insert(id.into());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Flips the node and returns whether it is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    /// Expands every node that has children.
    pub fn expand_all(&mut self, index: &HierarchyIndex) {
        self.expanded.extend(
            index
                .tasks()
                .filter(|task| index.has_children(&task.id))
                .map(|task| task.id.clone()),
        );
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Forgets ids that no longer exist after a snapshot rebuild.
    pub fn retain_existing(&mut self, index: &HierarchyIndex) {
        self.expanded.retain(|id| index.contains(id));
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

impl<S: Into<TaskId>> FromIterator<S> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().map(Into::into).collect(),
        }
    }
}
