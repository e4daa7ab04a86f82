//! Hierarchy use cases.
//!
//! `HierarchyService` ties the engine pieces together: it loads a canonical
//! snapshot from the repository, resolves gestures and keyboard commands into
//! moves, compiles them and hands the result to the dispatcher. It holds no
//! task state between calls.

use std::path::Path;
use std::sync::Arc;

use jobtree_core::capability::{Capability, CapabilityProvider, StaticCapabilities};
use jobtree_core::config::ConfigRoot;
use jobtree_core::drag::{DragOutcome, DragSession, DropZone};
use jobtree_core::hierarchy::{ExpansionState, HierarchyIndex};
use jobtree_core::keyboard::{indent_move, outdent_move};
use jobtree_core::task::{Task, TaskId, TaskRepository, TaskStatus};
use jobtree_core::{
    Anchor, AnchorFallback, DispatchOutcome, JobtreeError, MutationDispatcher, PositionUpdate,
    PositionWriter, RelativeMove, RelativeMoveCompiler, Result,
};
use jobtree_infrastructure::TomlTaskRepository;
use serde::Serialize;

/// One rendered row of the visible tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleRow {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// What a successful move wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub moves: Vec<RelativeMove>,
    pub updates: Vec<PositionUpdate>,
    pub anchor_fallbacks: Vec<AnchorFallback>,
    pub renumbered_parents: Vec<Option<TaskId>>,
    pub outcome: DispatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropResult {
    /// The gesture ended without a valid zone; nothing was written.
    Cancelled,
    Applied(MoveReport),
}

pub struct HierarchyService {
    repository: Arc<dyn TaskRepository>,
    capabilities: Arc<dyn CapabilityProvider>,
    dispatcher: MutationDispatcher,
    compiler: RelativeMoveCompiler,
}

impl HierarchyService {
    pub fn new(
        repository: Arc<dyn TaskRepository>,
        writer: Arc<dyn PositionWriter>,
        capabilities: Arc<dyn CapabilityProvider>,
        compiler: RelativeMoveCompiler,
    ) -> Self {
        Self {
            repository,
            capabilities,
            dispatcher: MutationDispatcher::new(writer),
            compiler,
        }
    }

    /// Builds a service over one store that both reads tasks and writes
    /// position batches, with capabilities and positioning taken from
    /// `config`.
    pub fn from_config<S>(store: Arc<S>, config: &ConfigRoot) -> Result<Self>
    where
        S: TaskRepository + PositionWriter + 'static,
    {
        Ok(Self::new(
            store.clone(),
            store,
            Arc::new(StaticCapabilities::from(&config.capabilities)),
            RelativeMoveCompiler::from_config(config)?,
        ))
    }

    /// TOML job files under `data_dir` (platform data directory when `None`).
    pub fn with_toml_store(data_dir: Option<&Path>, config: &ConfigRoot) -> Result<Self> {
        Self::from_config(Arc::new(TomlTaskRepository::new(data_dir)?), config)
    }

    /// Loads the canonical snapshot of `job_id`.
    pub async fn snapshot(&self, job_id: &str) -> Result<HierarchyIndex> {
        let tasks = self.repository.list_by_job(job_id).await?;
        tracing::debug!("[HierarchyService] snapshot of job {}: {} tasks", job_id, tasks.len());
        Ok(HierarchyIndex::build(tasks))
    }

    pub async fn visible_rows(&self, job_id: &str, expanded: &ExpansionState) -> Result<Vec<VisibleRow>> {
        let index = self.snapshot(job_id).await?;
        Ok(index
            .flatten(expanded)
            .into_iter()
            .map(|entry| VisibleRow {
                id: entry.task.id.clone(),
                title: entry.task.title.clone(),
                status: entry.task.status,
                depth: entry.depth,
                has_children: entry.has_children,
                expanded: entry.has_children && expanded.is_expanded(&entry.task.id),
            })
            .collect())
    }

    /// Starts a drag over `task_ids`.
    pub async fn begin_drag<I, S>(&self, job_id: &str, task_ids: I) -> Result<DragSession>
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        let index = self.snapshot(job_id).await?;
        let mut session = DragSession::new();
        session.before_start(task_ids, &index, self.capabilities.as_ref())?;
        Ok(session)
    }

    /// Reports a hovered zone; returns whether it is a valid drop target.
    pub async fn drag_over(&self, job_id: &str, session: &mut DragSession, zone: DropZone) -> Result<bool> {
        let index = self.snapshot(job_id).await?;
        Ok(session.move_to(zone, &index))
    }

    /// Ends the drag against a freshly loaded snapshot and writes the result.
    pub async fn finish_drag(
        &self,
        job_id: &str,
        session: &mut DragSession,
        final_zone: Option<DropZone>,
    ) -> Result<DropResult> {
        let index = self.snapshot(job_id).await?;
        match session.end(final_zone, &index)? {
            DragOutcome::Cancelled => Ok(DropResult::Cancelled),
            DragOutcome::Completed(moves) => {
                let report = self.compile_and_submit(job_id, moves, &index).await?;
                Ok(DropResult::Applied(report))
            }
        }
    }

    /// Applies explicit moves, e.g. from a command line or an API call.
    pub async fn apply_moves(&self, job_id: &str, moves: Vec<RelativeMove>) -> Result<MoveReport> {
        let index = self.snapshot(job_id).await?;
        self.compile_and_submit(job_id, moves, &index).await
    }

    /// Nests `task_id` under its previous sibling. `None` when it has none.
    pub async fn indent(&self, job_id: &str, task_id: &str) -> Result<Option<MoveReport>> {
        let index = self.snapshot(job_id).await?;
        match indent_move(&index, task_id)? {
            Some(mv) => Ok(Some(self.compile_and_submit(job_id, vec![mv], &index).await?)),
            None => Ok(None),
        }
    }

    /// Moves `task_id` out of its parent. `None` for a root task.
    pub async fn outdent(&self, job_id: &str, task_id: &str) -> Result<Option<MoveReport>> {
        let index = self.snapshot(job_id).await?;
        match outdent_move(&index, task_id)? {
            Some(mv) => Ok(Some(self.compile_and_submit(job_id, vec![mv], &index).await?)),
            None => Ok(None),
        }
    }

    /// Creates a task under `parent_id` at `anchor`.
    pub async fn create_task(
        &self,
        job_id: &str,
        title: &str,
        parent_id: Option<&str>,
        anchor: Anchor,
    ) -> Result<Task> {
        self.capabilities.require(Capability::Create)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(JobtreeError::invalid_move("task title must not be empty"));
        }

        let index = self.snapshot(job_id).await?;
        let insert = self.compiler.insert_position(parent_id, &anchor, &index)?;
        if !insert.sibling_updates.is_empty() {
            tracing::info!(
                "[HierarchyService] renumbering {} siblings before create",
                insert.sibling_updates.len()
            );
            self.dispatcher.submit(job_id, insert.sibling_updates).await?;
        }

        let task = Task::new(
            uuid::Uuid::new_v4().to_string(),
            job_id,
            title,
            parent_id.map(str::to_string),
            insert.position,
        );
        self.repository.save(&task).await?;
        tracing::info!(
            "[HierarchyService] created task {} in job {} at {}",
            task.id,
            job_id,
            task.position
        );

        Ok(self
            .repository
            .find_by_id(job_id, &task.id)
            .await?
            .unwrap_or(task))
    }

    async fn compile_and_submit(
        &self,
        job_id: &str,
        moves: Vec<RelativeMove>,
        index: &HierarchyIndex,
    ) -> Result<MoveReport> {
        self.capabilities.require(Capability::Edit)?;
        let batch = self.compiler.compile(&moves, index)?;
        let outcome = self.dispatcher.submit(job_id, batch.updates.clone()).await?;
        Ok(MoveReport {
            moves,
            updates: batch.updates,
            anchor_fallbacks: batch.anchor_fallbacks,
            renumbered_parents: batch.renumbered_parents,
            outcome,
        })
    }
}
