//! TOML-backed task store.
//!
//! Every job is one file, so a position batch for a job is applied by a
//! single locked read-modify-write and is all-or-nothing.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use jobtree_core::dispatch::PositionWriter;
use jobtree_core::moves::PositionBatch;
use jobtree_core::task::{Task, TaskRepository};
use jobtree_core::{JobtreeError, Result};

use crate::dto::{JobFileDTO, TaskRecordDTO};
use crate::paths::JobtreePaths;
use crate::storage::AtomicTomlFile;

/// Directory structure:
/// ```text
/// base_dir/
/// └── jobs/
///     ├── job-a.toml
///     └── job-b.toml
/// ```
#[derive(Debug, Clone)]
pub struct TomlTaskRepository {
    paths: JobtreePaths,
}

impl TomlTaskRepository {
    /// Creates a repository rooted at `base_dir`, or the platform data
    /// directory when `None`.
    pub fn new(base_dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            paths: JobtreePaths::new(base_dir)?,
        })
    }

    pub fn paths(&self) -> &JobtreePaths {
        &self.paths
    }

    fn job_file(&self, job_id: &str) -> Result<AtomicTomlFile<JobFileDTO>> {
        Ok(AtomicTomlFile::new(self.paths.job_file(job_id)?))
    }

    async fn load_job(&self, job_id: &str) -> Result<JobFileDTO> {
        let file = self.job_file(job_id)?;
        let job_id = job_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<JobFileDTO> {
            let job = file.load()?.unwrap_or_else(|| JobFileDTO::empty(&job_id));
            job.check_version()?;
            job.check_job_id(&job_id)?;
            Ok(job)
        })
        .await
        .map_err(|e| JobtreeError::internal(format!("Failed to join task: {}", e)))?
    }

    async fn update_job<F, R>(&self, job_id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut JobFileDTO) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.job_file(job_id)?;
        let empty = JobFileDTO::empty(job_id);
        let job_id = job_id.to_string();
        tokio::task::spawn_blocking(move || {
            file.update(empty, |job| {
                job.check_version()?;
                job.check_job_id(&job_id)?;
                f(job)
            })
        })
        .await
        .map_err(|e| JobtreeError::internal(format!("Failed to join task: {}", e)))?
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl TaskRepository for TomlTaskRepository {
    async fn find_by_id(&self, job_id: &str, task_id: &str) -> Result<Option<Task>> {
        let job = self.load_job(job_id).await?;
        Ok(job.find(task_id).cloned().map(|record| record.into_domain(job_id)))
    }

    async fn list_by_job(&self, job_id: &str) -> Result<Vec<Task>> {
        Ok(self.load_job(job_id).await?.into_tasks())
    }

    /// Upserts `task`. Timestamps are stamped here and `lock_version` is
    /// bumped for an existing record.
    async fn save(&self, task: &Task) -> Result<()> {
        let mut record = TaskRecordDTO::from(task);
        let task_id = task.id.clone();
        self.update_job(&task.job_id, move |job| {
            let stamp = now();
            record.updated_at = stamp.clone();
            match job.find_mut(&record.id) {
                Some(existing) => {
                    record.lock_version = existing.lock_version + 1;
                    record.created_at = existing.created_at.clone();
                    *existing = record;
                }
                None => {
                    if record.created_at.is_empty() {
                        record.created_at = stamp;
                    }
                    job.tasks.push(record);
                }
            }
            Ok(())
        })
        .await?;
        tracing::debug!("[TomlTaskRepository] saved task {} in job {}", task_id, task.job_id);
        Ok(())
    }

    /// Removes the record only; its children are left in place and show up
    /// as orphans until moved.
    async fn delete(&self, job_id: &str, task_id: &str) -> Result<()> {
        let id = task_id.to_string();
        let removed = self
            .update_job(job_id, move |job| {
                let before = job.tasks.len();
                job.tasks.retain(|record| record.id != id);
                Ok(before != job.tasks.len())
            })
            .await?;
        if removed {
            tracing::debug!("[TomlTaskRepository] deleted task {} from job {}", task_id, job_id);
        }
        Ok(())
    }
}

#[async_trait]
impl PositionWriter for TomlTaskRepository {
    async fn write_positions(&self, batch: &PositionBatch) -> Result<()> {
        let batch = batch.clone();
        let job_id = batch.job_id.clone();
        let count = batch.len();
        self.update_job(&job_id, move |job| apply_batch(job, &batch))
            .await
            .map_err(|e| match e {
                JobtreeError::DispatchRejected(_) => e,
                other => JobtreeError::DispatchRejected(other.to_string()),
            })?;
        tracing::info!("[TomlTaskRepository] applied {} position updates to job {}", count, job_id);
        Ok(())
    }
}

/// Checks the whole batch against the stored records, then applies it.
fn apply_batch(job: &mut JobFileDTO, batch: &PositionBatch) -> Result<()> {
    let reject = |message: String| Err(JobtreeError::DispatchRejected(message));

    let mut seen = HashSet::new();
    for update in &batch.updates {
        if !seen.insert(update.id.as_str()) {
            return reject(format!("task '{}' appears twice in the batch", update.id));
        }
        let Some(record) = job.find(&update.id) else {
            return reject(format!("task '{}' does not exist", update.id));
        };
        if record.lock_version != update.lock_version {
            return reject(format!(
                "stale lock_version for '{}': expected {}, stored {}",
                update.id, update.lock_version, record.lock_version
            ));
        }
    }

    // Parent graph as it would look after the batch.
    let mut parents: HashMap<&str, Option<&str>> = job
        .tasks
        .iter()
        .map(|record| (record.id.as_str(), record.parent_id.as_deref()))
        .collect();
    for update in &batch.updates {
        // A dangling parent is only accepted when the update keeps it as is.
        let unchanged = job
            .find(&update.id)
            .is_some_and(|record| record.parent_id == update.parent_id);
        if let Some(parent_id) = update
            .parent_id
            .as_deref()
            .filter(|p| !unchanged && !parents.contains_key(p))
        {
            return reject(format!("parent '{}' of '{}' does not exist", parent_id, update.id));
        }
        parents.insert(update.id.as_str(), update.parent_id.as_deref());
    }
    for update in &batch.updates {
        let mut current = update.parent_id.as_deref();
        let mut steps = 0;
        while let Some(id) = current {
            if id == update.id || steps > parents.len() {
                return reject(format!("moving '{}' would create a cycle", update.id));
            }
            current = parents.get(id).copied().flatten();
            steps += 1;
        }
    }

    let stamp = now();
    for update in &batch.updates {
        if let Some(record) = job.find_mut(&update.id) {
            record.position = update.position.value();
            record.parent_id = update.parent_id.clone();
            record.lock_version += 1;
            record.updated_at = stamp.clone();
        }
    }
    Ok(())
}
