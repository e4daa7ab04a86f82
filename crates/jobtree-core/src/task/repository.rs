//! Task repository trait.
//!
//! Defines the interface for task persistence operations.

use super::model::Task;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for task records.
///
/// The engine reads canonical snapshots through this trait; it never keeps
/// authoritative state of its own. Position changes are written through
/// [`crate::dispatch::PositionWriter`] instead of `save`, so that a whole
/// gesture lands as one batch.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Finds a task by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Task))`: Task found
    /// - `Ok(None)`: Task not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, job_id: &str, task_id: &str) -> Result<Option<Task>>;

    /// Lists every task of a job, in no particular order.
    async fn list_by_job(&self, job_id: &str) -> Result<Vec<Task>>;

    /// Inserts or replaces a task.
    async fn save(&self, task: &Task) -> Result<()>;

    /// Deletes a task (no-op if it doesn't exist).
    async fn delete(&self, job_id: &str, task_id: &str) -> Result<()>;
}
