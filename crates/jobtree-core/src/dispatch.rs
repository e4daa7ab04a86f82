//! Hands compiled position batches to the persistence boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{JobtreeError, Result};
use crate::moves::{PositionBatch, PositionUpdate};

/// Applies a batch of position updates atomically.
///
/// Implementations either apply every record or none of them. A rejection
/// (stale `lock_version`, missing parent, cycle) is reported as an error and
/// leaves stored data unchanged.
#[async_trait]
pub trait PositionWriter: Send + Sync {
    async fn write_positions(&self, batch: &PositionBatch) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The writer accepted `count` records.
    Applied { count: usize },
    /// Nothing to write; the writer was not called.
    Empty,
}

/// Sends one gesture's updates to the writer as a single batch.
#[derive(Clone)]
pub struct MutationDispatcher {
    writer: Arc<dyn PositionWriter>,
}

impl MutationDispatcher {
    pub fn new(writer: Arc<dyn PositionWriter>) -> Self {
        Self { writer }
    }

    /// Submits `updates` for `job_id`.
    ///
    /// No retry is attempted; a writer failure surfaces as
    /// [`JobtreeError::DispatchRejected`] and the caller is expected to
    /// reload the snapshot.
    pub async fn submit(&self, job_id: &str, updates: Vec<PositionUpdate>) -> Result<DispatchOutcome> {
        if updates.is_empty() {
            tracing::debug!("[MutationDispatcher] empty batch for job {}, skipping", job_id);
            return Ok(DispatchOutcome::Empty);
        }

        let batch = PositionBatch {
            job_id: job_id.to_string(),
            updates,
        };
        let count = batch.len();
        tracing::debug!("[MutationDispatcher] submitting {} updates for job {}", count, job_id);

        self.writer.write_positions(&batch).await.map_err(|e| {
            tracing::warn!("[MutationDispatcher] batch for job {} rejected: {}", job_id, e);
            match e {
                JobtreeError::DispatchRejected(_) => e,
                other => JobtreeError::DispatchRejected(other.to_string()),
            }
        })?;

        tracing::info!("[MutationDispatcher] applied {} updates for job {}", count, job_id);
        Ok(DispatchOutcome::Applied { count })
    }
}
