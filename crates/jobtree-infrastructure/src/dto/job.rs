//! Job file DTOs.

use serde::{Deserialize, Serialize};

use jobtree_core::task::{Position, Task, TaskStatus};
use jobtree_core::{JobtreeError, Result};

/// Current layout of a job file.
pub const JOB_FILE_SCHEMA_VERSION: u32 = 1;

/// Task status as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatusDTO {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl From<TaskStatusDTO> for TaskStatus {
    fn from(dto: TaskStatusDTO) -> Self {
        match dto {
            TaskStatusDTO::Pending => TaskStatus::Pending,
            TaskStatusDTO::InProgress => TaskStatus::InProgress,
            TaskStatusDTO::Completed => TaskStatus::Completed,
            TaskStatusDTO::Cancelled => TaskStatus::Cancelled,
        }
    }
}

impl From<TaskStatus> for TaskStatusDTO {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => TaskStatusDTO::Pending,
            TaskStatus::InProgress => TaskStatusDTO::InProgress,
            TaskStatus::Completed => TaskStatusDTO::Completed,
            TaskStatus::Cancelled => TaskStatusDTO::Cancelled,
        }
    }
}

/// One `[[tasks]]` entry. The job id lives on the file, not the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecordDTO {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub position: i64,
    pub status: TaskStatusDTO,
    #[serde(default)]
    pub lock_version: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl TaskRecordDTO {
    pub fn into_domain(self, job_id: &str) -> Task {
        Task {
            id: self.id,
            job_id: job_id.to_string(),
            title: self.title,
            parent_id: self.parent_id,
            position: Position::new(self.position),
            status: self.status.into(),
            lock_version: self.lock_version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&Task> for TaskRecordDTO {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            parent_id: task.parent_id.clone(),
            position: task.position.value(),
            status: task.status.into(),
            lock_version: task.lock_version,
            created_at: task.created_at.clone(),
            updated_at: task.updated_at.clone(),
        }
    }
}

/// Contents of `jobs/<job_id>.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFileDTO {
    pub schema_version: u32,
    pub job_id: String,
    #[serde(default)]
    pub tasks: Vec<TaskRecordDTO>,
}

impl JobFileDTO {
    pub fn empty(job_id: &str) -> Self {
        Self {
            schema_version: JOB_FILE_SCHEMA_VERSION,
            job_id: job_id.to_string(),
            tasks: Vec::new(),
        }
    }

    /// Rejects files written by a newer layout than this build understands.
    pub fn check_version(&self) -> Result<()> {
        if self.schema_version > JOB_FILE_SCHEMA_VERSION {
            return Err(JobtreeError::Serialization {
                format: "TOML".to_string(),
                message: format!(
                    "job file for '{}' has schema version {}, newest supported is {}",
                    self.job_id, self.schema_version, JOB_FILE_SCHEMA_VERSION
                ),
            });
        }
        Ok(())
    }

    /// Rejects a file whose `job_id` field names a different job than the
    /// one it was loaded for.
    pub fn check_job_id(&self, expected: &str) -> Result<()> {
        if self.job_id != expected {
            return Err(JobtreeError::Serialization {
                format: "TOML".to_string(),
                message: format!("job file for '{}' belongs to job '{}'", expected, self.job_id),
            });
        }
        Ok(())
    }

    pub fn find(&self, task_id: &str) -> Option<&TaskRecordDTO> {
        self.tasks.iter().find(|record| record.id == task_id)
    }

    pub fn find_mut(&mut self, task_id: &str) -> Option<&mut TaskRecordDTO> {
        self.tasks.iter_mut().find(|record| record.id == task_id)
    }

    pub fn into_tasks(self) -> Vec<Task> {
        let job_id = self.job_id;
        self.tasks
            .into_iter()
            .map(|record| record.into_domain(&job_id))
            .collect()
    }
}
