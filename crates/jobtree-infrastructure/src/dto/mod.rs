//! Persisted representations, kept separate from the domain types.

pub mod job;

pub use job::{JOB_FILE_SCHEMA_VERSION, JobFileDTO, TaskRecordDTO, TaskStatusDTO};
