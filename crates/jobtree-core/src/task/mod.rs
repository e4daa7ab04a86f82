//! Task domain module.
//!
//! # Module Structure
//!
//! - `model`: `Task`, `TaskStatus` and the `Position` order key
//! - `repository`: `TaskRepository` trait for persistence

mod model;
pub mod repository;

// Re-export public API
pub use model::{Position, Task, TaskId, TaskStatus};

pub use repository::TaskRepository;
