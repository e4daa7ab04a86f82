pub mod config_service;
pub mod dto;
pub mod paths;
pub mod storage;
pub mod toml_task_repository;

pub use crate::config_service::ConfigService;
pub use crate::paths::JobtreePaths;
pub use crate::toml_task_repository::TomlTaskRepository;
