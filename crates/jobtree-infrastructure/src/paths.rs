//! Path management for jobtree configuration and job files.
//!
//! ```text
//! ~/.config/jobtree/           # Config directory
//! └── config.toml              # Engine configuration
//!
//! ~/.local/share/jobtree/      # Data directory (or --data-dir)
//! └── jobs/
//!     ├── <job_id>.toml        # All tasks of one job
//!     └── ...
//! ```

use std::path::{Path, PathBuf};

use jobtree_core::JobtreeError;
use thiserror::Error;

const APP_NAME: &str = "jobtree";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Home directory could not be determined.
    #[error("Cannot find home directory")]
    HomeDirNotFound,
    /// Job id cannot be used as a file name.
    #[error("Invalid job id '{0}'")]
    InvalidJobId(String),
}

impl From<PathError> for JobtreeError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::HomeDirNotFound => JobtreeError::Config(err.to_string()),
            PathError::InvalidJobId(_) => JobtreeError::DataAccess(err.to_string()),
        }
    }
}

/// Resolves where job files live.
#[derive(Debug, Clone)]
pub struct JobtreePaths {
    base_dir: PathBuf,
}

impl JobtreePaths {
    /// Uses `base_dir` when given (tests, `--data-dir`), the platform data
    /// directory otherwise.
    pub fn new(base_dir: Option<&Path>) -> Result<Self, PathError> {
        let base_dir = match base_dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::default_data_dir()?,
        };
        Ok(Self { base_dir })
    }

    pub fn default_data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME).join("config.toml"))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.base_dir.join("jobs")
    }

    /// Returns the file holding every task of `job_id`.
    pub fn job_file(&self, job_id: &str) -> Result<PathBuf, PathError> {
        let safe = !job_id.is_empty()
            && job_id != "."
            && job_id != ".."
            && !job_id.contains(['/', '\\']);
        if !safe {
            return Err(PathError::InvalidJobId(job_id.to_string()));
        }
        Ok(self.jobs_dir().join(format!("{}.toml", job_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_file_layout() {
        let paths = JobtreePaths::new(Some(Path::new("/tmp/jt"))).unwrap();
        assert_eq!(
            paths.job_file("job-1").unwrap(),
            PathBuf::from("/tmp/jt/jobs/job-1.toml")
        );
    }

    #[test]
    fn test_job_id_must_be_a_plain_name() {
        let paths = JobtreePaths::new(Some(Path::new("/tmp/jt"))).unwrap();
        for bad in ["", "..", "a/b", "a\\b"] {
            assert!(matches!(paths.job_file(bad), Err(PathError::InvalidJobId(_))));
        }
    }
}
