//! Capability checks.
//!
//! Permission storage lives outside the engine; the engine only asks a
//! [`CapabilityProvider`] yes/no questions before a structural mutation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CapabilityConfig;
use crate::error::{JobtreeError, Result};

/// A structural operation the engine may be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Creating new tasks.
    Create,
    /// Reordering, nesting and re-parenting existing tasks.
    Edit,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Create => write!(f, "create"),
            Capability::Edit => write!(f, "edit"),
        }
    }
}

/// Boolean capability flags supplied by the host application.
pub trait CapabilityProvider: Send + Sync {
    fn allows(&self, capability: Capability) -> bool;

    /// Fails with `NotPermitted` when `capability` is not granted.
    fn require(&self, capability: Capability) -> Result<()> {
        if self.allows(capability) {
            Ok(())
        } else {
            tracing::debug!("[Capabilities] refused: {}", capability);
            Err(JobtreeError::NotPermitted { capability })
        }
    }
}

/// Fixed flags, typically read from the `[capabilities]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticCapabilities {
    pub can_create: bool,
    pub can_edit: bool,
}

impl StaticCapabilities {
    pub fn allow_all() -> Self {
        Self {
            can_create: true,
            can_edit: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            can_create: false,
            can_edit: false,
        }
    }
}

impl From<&CapabilityConfig> for StaticCapabilities {
    fn from(config: &CapabilityConfig) -> Self {
        Self {
            can_create: config.can_create,
            can_edit: config.can_edit,
        }
    }
}

impl CapabilityProvider for StaticCapabilities {
    fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Create => self.can_create,
            Capability::Edit => self.can_edit,
        }
    }
}
