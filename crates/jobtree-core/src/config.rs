use serde::{Deserialize, Serialize};

use crate::error::{JobtreeError, Result};

/// Spacing between neighbouring keys after a renumbering pass or an append.
pub const DEFAULT_GAP: i64 = 1000;
/// Key handed to the first task of an empty sibling list.
pub const DEFAULT_POSITION: i64 = 1_000_000;
/// Lowest key the allocator will hand out.
pub const DEFAULT_MIN_POSITION: i64 = 0;

/// Root of `config.toml`.
///
/// ```toml
/// [positioning]
/// gap = 1000
///
/// [moves]
/// strict_anchors = false
///
/// [capabilities]
/// can_edit = true
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigRoot {
    #[serde(default)]
    pub positioning: PositioningConfig,
    #[serde(default)]
    pub moves: MoveConfig,
    #[serde(default)]
    pub capabilities: CapabilityConfig,
}

impl ConfigRoot {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ConfigRoot = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.positioning.validate()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositioningConfig {
    #[serde(default = "default_gap")]
    pub gap: i64,
    #[serde(default = "default_position")]
    pub default_position: i64,
    #[serde(default = "default_min_position")]
    pub min_position: i64,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            default_position: DEFAULT_POSITION,
            min_position: DEFAULT_MIN_POSITION,
        }
    }
}

impl PositioningConfig {
    pub fn validate(&self) -> Result<()> {
        if self.gap <= 0 {
            return Err(JobtreeError::Config(format!(
                "positioning.gap must be positive, got {}",
                self.gap
            )));
        }
        if self.default_position <= self.min_position {
            return Err(JobtreeError::Config(format!(
                "positioning.default_position ({}) must be above min_position ({})",
                self.default_position, self.min_position
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveConfig {
    /// Fail a compile instead of appending at the end when an anchor is missing.
    #[serde(default)]
    pub strict_anchors: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityConfig {
    #[serde(default = "default_true")]
    pub can_create: bool,
    #[serde(default = "default_true")]
    pub can_edit: bool,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            can_create: true,
            can_edit: true,
        }
    }
}

fn default_gap() -> i64 {
    DEFAULT_GAP
}

fn default_position() -> i64 {
    DEFAULT_POSITION
}

fn default_min_position() -> i64 {
    DEFAULT_MIN_POSITION
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConfigRoot::from_toml_str("").unwrap();
        assert_eq!(config, ConfigRoot::default());
        assert_eq!(config.positioning.gap, DEFAULT_GAP);
        assert!(config.capabilities.can_edit);
        assert!(!config.moves.strict_anchors);
    }

    #[test]
    fn test_partial_sections() {
        let config = ConfigRoot::from_toml_str(
            r#"
            [positioning]
            gap = 64

            [capabilities]
            can_create = false
            "#,
        )
        .unwrap();
        assert_eq!(config.positioning.gap, 64);
        assert_eq!(config.positioning.default_position, DEFAULT_POSITION);
        assert!(!config.capabilities.can_create);
        assert!(config.capabilities.can_edit);
    }

    #[test]
    fn test_rejects_non_positive_gap() {
        let err = ConfigRoot::from_toml_str("[positioning]\ngap = 0\n").unwrap_err();
        assert!(matches!(err, JobtreeError::Config(_)));
    }
}
