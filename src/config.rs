//! Engine configuration
//!
//! Policy flags for how drops are interpreted, how order values are
//! rewritten, and when the rendered board follows a pending move.

use crate::error::{JobTrackError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// How a drop on a column's empty surface picks an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnDropPolicy {
    /// Always append to the end of the column
    #[default]
    Append,
    /// Use the sensor's nearest-index hint when one is supplied
    Proximity,
}

/// How order values are recomputed after a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReorderStrategy {
    /// Renumber affected columns 0, 1, 2, ... in display order
    #[default]
    Reindex,
    /// Give only the moved card a value between its new neighbours
    Fractional,
}

/// When the rendered board reflects a requested move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileStrategy {
    /// Show the move immediately, roll back if the service rejects it
    #[default]
    Optimistic,
    /// Keep showing the canonical board until the feed confirms the move
    AwaitConfirmation,
}

/// Configuration for the board reordering engine
///
/// # Examples
///
/// ```
/// use jobtrack_core::config::{ColumnDropPolicy, EngineConfig};
///
/// let config = EngineConfig::from_toml_str("column_drop = \"proximity\"").unwrap();
/// assert_eq!(config.column_drop, ColumnDropPolicy::Proximity);
/// assert_eq!(config.activation_distance, 8.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub column_drop: ColumnDropPolicy,
    pub reorder: ReorderStrategy,
    pub reconcile: ReconcileStrategy,
    /// Pointer travel (in pixels) before a press turns into a drag
    pub activation_distance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            column_drop: ColumnDropPolicy::Append,
            reorder: ReorderStrategy::Reindex,
            reconcile: ReconcileStrategy::Optimistic,
            activation_distance: 8.0,
        }
    }
}

impl EngineConfig {
    /// Settings that avoid visible flicker when a move is rejected
    pub fn strict() -> Self {
        Self {
            column_drop: ColumnDropPolicy::Proximity,
            reconcile: ReconcileStrategy::AwaitConfirmation,
            ..Self::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| JobTrackError::ConfigError(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| JobTrackError::ConfigError(e.to_string()))
    }

    fn check(&self) -> Result<()> {
        if !self.activation_distance.is_finite() || self.activation_distance < 0.0 {
            return Err(JobTrackError::ConfigError(format!(
                "activation_distance must be a non-negative number, got {}",
                self.activation_distance
            )));
        }
        Ok(())
    }
}
