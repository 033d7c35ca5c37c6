//! Editor configuration.

use crate::grid::GridSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default distance from a grid line within which an activity drop counts
/// as "on the border".
pub const DEFAULT_BORDER_THRESHOLD: f64 = 5.0;

/// Default event attachment radius, in cells.
pub const DEFAULT_ATTACH_THRESHOLD_CELLS: f64 = 1.0;

/// Span of an activity dragged without modifiers.
pub const DEFAULT_BASE_SPAN: u32 = 2;

/// Span of an activity dragged with shift held.
pub const DEFAULT_ALTERNATE_SPAN: u32 = 4;

/// Storage key the editor saves to and loads from.
pub const DEFAULT_STORAGE_KEY: &str = "canvas";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cell size must be a positive number, got {0}")]
    InvalidCellSize(f64),
    #[error("Grid must have at least one row and column, got {rows}x{cols}")]
    EmptyGrid { rows: u32, cols: u32 },
    #[error("Border threshold must lie in [0, {max}], got {value}")]
    InvalidBorderThreshold { value: f64, max: f64 },
    #[error("Attachment threshold must be a positive number of cells, got {0}")]
    InvalidAttachThreshold(f64),
    #[error("Activity spans must be positive, got base {base} and alternate {alternate}")]
    InvalidSpan { base: u32, alternate: u32 },
    #[error("Storage key must not be empty")]
    EmptyStorageKey,
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Tunables for placement and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid: GridSpec,
    /// Max distance from a grid line for an activity drop.
    pub border_threshold: f64,
    /// Max distance from an attachment point for an event drop, in cells.
    pub attach_threshold_cells: f64,
    pub base_span: u32,
    pub alternate_span: u32,
    pub storage_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            border_threshold: DEFAULT_BORDER_THRESHOLD,
            attach_threshold_cells: DEFAULT_ATTACH_THRESHOLD_CELLS,
            base_span: DEFAULT_BASE_SPAN,
            alternate_span: DEFAULT_ALTERNATE_SPAN,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl EditorConfig {
    /// Default configuration on a custom grid.
    pub fn with_grid(grid: GridSpec) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    /// Event attachment radius in world units.
    pub fn attach_threshold(&self) -> f64 {
        self.attach_threshold_cells * self.grid.cell_size()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;

        let max = self.grid.cell_size() / 2.0;
        if !(0.0..=max).contains(&self.border_threshold) {
            return Err(ConfigError::InvalidBorderThreshold {
                value: self.border_threshold,
                max,
            });
        }
        if !self.attach_threshold_cells.is_finite() || self.attach_threshold_cells <= 0.0 {
            return Err(ConfigError::InvalidAttachThreshold(self.attach_threshold_cells));
        }
        if self.base_span == 0 || self.alternate_span == 0 {
            return Err(ConfigError::InvalidSpan {
                base: self.base_span,
                alternate: self.alternate_span,
            });
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
