// WHY: Tunables for discovery and search, overridable from a JSON file or CLI flags

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::discovery::DiscoveryConfig;

pub const DEFAULT_BASE_NAME: &str = "COLUMN";
pub const MAX_COLUMN_SPAN: i64 = 1000;
pub const START_COLUMN_STEP: i64 = 100;
pub const MAX_ROW_SPAN: i64 = 60_000;
pub const START_ROW_STEP: i64 = 10_000;
pub const SEARCH_DEPTH: i64 = 100;

pub const DEFAULT_LINE_HEIGHT: i64 = 4;
pub const DEFAULT_MAX_OFFSET: i64 = 100;
pub const START_STRIP_STEP: i64 = 100;
pub const DEFAULT_LINE_SEPARATOR: &str = "<br />";

/// How a tabular system learns where the store's cursor is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMode {
    /// Trust `TabularStore::current_position`
    #[default]
    Reported,
    /// Count the rows behind the cursor with a backward discovery probe
    Probed,
}

/// Configuration for the spreadsheet-like coordinate system
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Column names are `{base_name}{index}`
    pub base_name: String,
    pub max_column_span: i64,
    pub column_step: i64,
    pub max_row_span: i64,
    pub row_step: i64,
    /// Rows scanned by `find_cell` when no stop offset is given
    pub search_depth: i64,
    pub cursor_mode: CursorMode,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            base_name: DEFAULT_BASE_NAME.to_string(),
            max_column_span: MAX_COLUMN_SPAN,
            column_step: START_COLUMN_STEP,
            max_row_span: MAX_ROW_SPAN,
            row_step: START_ROW_STEP,
            search_depth: SEARCH_DEPTH,
            cursor_mode: CursorMode::Reported,
        }
    }
}

impl TabularConfig {
    /// Default configuration with a custom column base name
    pub fn with_base_name(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            ..Self::default()
        }
    }

    pub fn column_discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig::new(self.column_step, self.max_column_span)
    }

    pub fn row_discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig::new(self.row_step, self.max_row_span)
    }
}

/// Configuration for text boundary localization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Lines covered by each extracted strip
    pub line_height: i64,
    /// Last vertical offset tried below the cursor
    pub max_offset: i64,
    /// First horizontal stride when narrowing an edge
    pub initial_step: i64,
    pub separator: String,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            line_height: DEFAULT_LINE_HEIGHT,
            max_offset: DEFAULT_MAX_OFFSET,
            initial_step: START_STRIP_STEP,
            separator: DEFAULT_LINE_SEPARATOR.to_string(),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub tabular: TabularConfig,
    pub boundary: BoundaryConfig,
}

impl ProbeConfig {
    /// Load from a JSON file; missing keys keep their defaults
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }
}
