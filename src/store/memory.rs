// WHY: In-memory stores with the same probing semantics as a host data source
// Used by the CLI fixtures, the integration tests and the benches

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{MoveUnit, PagedStore, Strip, TabularStore};
use crate::error::StoreError;

fn default_base_name() -> String {
    crate::config::DEFAULT_BASE_NAME.to_string()
}

fn first_row() -> i64 {
    1
}

/// Grid of string cells; column `k` is named `{base_name}{k}`, rows are 1-based
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryGrid {
    #[serde(default = "default_base_name")]
    pub base_name: String,
    pub rows: Vec<Vec<String>>,
    /// Row index of the cursor
    #[serde(default = "first_row")]
    pub cursor: i64,
}

impl MemoryGrid {
    pub fn new(base_name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            base_name: base_name.into(),
            rows,
            cursor: 1,
        }
    }

    /// Builder-style cursor placement
    #[must_use]
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn set_cursor(&mut self, cursor: i64) {
        self.cursor = cursor;
    }

    /// Load a grid fixture from a JSON file
    ///
    /// # Errors
    /// Fails when the file cannot be read or is not a grid document.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grid fixture {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid grid fixture {}", path.display()))
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        let index: usize = name.strip_prefix(self.base_name.as_str())?.parse().ok()?;
        (index >= 1 && index <= self.column_count()).then_some(index)
    }
}

impl TabularStore for MemoryGrid {
    fn field_exists(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn extract_field(&self, name: &str, row_offset: i64) -> Result<String, StoreError> {
        let column = self
            .column_index(name)
            .ok_or_else(|| StoreError::Fault(format!("unknown field {name}")))?;

        let row_index = self.cursor + row_offset;
        let row = usize::try_from(row_index - 1)
            .ok()
            .and_then(|i| self.rows.get(i))
            .ok_or_else(|| StoreError::OutOfRange(format!("{name} at row {row_index}")))?;

        Ok(row.get(column - 1).cloned().unwrap_or_default())
    }

    fn current_position(&self) -> i64 {
        self.cursor
    }
}

/// One page of a [`MemoryDocument`]; every line is one unit of height
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryPage {
    pub width: f64,
    pub lines: Vec<String>,
}

impl MemoryPage {
    pub fn new(width: f64, lines: Vec<String>) -> Self {
        Self { width, lines }
    }

    fn height(&self) -> i64 {
        i64::try_from(self.lines.len()).unwrap_or(i64::MAX)
    }
}

/// Paginated text where horizontal positions are character columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub pages: Vec<MemoryPage>,
    #[serde(default = "first_row")]
    page: i64,
    #[serde(default)]
    position: i64,
    #[serde(skip)]
    moves: usize,
}

impl MemoryDocument {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self {
            pages,
            page: 1,
            position: 0,
            moves: 0,
        }
    }

    /// Load a document fixture from a JSON file
    ///
    /// # Errors
    /// Fails when the file cannot be read or is not a document.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document fixture {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid document fixture {}", path.display()))
    }

    /// Number of cursor moves issued so far
    pub fn move_count(&self) -> usize {
        self.moves
    }

    fn current(&self) -> Option<&MemoryPage> {
        usize::try_from(self.page - 1).ok().and_then(|i| self.pages.get(i))
    }

    fn page_count(&self) -> i64 {
        i64::try_from(self.pages.len()).unwrap_or(i64::MAX)
    }
}

impl PagedStore for MemoryDocument {
    fn current_position(&self) -> i64 {
        self.position
    }

    fn current_page(&self) -> i64 {
        self.page
    }

    fn current_page_height(&self) -> i64 {
        self.current().map_or(0, MemoryPage::height)
    }

    fn current_page_width(&self) -> f64 {
        self.current().map_or(0.0, |p| p.width)
    }

    fn total_pages(&self) -> i64 {
        self.page_count()
    }

    fn move_to(&mut self, unit: MoveUnit, value: i64) {
        self.moves += 1;
        if self.pages.is_empty() {
            return;
        }

        match unit {
            MoveUnit::Page => {
                self.page = value.clamp(1, self.page_count());
                self.position = 0;
            }
            MoveUnit::RecordIndex => {
                let mut remaining = value.max(0);
                for (i, page) in self.pages.iter().enumerate() {
                    if remaining < page.height() {
                        self.page = i64::try_from(i).unwrap_or(i64::MAX) + 1;
                        self.position = remaining;
                        return;
                    }
                    remaining -= page.height();
                }
                self.page = self.page_count();
                self.position = self.current_page_height();
            }
        }
    }

    fn extract_strip(&self, strip: &Strip) -> Result<String, StoreError> {
        let page = self
            .current()
            .ok_or_else(|| StoreError::OutOfRange(format!("page {}", self.page)))?;

        let first_line = self.position + strip.offset;
        if first_line < 0 || first_line >= page.height() {
            return Err(StoreError::OutOfRange(format!(
                "line {first_line} on page {}",
                self.page
            )));
        }

        let skip = usize::try_from(strip.left.max(0)).unwrap_or(0);
        let take = usize::try_from(strip.right - strip.left.max(0)).unwrap_or(0);
        let first = usize::try_from(first_line).unwrap_or(0);
        let count = usize::try_from(strip.height.max(0)).unwrap_or(0);

        let text = page
            .lines
            .iter()
            .skip(first)
            .take(count)
            .map(|line| line.chars().skip(skip).take(take).collect::<String>())
            .collect::<Vec<_>>()
            .join(&strip.separator);
        Ok(text)
    }
}
