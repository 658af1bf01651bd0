// WHY: Spreadsheet-like coordinate system over a store that only addresses rows relative to its cursor
// Offsets are cursor-relative, indexes are absolute and 1-based; the two only agree while the cursor stays put

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CursorMode, TabularConfig};
use crate::discovery::{discover_last_valid_index, discover_span, Span};
use crate::error::{Dimension, ProbeError, Result};
use crate::pattern::Pattern;
use crate::store::TabularStore;

pub const START_COLUMN_INDEX: i64 = 1;
pub const START_ROW_INDEX: i64 = 1;

/// A cell whose value matched a search pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub content: String,
    pub column_id: String,
    pub column_index: i64,
    /// Row position relative to the cursor at search time
    pub row_offset: i64,
    /// Absolute 1-based row index
    pub row_index: i64,
}

/// Column and row extent of a tabular store, discovered once at construction
#[derive(Debug)]
pub struct Tabular<S> {
    store: S,
    config: TabularConfig,
    columns: Span,
    rows: Span,
}

impl<S: TabularStore> Tabular<S> {
    /// Discover columns and rows with the default configuration
    ///
    /// # Errors
    /// See [`Tabular::with_config`].
    pub fn new(store: S) -> Result<Self> {
        Self::with_config(store, TabularConfig::default())
    }

    /// Discover columns, then rows, of `store`
    ///
    /// # Errors
    /// `InvalidArgument` for an unusable configuration, `RangeExceeded` when a
    /// dimension runs into its cap, `Store` for store faults during row probing.
    pub fn with_config(store: S, config: TabularConfig) -> Result<Self> {
        if config.base_name.is_empty() {
            return Err(ProbeError::InvalidArgument("column base name is empty".into()));
        }
        if config.search_depth < 0 {
            return Err(ProbeError::InvalidArgument(format!(
                "search depth must not be negative, got {}",
                config.search_depth
            )));
        }

        let mut tabular = Self {
            store,
            config,
            columns: Span::empty_at(START_COLUMN_INDEX),
            rows: Span::empty_at(START_ROW_INDEX),
        };

        tabular.columns = discover_span(
            |i| Ok(tabular.store.field_exists(&tabular.column_id(i))),
            START_COLUMN_INDEX,
            tabular.config.column_discovery(),
            Dimension::Columns,
        )?;

        if !tabular.columns.is_empty() {
            let cursor = tabular.cursor_index()?;
            tabular.rows = discover_span(
                |i| tabular.row_exists_at_offset(i - cursor),
                START_ROW_INDEX,
                tabular.config.row_discovery(),
                Dimension::Rows,
            )?;
        }

        info!(
            base_name = %tabular.config.base_name,
            columns = tabular.columns.len(),
            rows = tabular.rows.len(),
            "Tabular extent discovered"
        );
        Ok(tabular)
    }

    pub fn columns(&self) -> Span {
        self.columns
    }

    pub fn rows(&self) -> Span {
        self.rows
    }

    pub fn config(&self) -> &TabularConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access for moving the host cursor between searches
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn column_id(&self, index: i64) -> String {
        format!("{}{}", self.config.base_name, index)
    }

    /// Name of the first column, `None` when the store has no columns
    pub fn first_column_id(&self) -> Option<String> {
        (!self.columns.is_empty()).then(|| self.column_id(self.columns.start))
    }

    /// Name of the last column, `None` when the store has no columns
    pub fn last_column_id(&self) -> Option<String> {
        (!self.columns.is_empty()).then(|| self.column_id(self.columns.end))
    }

    /// Absolute row index of the store's cursor
    ///
    /// # Errors
    /// Only in `CursorMode::Probed`, when the backward probe fails.
    pub fn cursor_index(&self) -> Result<i64> {
        match self.config.cursor_mode {
            CursorMode::Reported => Ok(self.store.current_position()),
            CursorMode::Probed => self.probe_cursor_index(),
        }
    }

    /// # Errors
    /// See [`Tabular::cursor_index`].
    pub fn offset_to_index(&self, offset: i64) -> Result<i64> {
        Ok(self.cursor_index()?.saturating_add(offset))
    }

    /// Signed distance from the cursor to `index`; negative when `index` is behind it
    ///
    /// # Errors
    /// See [`Tabular::cursor_index`].
    pub fn index_to_offset(&self, index: i64) -> Result<i64> {
        Ok(index.saturating_sub(self.cursor_index()?))
    }

    /// Clamp a row offset into the discovered rows
    ///
    /// # Errors
    /// See [`Tabular::cursor_index`].
    pub fn restrict_offset(&self, offset: i64) -> Result<i64> {
        let cursor = self.cursor_index()?;
        Ok(self.clamp_offset(offset, cursor))
    }

    pub fn restrict_row_index(&self, index: i64) -> i64 {
        self.rows.clamp(index)
    }

    /// # Errors
    /// See [`Tabular::cursor_index`].
    pub fn is_row_offset_within_bounds(&self, offset: i64) -> Result<bool> {
        let cursor = self.cursor_index()?;
        Ok(self.rows.contains(cursor.saturating_add(offset)))
    }

    /// First cell matching `pattern`, scanning rows `start..=stop` (cursor-relative) then columns
    ///
    /// `start` defaults to the cursor row and `stop` to `start + search_depth`;
    /// both are clamped to the discovered rows. A miss is `Ok(None)`.
    ///
    /// # Errors
    /// `Store` when an extraction fails, `OutOfBounds` if clamping was bypassed.
    pub fn find_cell(
        &self,
        pattern: &Pattern,
        start_offset: Option<i64>,
        stop_offset: Option<i64>,
    ) -> Result<Option<Cell>> {
        if self.rows.is_empty() || self.columns.is_empty() {
            debug!(%pattern, "Empty extent, nothing to search");
            return Ok(None);
        }

        let start = start_offset.unwrap_or(0);
        let stop = stop_offset.unwrap_or(start.saturating_add(self.config.search_depth));

        let cursor = self.cursor_index()?;
        let start = self.clamp_offset(start, cursor);
        let stop = self.clamp_offset(stop, cursor);

        for offset in start..=stop {
            if let Some(cell) = self.find_cell_at(pattern, offset, cursor)? {
                debug!(%pattern, column = %cell.column_id, row_index = cell.row_index, "Cell found");
                return Ok(Some(cell));
            }
        }

        debug!(%pattern, start, stop, "Pattern not found");
        Ok(None)
    }

    /// Values of every column at one row offset, clamped into the discovered rows
    ///
    /// # Errors
    /// `Store` when an extraction fails.
    pub fn row_at_offset(&self, offset: Option<i64>, exclude_blank: bool) -> Result<Vec<String>> {
        if self.rows.is_empty() || self.columns.is_empty() {
            return Ok(Vec::new());
        }

        let offset = self.restrict_offset(offset.unwrap_or(0))?;
        let mut row = Vec::new();
        for column in self.columns.start..=self.columns.end {
            let value = self.store.extract_field(&self.column_id(column), offset)?;
            if exclude_blank && value.is_empty() {
                continue;
            }
            row.push(value);
        }
        Ok(row)
    }

    fn clamp_offset(&self, offset: i64, cursor: i64) -> i64 {
        let lower = self.rows.start.saturating_sub(cursor);
        let upper = self.rows.end.saturating_sub(cursor).max(lower);
        offset.clamp(lower, upper)
    }

    fn find_cell_at(&self, pattern: &Pattern, offset: i64, cursor: i64) -> Result<Option<Cell>> {
        let row_index = cursor.saturating_add(offset);
        if !self.rows.contains(row_index) {
            return Err(ProbeError::OutOfBounds {
                offset,
                span: self.rows,
            });
        }

        for column_index in self.columns.start..=self.columns.end {
            let column_id = self.column_id(column_index);
            let content = self.store.extract_field(&column_id, offset)?;
            if pattern.is_match(&content) {
                return Ok(Some(Cell {
                    content,
                    column_id,
                    column_index,
                    row_offset: offset,
                    row_index,
                }));
            }
        }
        Ok(None)
    }

    /// Extraction in the first column succeeds; only `OutOfRange` counts as absence
    fn row_exists_at_offset(&self, offset: i64) -> Result<bool> {
        if self.columns.is_empty() {
            return Ok(false);
        }
        match self.store.extract_field(&self.column_id(self.columns.start), offset) {
            Ok(_) => Ok(true),
            Err(e) if e.is_out_of_range() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn probe_cursor_index(&self) -> Result<i64> {
        let behind = discover_last_valid_index(
            |k| self.row_exists_at_offset(-k),
            0,
            self.config.row_discovery(),
            Dimension::RowsBehindCursor,
        )?;
        Ok(START_ROW_INDEX + behind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryGrid;

    fn grid(columns: usize, rows: usize) -> MemoryGrid {
        let rows = (1..=rows)
            .map(|r| (1..=columns).map(|c| format!("r{r}c{c}")).collect())
            .collect();
        MemoryGrid::new("COLUMN", rows)
    }

    #[test]
    fn test_discovers_thirty_seven_columns() {
        let tabular = Tabular::new(grid(37, 3)).unwrap();
        assert_eq!(tabular.columns(), Span::new(1, 37));
        assert_eq!(tabular.rows(), Span::new(1, 3));
        assert_eq!(tabular.first_column_id().as_deref(), Some("COLUMN1"));
        assert_eq!(tabular.last_column_id().as_deref(), Some("COLUMN37"));
        assert_eq!(tabular.column_id(12), "COLUMN12");
    }

    #[test]
    fn test_row_discovery_is_independent_of_cursor() {
        for cursor in [1, 250, 1234] {
            let tabular = Tabular::new(grid(2, 1234).with_cursor(cursor)).unwrap();
            assert_eq!(tabular.rows(), Span::new(1, 1234), "cursor={cursor}");
        }
    }

    #[test]
    fn test_find_cell_scenario() {
        let mut g = grid(5, 11);
        g.rows[7][2] = "a FOO bar".into();
        let tabular = Tabular::new(g).unwrap();
        let pattern = Pattern::case_insensitive("foo").unwrap();

        let cell = tabular.find_cell(&pattern, Some(0), Some(10)).unwrap().unwrap();
        assert_eq!(
            cell,
            Cell {
                content: "a FOO bar".into(),
                column_id: "COLUMN3".into(),
                column_index: 3,
                row_offset: 7,
                row_index: 8,
            }
        );
    }

    #[test]
    fn test_find_cell_miss_is_none() {
        let tabular = Tabular::new(grid(5, 11)).unwrap();
        let pattern = Pattern::new("absent").unwrap();
        assert_eq!(tabular.find_cell(&pattern, None, None).unwrap(), None);
    }

    #[test]
    fn test_find_cell_clamps_offsets_behind_cursor() {
        let mut g = grid(3, 20).with_cursor(10);
        g.rows[1][0] = "needle".into();
        let tabular = Tabular::new(g).unwrap();
        let pattern = Pattern::new("needle").unwrap();

        let cell = tabular.find_cell(&pattern, Some(-500), Some(0)).unwrap().unwrap();
        assert_eq!(cell.row_index, 2);
        assert_eq!(cell.row_offset, -8);
        assert_eq!(cell.column_index, 1);
    }

    #[test]
    fn test_signed_offset_conversion_round_trips() {
        let tabular = Tabular::new(grid(2, 50).with_cursor(20)).unwrap();
        assert_eq!(tabular.index_to_offset(5).unwrap(), -15);
        assert_eq!(tabular.index_to_offset(30).unwrap(), 10);
        for index in 1..=50 {
            let offset = tabular.index_to_offset(index).unwrap();
            assert_eq!(tabular.offset_to_index(offset).unwrap(), index);
        }
        assert_eq!(tabular.restrict_offset(-100).unwrap(), -19);
        assert_eq!(tabular.restrict_offset(100).unwrap(), 30);
        assert_eq!(tabular.restrict_row_index(0), 1);
        assert!(tabular.is_row_offset_within_bounds(30).unwrap());
        assert!(!tabular.is_row_offset_within_bounds(31).unwrap());
    }

    #[test]
    fn test_extreme_offsets_saturate_and_clamp() {
        let mut g = grid(3, 30).with_cursor(10);
        g.rows[29][2] = "last".into();
        g.rows[0][0] = "first".into();
        let tabular = Tabular::new(g).unwrap();

        let last = Pattern::new("last").unwrap();
        let cell = tabular.find_cell(&last, Some(i64::MAX), None).unwrap().unwrap();
        assert_eq!((cell.row_index, cell.row_offset), (30, 20));

        let first = Pattern::new("first").unwrap();
        let cell = tabular.find_cell(&first, Some(i64::MIN), Some(i64::MIN)).unwrap().unwrap();
        assert_eq!((cell.row_index, cell.row_offset), (1, -9));

        assert!(!tabular.is_row_offset_within_bounds(i64::MAX).unwrap());
        assert!(!tabular.is_row_offset_within_bounds(i64::MIN).unwrap());
        assert_eq!(tabular.offset_to_index(i64::MAX).unwrap(), i64::MAX);
        assert_eq!(tabular.index_to_offset(i64::MIN).unwrap(), i64::MIN);
        assert_eq!(tabular.restrict_offset(i64::MAX).unwrap(), 20);
    }

    #[test]
    fn test_cursor_moves_change_offsets() {
        let mut g = grid(2, 10);
        g.rows[4][1] = "target".into();
        let mut tabular = Tabular::new(g).unwrap();
        let pattern = Pattern::new("target").unwrap();

        let before = tabular.find_cell(&pattern, None, None).unwrap().unwrap();
        tabular.store_mut().set_cursor(4);
        let after = tabular.find_cell(&pattern, None, None).unwrap().unwrap();

        assert_eq!(before.row_index, after.row_index);
        assert_eq!(before.row_offset, 4);
        assert_eq!(after.row_offset, 1);
    }

    #[test]
    fn test_empty_grid_reports_miss_without_probing_rows() {
        let tabular = Tabular::new(MemoryGrid::new("COLUMN", Vec::new())).unwrap();
        assert!(tabular.columns().is_empty());
        assert!(tabular.rows().is_empty());
        assert_eq!(tabular.first_column_id(), None);
        let pattern = Pattern::new(".*").unwrap();
        assert_eq!(tabular.find_cell(&pattern, None, None).unwrap(), None);
        assert!(tabular.row_at_offset(None, false).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_base_name_finds_no_columns() {
        let config = TabularConfig::with_base_name("FIELD");
        let tabular = Tabular::with_config(grid(4, 4), config).unwrap();
        assert!(tabular.columns().is_empty());
    }

    #[test]
    fn test_column_cap_aborts_construction() {
        let err = Tabular::new(grid(1200, 1)).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::RangeExceeded {
                dimension: Dimension::Columns,
                ..
            }
        ));
    }

    #[test]
    fn test_row_at_offset_skips_blanks() {
        let g = MemoryGrid::new(
            "COLUMN",
            vec![vec!["a".into(), String::new(), "c".into()]],
        );
        let tabular = Tabular::new(g).unwrap();
        assert_eq!(tabular.row_at_offset(None, true).unwrap(), vec!["a", "c"]);
        assert_eq!(tabular.row_at_offset(Some(7), false).unwrap(), vec!["a", "", "c"]);
    }

    #[test]
    fn test_accepts_borrowed_store() {
        let mut g = grid(3, 5);
        {
            let tabular = Tabular::new(&mut g).unwrap();
            assert_eq!(tabular.rows(), Span::new(1, 5));
        }
        g.set_cursor(3);
        assert_eq!(g.current_position(), 3);
    }

    /// Grid whose reported position is stale
    struct StaleCursor(MemoryGrid);

    impl TabularStore for StaleCursor {
        fn field_exists(&self, name: &str) -> bool {
            self.0.field_exists(name)
        }

        fn extract_field(&self, name: &str, row_offset: i64) -> std::result::Result<String, StoreError> {
            self.0.extract_field(name, row_offset)
        }

        fn current_position(&self) -> i64 {
            1
        }
    }

    #[test]
    fn test_probed_cursor_mode_counts_rows_behind() {
        let config = TabularConfig {
            cursor_mode: CursorMode::Probed,
            ..TabularConfig::default()
        };
        let tabular = Tabular::with_config(StaleCursor(grid(2, 40).with_cursor(17)), config).unwrap();
        assert_eq!(tabular.cursor_index().unwrap(), 17);
        assert_eq!(tabular.rows(), Span::new(1, 40));
        assert_eq!(tabular.offset_to_index(3).unwrap(), 20);
    }

    /// Grid that fails with a non-range fault beyond row 5
    #[derive(Debug)]
    struct FlakyGrid(MemoryGrid);

    impl TabularStore for FlakyGrid {
        fn field_exists(&self, name: &str) -> bool {
            self.0.field_exists(name)
        }

        fn extract_field(&self, name: &str, row_offset: i64) -> std::result::Result<String, StoreError> {
            if self.0.cursor + row_offset > 5 {
                return Err(StoreError::Fault("record locked".into()));
            }
            self.0.extract_field(name, row_offset)
        }

        fn current_position(&self) -> i64 {
            self.0.current_position()
        }
    }

    #[test]
    fn test_row_probe_propagates_store_faults() {
        let err = Tabular::new(FlakyGrid(grid(2, 50))).unwrap_err();
        assert!(matches!(err, ProbeError::Store(StoreError::Fault(_))));
    }
}
