// WHY: Narrow capability traits over the host data source
// Coordinate systems own a store handle; `&mut S` also implements the traits so callers can lend one

use crate::error::StoreError;

pub mod memory;

pub use memory::{MemoryDocument, MemoryGrid, MemoryPage};

/// Unit of a paginated cursor move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveUnit {
    /// Jump to the top of a 1-based page
    Page,
    /// Jump to a linear record index across all pages
    RecordIndex,
}

/// Horizontal text strip relative to the current cursor position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strip {
    /// Left edge, inclusive
    pub left: i64,
    /// Right edge, exclusive
    pub right: i64,
    /// Vertical offset below the cursor, in lines
    pub offset: i64,
    /// Number of lines covered
    pub height: i64,
    /// Joins the covered lines in the extracted text
    pub separator: String,
}

/// Spreadsheet-like source addressed by column name and cursor-relative row offset
pub trait TabularStore {
    /// Whether a column with this exact name exists
    fn field_exists(&self, name: &str) -> bool;

    /// Value of `name` in the row `row_offset` rows away from the cursor
    ///
    /// # Errors
    /// `StoreError::OutOfRange` when the row does not exist.
    fn extract_field(&self, name: &str, row_offset: i64) -> Result<String, StoreError>;

    /// Row index of the cursor as reported by the host
    fn current_position(&self) -> i64;
}

/// Paginated text source with a page/line cursor
pub trait PagedStore {
    /// Line position of the cursor within the current page
    fn current_position(&self) -> i64;

    /// 1-based number of the page under the cursor
    fn current_page(&self) -> i64;

    /// Addressable line count of the current page
    fn current_page_height(&self) -> i64;

    /// Horizontal extent of the current page
    fn current_page_width(&self) -> f64;

    fn total_pages(&self) -> i64;

    /// Move the shared cursor
    fn move_to(&mut self, unit: MoveUnit, value: i64);

    /// Text inside `strip`, lines joined by `strip.separator`
    ///
    /// # Errors
    /// `StoreError::OutOfRange` when the strip starts below the last line of the page.
    fn extract_strip(&self, strip: &Strip) -> Result<String, StoreError>;
}

impl<S: TabularStore + ?Sized> TabularStore for &mut S {
    fn field_exists(&self, name: &str) -> bool {
        (**self).field_exists(name)
    }

    fn extract_field(&self, name: &str, row_offset: i64) -> Result<String, StoreError> {
        (**self).extract_field(name, row_offset)
    }

    fn current_position(&self) -> i64 {
        (**self).current_position()
    }
}

impl<S: PagedStore + ?Sized> PagedStore for &mut S {
    fn current_position(&self) -> i64 {
        (**self).current_position()
    }

    fn current_page(&self) -> i64 {
        (**self).current_page()
    }

    fn current_page_height(&self) -> i64 {
        (**self).current_page_height()
    }

    fn current_page_width(&self) -> f64 {
        (**self).current_page_width()
    }

    fn total_pages(&self) -> i64 {
        (**self).total_pages()
    }

    fn move_to(&mut self, unit: MoveUnit, value: i64) {
        (**self).move_to(unit, value);
    }

    fn extract_strip(&self, strip: &Strip) -> Result<String, StoreError> {
        (**self).extract_strip(strip)
    }
}
