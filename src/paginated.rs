// WHY: Linear record addressing over pages of different heights
// The host can jump to a page or to a linear record index, so a prefix-sum page table is built once up front

use serde::Serialize;
use tracing::{debug, info};

use crate::boundary::{find_text_position, BoundaryResult};
use crate::config::BoundaryConfig;
use crate::error::{ProbeError, Result};
use crate::pattern::Pattern;
use crate::store::{MoveUnit, PagedStore};

pub const FIRST_PAGE: i64 = 1;
pub const MIN_HEIGHT: i64 = 0;

/// Size of one page, captured at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Page {
    pub number: i64,
    /// Addressable line count
    pub height: i64,
    pub width: f64,
}

/// Page and in-page height, always within the page table
///
/// Only built by [`Paginated`], which clamps both parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecordCoordinates {
    page: i64,
    height: i64,
}

impl RecordCoordinates {
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn height(&self) -> i64 {
        self.height
    }
}

/// Offset into the concatenation of every page's lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordIndex(pub i64);

/// Ways of naming a cursor target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Linear record index
    RecordIndex(i64),
    /// Raw page number and height, clamped before use
    PageHeight { page: i64, height: i64 },
    /// Coordinates produced by a [`Paginated`]
    Coordinates(RecordCoordinates),
}

/// Page table and navigation over a paginated store
#[derive(Debug)]
pub struct Paginated<S> {
    store: S,
    pages: Vec<Page>,
    /// `starts[i]` is the record index of the top of page `i + 1`
    starts: Vec<i64>,
    record_length: i64,
    boundary: BoundaryConfig,
}

impl<S: PagedStore> Paginated<S> {
    /// Scan every page of `store` with the default boundary configuration
    ///
    /// # Errors
    /// See [`Paginated::with_config`].
    pub fn new(store: S) -> Result<Self> {
        Self::with_config(store, BoundaryConfig::default())
    }

    /// Visit every page once to record its size, then put the cursor back
    ///
    /// # Errors
    /// `EmptyDocument` when the store reports no pages.
    pub fn with_config(mut store: S, boundary: BoundaryConfig) -> Result<Self> {
        let total_pages = store.total_pages();
        if total_pages < FIRST_PAGE {
            return Err(ProbeError::EmptyDocument);
        }

        // Captured before the scan moves the cursor away
        let origin_page = store.current_page();
        let origin_height = store.current_position();

        let mut pages = Vec::new();
        for number in FIRST_PAGE..=total_pages {
            store.move_to(MoveUnit::Page, number);
            pages.push(Page {
                number,
                height: store.current_page_height().max(MIN_HEIGHT),
                width: store.current_page_width(),
            });
        }

        let mut starts = Vec::with_capacity(pages.len());
        let mut record_length = 0;
        for page in &pages {
            starts.push(record_length);
            record_length += page.height;
        }

        let mut paginated = Self {
            store,
            pages,
            starts,
            record_length,
            boundary,
        };

        let origin = paginated.record_coordinates(origin_page, origin_height);
        paginated.move_to(Addressing::Coordinates(origin));

        info!(
            total_pages,
            record_length = paginated.record_length,
            "Page table built"
        );
        Ok(paginated)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn total_pages(&self) -> i64 {
        i64::try_from(self.pages.len()).unwrap_or(i64::MAX)
    }

    /// Sum of all page heights
    pub fn record_length(&self) -> i64 {
        self.record_length
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn boundary_config(&self) -> &BoundaryConfig {
        &self.boundary
    }

    /// Clamp the page into `[1, total_pages]`, then the height into that page
    pub fn record_coordinates(&self, page: i64, height: i64) -> RecordCoordinates {
        let page = page.clamp(FIRST_PAGE, self.total_pages());
        let page_height = self.page_at(page).height;
        RecordCoordinates {
            page,
            height: height.clamp(MIN_HEIGHT, page_height),
        }
    }

    pub fn clamp_record_index(&self, index: i64) -> RecordIndex {
        RecordIndex(index.clamp(0, self.record_length))
    }

    /// Heights of all earlier pages plus the in-page height
    pub fn to_record_index(&self, coordinates: RecordCoordinates) -> RecordIndex {
        let coordinates = self.record_coordinates(coordinates.page, coordinates.height);
        RecordIndex(self.starts[self.slot(coordinates.page)] + coordinates.height)
    }

    /// Inverse of [`Paginated::to_record_index`]
    ///
    /// An index on a page boundary resolves to the top of the later page,
    /// except the final index, which stays at the bottom of the last page.
    pub fn record_coordinates_at(&self, index: RecordIndex) -> RecordCoordinates {
        let RecordIndex(index) = self.clamp_record_index(index.0);
        if index >= self.record_length {
            let last = self.total_pages();
            return RecordCoordinates {
                page: last,
                height: self.page_at(last).height,
            };
        }

        let slot = self.starts.partition_point(|&start| start <= index) - 1;
        RecordCoordinates {
            page: self.pages[slot].number,
            height: index - self.starts[slot],
        }
    }

    /// Coordinates of the store's cursor
    pub fn current_position(&self) -> RecordCoordinates {
        self.record_coordinates(self.store.current_page(), self.store.current_position())
    }

    pub fn current_record_index(&self) -> RecordIndex {
        self.to_record_index(self.current_position())
    }

    /// Normalise `target` to a clamped record index and issue one cursor move
    pub fn move_to(&mut self, target: Addressing) -> RecordIndex {
        let index = match target {
            Addressing::RecordIndex(index) => self.clamp_record_index(index),
            Addressing::PageHeight { page, height } => {
                self.to_record_index(self.record_coordinates(page, height))
            }
            Addressing::Coordinates(coordinates) => self.to_record_index(coordinates),
        };

        debug!(?target, record_index = index.0, "Moving cursor");
        self.store.move_to(MoveUnit::RecordIndex, index.0);
        index
    }

    /// Move the cursor `delta` records forward (or back), clamped to the document
    pub fn move_by(&mut self, delta: i64) -> RecordIndex {
        let current = self.current_record_index();
        self.move_to(Addressing::RecordIndex(current.0.saturating_add(delta)))
    }

    /// Localize `pattern` below the cursor on the current page
    ///
    /// # Errors
    /// See [`find_text_position`].
    pub fn find_text_position(&self, pattern: &Pattern) -> Result<Option<BoundaryResult>> {
        find_text_position(&self.store, pattern, &self.boundary)
    }

    /// Like [`Paginated::find_text_position`] with per-call line height and depth
    ///
    /// # Errors
    /// See [`find_text_position`].
    pub fn find_text_position_with(
        &self,
        pattern: &Pattern,
        line_height: Option<i64>,
        max_offset: Option<i64>,
    ) -> Result<Option<BoundaryResult>> {
        let config = BoundaryConfig {
            line_height: line_height.unwrap_or(self.boundary.line_height),
            max_offset: max_offset.unwrap_or(self.boundary.max_offset),
            ..self.boundary.clone()
        };
        find_text_position(&self.store, pattern, &config)
    }

    fn slot(&self, page: i64) -> usize {
        usize::try_from(page - FIRST_PAGE).unwrap_or(0)
    }

    fn page_at(&self, page: i64) -> &Page {
        &self.pages[self.slot(page)]
    }
}
