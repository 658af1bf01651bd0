// WHY: Locate text on a page when the store can only say whether a rectangular strip contains it
// Each edge is pulled inward greedily at a stride that shrinks tenfold after every overshoot

use serde::Serialize;
use tracing::debug;

use crate::config::BoundaryConfig;
use crate::discovery::reduce_step;
use crate::error::{ProbeError, Result, StoreError};
use crate::pattern::Pattern;
use crate::store::{PagedStore, Strip};

/// Tightest horizontal interval still containing the match, and the line offset it was found at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundaryResult {
    pub left: i64,
    pub right: i64,
    pub offset: i64,
}

struct StripProbe<'a, S: ?Sized> {
    store: &'a S,
    pattern: &'a Pattern,
    config: &'a BoundaryConfig,
}

impl<S: PagedStore + ?Sized> StripProbe<'_, S> {
    fn extract(&self, left: i64, right: i64, offset: i64) -> std::result::Result<String, StoreError> {
        self.store.extract_strip(&Strip {
            left,
            right,
            offset,
            height: self.config.line_height,
            separator: self.config.separator.clone(),
        })
    }

    /// A strip the store cannot produce does not match
    fn matches(&self, left: i64, right: i64, offset: i64) -> Result<bool> {
        match self.extract(left, right, offset) {
            Ok(text) => Ok(self.pattern.is_match(&text)),
            Err(e) if e.is_out_of_range() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn narrow_right(&self, left: i64, mut right: i64, offset: i64) -> Result<i64> {
        let mut step = self.config.initial_step;
        loop {
            let candidate = right - step;
            if candidate > left && self.matches(left, candidate, offset)? {
                right = candidate;
                continue;
            }
            if step <= 1 {
                return Ok(right);
            }
            step = reduce_step(step);
        }
    }

    fn narrow_left(&self, mut left: i64, right: i64, offset: i64) -> Result<i64> {
        let mut step = self.config.initial_step;
        loop {
            let candidate = left + step;
            if candidate < right && self.matches(candidate, right, offset)? {
                left = candidate;
                continue;
            }
            if step <= 1 {
                return Ok(left);
            }
            step = reduce_step(step);
        }
    }
}

/// Find the first line offset below the cursor whose full-width strip matches `pattern`,
/// then narrow the strip's right edge and afterwards its left edge
///
/// Depends only on the store's current page, cursor and width. Returns `Ok(None)`
/// when no offset in `0..=max_offset` matches or the page runs out of lines.
///
/// # Errors
/// `InvalidArgument` for a non-positive line height or step or a negative
/// `max_offset`; `Store` for extraction faults other than out-of-range.
pub fn find_text_position<S: PagedStore + ?Sized>(
    store: &S,
    pattern: &Pattern,
    config: &BoundaryConfig,
) -> Result<Option<BoundaryResult>> {
    if config.line_height < 1 {
        return Err(ProbeError::InvalidArgument(format!(
            "line height must be at least 1, got {}",
            config.line_height
        )));
    }
    if config.initial_step < 1 {
        return Err(ProbeError::InvalidArgument(format!(
            "initial step must be at least 1, got {}",
            config.initial_step
        )));
    }
    if config.max_offset < 0 {
        return Err(ProbeError::InvalidArgument(format!(
            "max offset must not be negative, got {}",
            config.max_offset
        )));
    }

    let probe = StripProbe {
        store,
        pattern,
        config,
    };
    let width = store.current_page_width().floor() as i64;

    for offset in 0..=config.max_offset {
        let text = match probe.extract(0, width, offset) {
            Ok(text) => text,
            Err(e) if e.is_out_of_range() => {
                debug!(%pattern, offset, "Ran past the last line of the page");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        if !pattern.is_match(&text) {
            continue;
        }

        let right = probe.narrow_right(0, width, offset)?;
        let left = probe.narrow_left(0, right, offset)?;
        debug!(%pattern, left, right, offset, "Text boundary localized");
        return Ok(Some(BoundaryResult {
            left,
            right,
            offset,
        }));
    }

    debug!(%pattern, max_offset = config.max_offset, "Text not found below cursor");
    Ok(None)
}
