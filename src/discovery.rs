// WHY: Extent discovery for stores that only answer "does index N exist"
// Coarse-to-fine linear probe: stride forward, back off one stride on a miss, shrink the stride tenfold

use serde::Serialize;
use tracing::debug;

use crate::error::{Dimension, ProbeError, Result};

/// Inclusive index range over one dimension (columns, rows or pages)
///
/// An empty span has `end == start - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Span with no valid index starting at `start`
    pub fn empty_at(start: i64) -> Self {
        Self { start, end: start - 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Number of indexes covered (0 for an empty span)
    pub fn len(&self) -> i64 {
        (self.end - self.start + 1).max(0)
    }

    pub fn contains(&self, index: i64) -> bool {
        index >= self.start && index <= self.end
    }

    /// Clamp `index` into the span; an empty span clamps to its start
    pub fn clamp(&self, index: i64) -> i64 {
        if self.is_empty() {
            return self.start;
        }
        index.clamp(self.start, self.end)
    }
}

/// Probe parameters for one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Stride of the first probing pass
    pub initial_step: i64,
    /// Any existing index at or beyond this value aborts discovery
    pub hard_cap: i64,
}

impl DiscoveryConfig {
    pub fn new(initial_step: i64, hard_cap: i64) -> Self {
        Self {
            initial_step,
            hard_cap,
        }
    }
}

/// Shrink a probe stride by one order of magnitude, never below 1
pub fn reduce_step(step: i64) -> i64 {
    (step / 10).max(1)
}

/// Find the last index for which `exists_at` holds, scanning upward from `start`
///
/// Assumes one contiguous valid region beginning at `start`. Returns
/// `start - 1` when `start` itself does not exist. A predicate error aborts
/// the probe and is returned unchanged.
///
/// # Errors
/// `InvalidArgument` for a non-positive initial step, `RangeExceeded` when an
/// existing index reaches `config.hard_cap`.
pub fn discover_last_valid_index<F>(
    mut exists_at: F,
    start: i64,
    config: DiscoveryConfig,
    dimension: Dimension,
) -> Result<i64>
where
    F: FnMut(i64) -> Result<bool>,
{
    if config.initial_step < 1 {
        return Err(ProbeError::InvalidArgument(format!(
            "initial step for {dimension} must be at least 1, got {}",
            config.initial_step
        )));
    }

    let mut probes = 1u32;
    if !exists_at(start)? {
        debug!(%dimension, start, "Nothing exists at span start");
        return Ok(start - 1);
    }

    let mut step = config.initial_step;
    let mut cursor = start + step;

    loop {
        probes += 1;
        if exists_at(cursor)? {
            if cursor >= config.hard_cap {
                return Err(ProbeError::RangeExceeded {
                    dimension,
                    index: cursor,
                    cap: config.hard_cap,
                });
            }
            cursor += step;
            continue;
        }

        if step == 1 {
            let last = cursor - 1;
            debug!(%dimension, start, last, probes, "Span discovered");
            return Ok(last);
        }

        cursor -= step;
        step = reduce_step(step);
        cursor += step;
    }
}

/// Discover the full span `[start, last]` along one dimension
///
/// # Errors
/// Same as [`discover_last_valid_index`].
pub fn discover_span<F>(
    exists_at: F,
    start: i64,
    config: DiscoveryConfig,
    dimension: Dimension,
) -> Result<Span>
where
    F: FnMut(i64) -> Result<bool>,
{
    let end = discover_last_valid_index(exists_at, start, config, dimension)?;
    Ok(Span::new(start, end))
}
