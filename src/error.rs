// WHY: One error type for every probe, conversion and search in the crate
// Search misses are not errors; they surface as Ok(None)

use thiserror::Error;

use crate::discovery::Span;

/// Failure reported by an external store for a single read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed field or position does not exist
    #[error("position does not exist: {0}")]
    OutOfRange(String),

    /// Any other extraction failure
    #[error("store fault: {0}")]
    Fault(String),
}

impl StoreError {
    /// True when the store reported that the position simply is not there
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, StoreError::OutOfRange(_))
    }
}

/// Dimension a discovery probe runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Columns,
    Rows,
    RowsBehindCursor,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dimension::Columns => "columns",
            Dimension::Rows => "rows",
            Dimension::RowsBehindCursor => "rows behind cursor",
        };
        f.write_str(name)
    }
}

/// Errors raised by discovery, coordinate conversion and search
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("range exceeded while discovering {dimension}: index {index} reached cap {cap}")]
    RangeExceeded {
        dimension: Dimension,
        index: i64,
        cap: i64,
    },

    #[error("offset {offset} is outside rows {}..={}", .span.start, .span.end)]
    OutOfBounds { offset: i64, span: Span },

    #[error("document has no pages")]
    EmptyDocument,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
