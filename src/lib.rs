pub mod boundary;
pub mod config;
pub mod discovery;
pub mod error;
pub mod paginated;
pub mod pattern;
pub mod store;
pub mod tabular;

// Re-export the query and navigation surface
pub use boundary::{find_text_position, BoundaryResult};
pub use config::{BoundaryConfig, CursorMode, ProbeConfig, TabularConfig};
pub use discovery::{discover_last_valid_index, discover_span, DiscoveryConfig, Span};
pub use error::{Dimension, ProbeError, Result, StoreError};
pub use paginated::{Addressing, Page, Paginated, RecordCoordinates, RecordIndex};
pub use pattern::Pattern;
pub use store::{MemoryDocument, MemoryGrid, MemoryPage, MoveUnit, PagedStore, Strip, TabularStore};
pub use tabular::{Cell, Tabular};
