//! Immutable data types for segmented downloads.
//!
//! Job descriptions, chunk plans, configuration and progress events. Nothing
//! in here performs I/O.

pub mod chunk;
pub mod options;
pub mod progress;
pub mod resource;

pub use chunk::{ChunkResult, ChunkSpec, FetchOutcome};
pub use options::{DEFAULT_WORKERS, FetchOptions};
pub use progress::{JobPhase, Progress, ProgressCallback};
pub use resource::{DownloadJob, HeadInfo, ResourceInfo};
