//! Pure transformations: range planning, retry timing, header interpretation
//! and filename resolution. Nothing in here performs I/O.

mod filename;
mod partition;
mod probe;
mod retry;

pub use filename::resolve_filename;
pub use partition::partition;
pub use probe::{resource_info, supports_range};
pub use retry::{is_transient_status, retry_delay};
