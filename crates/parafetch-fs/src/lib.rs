//! Filesystem primitives for segmented downloads.
//!
//! - [`ScratchStore`] - per-job directory of index-keyed scratch slots
//! - [`StagedFile`] - destination written under a unique temporary name, then renamed

mod error;
mod scratch;
mod staged;

pub use error::{Error, Result};
pub use scratch::{PendingSlot, SLOT_PREFIX, ScratchSlot, ScratchStore};
pub use staged::{STAGE_SUFFIX, StageOptions, StagedFile};
