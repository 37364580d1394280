use parafetch_fs::ScratchSlot;

use crate::error::ChunkFetchError;

/// One byte range of the resource; both offsets are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkSpec {
    /// Position in the reassembly order (0-based).
    pub index: u32,
    /// First byte offset.
    pub start: u64,
    /// Last byte offset.
    pub end:   u64,
}

impl ChunkSpec {
    pub fn len(&self) -> u64 { self.end - self.start + 1 }

    /// Value for the `Range` request header.
    pub fn range_header(&self) -> String { format!("bytes={}-{}", self.start, self.end) }
}

/// Result of one fetch unit. On success the scratch slot is owned by the
/// result until it is handed to the reassembler.
#[derive(Debug)]
pub struct ChunkResult {
    pub index:   u32,
    pub outcome: Result<ScratchSlot, ChunkFetchError>,
}

/// Aggregate result of all fetch units of a job.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Every chunk succeeded; slots are ordered by index.
    Success(Vec<ScratchSlot>),
    /// At least one chunk failed; every slot written has been discarded.
    Failure(Vec<ChunkFetchError>),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool { matches!(self, FetchOutcome::Success(_)) }
}
