//! Error types for parafetch-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Job-level failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to probe {url}: {reason}")]
    Probe { url: String, reason: String },

    #[error("{url} does not support range requests")]
    UnsupportedRange { url: String },

    #[error("worker count must be greater than 0")]
    InvalidWorkerCount,

    #[error("output directory '{}' does not exist", .0.display())]
    MissingOutputDir(PathBuf),

    #[error("{} of {total} chunks failed", .failures.len())]
    ChunksFailed {
        total:    usize,
        failures: Vec<ChunkFetchError>,
    },

    #[error("reassembly failed: {0}")]
    Reassembly(#[from] ReassemblyError),

    #[error("scratch store unavailable: {0}")]
    Scratch(#[from] parafetch_fs::Error),
}

impl Error {
    /// The failure that caused a chunk-level abort, skipping siblings that were
    /// only cancelled because of it.
    pub fn root_chunk_failure(&self) -> Option<&ChunkFetchError> {
        match self {
            Error::ChunksFailed { failures, .. } => failures
                .iter()
                .find(|f| !matches!(f, ChunkFetchError::Cancelled { .. }))
                .or_else(|| failures.first()),
            _ => None,
        }
    }
}

/// Failure of a single range retrieval.
#[derive(Debug, Error)]
pub enum ChunkFetchError {
    #[error("chunk {index}: expected 206 Partial Content, got {status}")]
    UnexpectedStatus { index: u32, status: u16 },

    #[error("chunk {index}: transport error: {message}")]
    Transport { index: u32, message: String },

    #[error("chunk {index}: received {received} bytes, expected {expected}")]
    BodyLength {
        index:    u32,
        expected: u64,
        received: u64,
    },

    #[error("chunk {index}: scratch slot error: {source}")]
    Scratch {
        index:  u32,
        #[source]
        source: parafetch_fs::Error,
    },

    #[error("chunk {index}: server does not support range requests")]
    RangeUnsupported { index: u32 },

    #[error("chunk {index}: cancelled after a sibling failed")]
    Cancelled { index: u32 },

    #[error("chunk {index}: worker panicked")]
    Panicked { index: u32 },
}

impl ChunkFetchError {
    pub fn index(&self) -> u32 {
        match self {
            ChunkFetchError::UnexpectedStatus { index, .. }
            | ChunkFetchError::Transport { index, .. }
            | ChunkFetchError::BodyLength { index, .. }
            | ChunkFetchError::Scratch { index, .. }
            | ChunkFetchError::RangeUnsupported { index }
            | ChunkFetchError::Cancelled { index }
            | ChunkFetchError::Panicked { index } => *index,
        }
    }

    /// Whether another attempt at the same range may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ChunkFetchError::UnexpectedStatus { status, .. } => {
                crate::core::is_transient_status(*status)
            }
            ChunkFetchError::Transport { .. } | ChunkFetchError::BodyLength { .. } => true,
            ChunkFetchError::Scratch { .. }
            | ChunkFetchError::RangeUnsupported { .. }
            | ChunkFetchError::Cancelled { .. }
            | ChunkFetchError::Panicked { .. } => false,
        }
    }
}

/// Failure while combining scratch slots into the destination.
#[derive(Debug, Error)]
pub enum ReassemblyError {
    #[error("refusing to reassemble a failed fetch")]
    FailedOutcome,

    #[error("chunk {expected} is missing from the fetched set")]
    MissingChunk { expected: u32 },

    #[error("could not open destination for writing: {0}")]
    Destination(#[source] parafetch_fs::Error),

    #[error("scratch slot {index} unreadable at '{path}': {source}")]
    SlotUnreadable {
        index:  u32,
        path:   PathBuf,
        source: io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("assembled {written} bytes, expected {expected}")]
    LengthMismatch { expected: u64, written: u64 },

    #[error("failed to move output into place: {0}")]
    Commit(#[source] parafetch_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
