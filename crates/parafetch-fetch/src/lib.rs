//! Parallel HTTP range downloads with ordered reassembly.
//!
//! A resource is probed, split into contiguous byte ranges, fetched by one
//! independent task per range into index-keyed scratch slots, and, once every
//! task has finished, concatenated in index order into the destination.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable job, chunk, option and progress types
//! - [`core`] - Pure transformations (partitioning, retry timing, naming)
//! - [`effects`] - I/O operations behind the [`HttpClient`] trait
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "reqwest")]
//! # async fn demo() -> parafetch_fetch::Result<()> {
//! use parafetch_fetch::{Downloader, FetchOptions, ReqwestClient};
//!
//! let client = ReqwestClient::new().expect("client");
//! let downloader = Downloader::new(client).with_options(FetchOptions::default().workers(8));
//! let path = downloader.download("https://example.com/big.iso", None).await?;
//! println!("saved to {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{partition, resolve_filename, retry_delay};
pub use data::{
    ChunkResult, ChunkSpec, DownloadJob, FetchOptions, FetchOutcome, HeadInfo, JobPhase, Progress,
    ResourceInfo,
};
pub use effects::{BoxStream, Coordinator, Downloader, HttpClient, HttpResponse, Reassembler};
pub use error::{ChunkFetchError, Error, ReassemblyError, Result};

#[cfg(feature = "reqwest")]
pub use effects::{ReqwestClient, ReqwestClientBuilder};
