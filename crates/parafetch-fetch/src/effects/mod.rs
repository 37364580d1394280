//! I/O side of the pipeline: the HTTP seam, the per-chunk fetcher, the
//! coordinator that fans out and joins, and the reassembler.

mod coordinator;
mod http;
mod pipeline;
mod reassemble;
mod segment;

pub use coordinator::Coordinator;
pub use http::{BoxStream, HttpClient, HttpResponse};
pub use pipeline::Downloader;
pub use reassemble::Reassembler;
pub use segment::PARTIAL_CONTENT;

#[cfg(feature = "reqwest")]
pub use http::{ReqwestClient, ReqwestClientBuilder};
