use futures_util::StreamExt;
use parafetch_fs::{PendingSlot, ScratchSlot};
use tokio::io::AsyncWriteExt;

use crate::data::{ChunkSpec, FetchOptions, Progress};
use crate::effects::http::HttpClient;
use crate::error::ChunkFetchError;

/// HTTP status of an honored range request.
pub const PARTIAL_CONTENT: u16 = 206;

/// Per-chunk byte accounting for progress events. Owned by a single unit.
pub(crate) struct ChunkMeter<'a> {
    index:    u32,
    received: u64,
    options:  &'a FetchOptions,
}

impl<'a> ChunkMeter<'a> {
    pub(crate) fn new(index: u32, options: &'a FetchOptions) -> Self {
        Self {
            index,
            received: 0,
            options,
        }
    }

    fn add(&mut self, bytes: u64) {
        self.received += bytes;
        self.options.report(Progress::ChunkBytes {
            index: self.index,
            bytes,
        });
    }

    /// Forget the bytes of a failed attempt, returning how many there were.
    pub(crate) fn reset(&mut self) -> u64 { std::mem::take(&mut self.received) }
}

/// Retrieve exactly the bytes of `spec` into `slot`.
///
/// The slot is committed only after a 206 response whose body has exactly
/// `spec.len()` bytes was fully written and synced. On every other path the
/// slot guard is dropped and the partial file removed.
pub(crate) async fn fetch_segment<C: HttpClient>(
    client: &C,
    url: &str,
    spec: ChunkSpec,
    slot: PendingSlot,
    options: &FetchOptions,
    meter: &mut ChunkMeter<'_>,
) -> Result<ScratchSlot, ChunkFetchError> {
    let index = spec.index;
    let transport = |e: C::Error| ChunkFetchError::Transport {
        index,
        message: e.to_string(),
    };
    let scratch = |e: std::io::Error| ChunkFetchError::Scratch {
        index,
        source: parafetch_fs::Error::Write {
            path: slot.path().to_path_buf(),
            source: e,
        },
    };

    let mut headers: Vec<(String, String)> = options.headers.to_vec();
    headers.push(("Range".to_string(), spec.range_header()));

    tracing::debug!(chunk = index, range = %spec.range_header(), "requesting range");
    let response = client.stream(url, &headers).await.map_err(transport)?;
    if response.status != PARTIAL_CONTENT {
        return Err(ChunkFetchError::UnexpectedStatus {
            index,
            status: response.status,
        });
    }

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(slot.path())
        .await
        .map_err(scratch)?;

    let expected = spec.len();
    let mut received = 0u64;
    let mut body = response.body;

    while let Some(chunk) = body.next().await {
        let bytes = chunk.map_err(transport)?;
        received += bytes.len() as u64;
        if received > expected {
            return Err(ChunkFetchError::BodyLength {
                index,
                expected,
                received,
            });
        }
        file.write_all(&bytes).await.map_err(scratch)?;
        meter.add(bytes.len() as u64);
    }

    if received != expected {
        return Err(ChunkFetchError::BodyLength {
            index,
            expected,
            received,
        });
    }

    file.flush().await.map_err(scratch)?;
    file.sync_all().await.map_err(scratch)?;
    drop(file);

    tracing::debug!(chunk = index, bytes = received, "range stored");
    Ok(slot.commit())
}
