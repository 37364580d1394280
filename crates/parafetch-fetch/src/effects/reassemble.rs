use std::path::PathBuf;

use parafetch_fs::{StageOptions, StagedFile};
use tokio::io::AsyncWriteExt;

use crate::data::{DownloadJob, FetchOutcome};
use crate::error::ReassemblyError;

/// Concatenates scratch slots, in index order, into the job's destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reassembler;

impl Reassembler {
    pub fn new() -> Self { Self }

    /// Write the destination of `job` from a successful fetch.
    ///
    /// A failed outcome is refused before the destination is touched. Each
    /// slot is deleted as soon as it has been copied; slots not reached
    /// because of an error are deleted when dropped. The destination only
    /// appears once every byte was written and synced.
    pub async fn reassemble(
        &self,
        job: &DownloadJob,
        outcome: FetchOutcome,
    ) -> Result<PathBuf, ReassemblyError> {
        let mut slots = match outcome {
            FetchOutcome::Success(slots) => slots,
            FetchOutcome::Failure(_) => return Err(ReassemblyError::FailedOutcome),
        };

        slots.sort_by_key(|slot| slot.index());
        for (expected, slot) in (0u32..).zip(&slots) {
            if slot.index() != expected {
                return Err(ReassemblyError::MissingChunk { expected });
            }
        }

        let (stage, file) = StagedFile::create(job.destination(), StageOptions::new())
            .map_err(ReassemblyError::Destination)?;
        let staging_path = stage.staging_path().to_path_buf();
        let write_error = |e: std::io::Error| ReassemblyError::Write {
            path: staging_path.clone(),
            source: e,
        };

        let mut output = tokio::fs::File::from_std(file);
        let mut written = 0u64;

        for slot in slots {
            let index = slot.index();
            let mut input = tokio::fs::File::open(slot.path()).await.map_err(|e| {
                ReassemblyError::SlotUnreadable {
                    index,
                    path: slot.path().to_path_buf(),
                    source: e,
                }
            })?;

            written += tokio::io::copy(&mut input, &mut output)
                .await
                .map_err(|e| ReassemblyError::SlotUnreadable {
                    index,
                    path: slot.path().to_path_buf(),
                    source: e,
                })?;
            drop(input);

            if let Err(e) = slot.discard() {
                tracing::warn!(chunk = index, error = %e, "failed to delete consumed scratch slot");
            }
        }

        output.flush().await.map_err(write_error)?;
        output.sync_all().await.map_err(write_error)?;
        drop(output);

        if written != job.total_len() {
            return Err(ReassemblyError::LengthMismatch {
                expected: job.total_len(),
                written,
            });
        }

        let destination = stage.commit().map_err(ReassemblyError::Commit)?;
        tracing::debug!(path = %destination.display(), bytes = written, "output committed");
        Ok(destination)
    }
}
