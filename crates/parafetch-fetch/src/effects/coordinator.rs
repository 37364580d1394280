use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use parafetch_fs::{ScratchSlot, ScratchStore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::core::retry_delay;
use crate::data::{ChunkResult, ChunkSpec, DownloadJob, FetchOptions, FetchOutcome, Progress};
use crate::effects::http::HttpClient;
use crate::effects::segment::{ChunkMeter, fetch_segment};
use crate::error::ChunkFetchError;

/// Runs one fetch unit per chunk and joins them all before answering.
///
/// Units share nothing but the read-only client, options and scratch store
/// path; each writes only the slot keyed by its own index.
pub struct Coordinator<C: HttpClient> {
    client:  Arc<C>,
    options: Arc<FetchOptions>,
}

impl<C: HttpClient + 'static> Coordinator<C> {
    pub fn new(client: Arc<C>, options: Arc<FetchOptions>) -> Self { Self { client, options } }

    /// Fetch every chunk of `specs` into `store`.
    ///
    /// Returns only after every unit has terminated. On any failure the slots
    /// written by successful units are discarded before returning. A job
    /// without range support is refused before any unit is spawned.
    pub async fn run(
        &self,
        job: &DownloadJob,
        specs: &[ChunkSpec],
        store: Arc<ScratchStore>,
    ) -> FetchOutcome {
        if !job.supports_range() {
            tracing::warn!(url = job.url(), "refusing to fetch ranges the server does not honor");
            return FetchOutcome::Failure(
                specs
                    .iter()
                    .map(|spec| ChunkFetchError::RangeUnsupported { index: spec.index })
                    .collect(),
            );
        }

        let url: Arc<str> = Arc::from(job.url());
        let cancel = CancellationToken::new();
        let mut units = JoinSet::new();

        for &spec in specs {
            let unit = FetchUnit {
                client: Arc::clone(&self.client),
                url: Arc::clone(&url),
                spec,
                store: Arc::clone(&store),
                options: Arc::clone(&self.options),
                cancel: cancel.clone(),
            };
            let span = tracing::debug_span!("chunk", index = spec.index);
            let on_panic = self.options.cancel_on_failure.then(|| cancel.clone());
            units.spawn(
                async move {
                    match AssertUnwindSafe(unit.run()).catch_unwind().await {
                        Ok(result) => result,
                        Err(_) => {
                            tracing::error!("fetch unit panicked");
                            if let Some(cancel) = on_panic {
                                cancel.cancel();
                            }
                            ChunkResult {
                                index:   spec.index,
                                outcome: Err(ChunkFetchError::Panicked { index: spec.index }),
                            }
                        }
                    }
                }
                .instrument(span),
            );
        }

        let mut results: Vec<Option<Result<ScratchSlot, ChunkFetchError>>> =
            specs.iter().map(|_| None).collect();

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(ChunkResult { index, outcome }) => match results.get_mut(index as usize) {
                    Some(entry) => *entry = Some(outcome),
                    None => tracing::error!(chunk = index, "result for an unplanned chunk"),
                },
                Err(e) => tracing::error!(error = %e, "fetch unit did not complete"),
            }
        }

        let mut slots = Vec::with_capacity(specs.len());
        let mut failures = Vec::new();
        for (spec, result) in specs.iter().zip(results) {
            match result {
                Some(Ok(slot)) => slots.push(slot),
                Some(Err(e)) => failures.push(e),
                None => failures.push(ChunkFetchError::Panicked { index: spec.index }),
            }
        }

        if failures.is_empty() {
            return FetchOutcome::Success(slots);
        }

        for slot in slots {
            let index = slot.index();
            if let Err(e) = slot.discard() {
                tracing::warn!(chunk = index, error = %e, "failed to discard scratch slot");
            }
        }
        FetchOutcome::Failure(failures)
    }
}

struct FetchUnit<C> {
    client:  Arc<C>,
    url:     Arc<str>,
    spec:    ChunkSpec,
    store:   Arc<ScratchStore>,
    options: Arc<FetchOptions>,
    cancel:  CancellationToken,
}

impl<C: HttpClient> FetchUnit<C> {
    async fn run(self) -> ChunkResult {
        let index = self.spec.index;
        let outcome = self.fetch_with_retry().await;

        match &outcome {
            Ok(_) => tracing::debug!("chunk complete"),
            Err(ChunkFetchError::Cancelled { .. }) => tracing::debug!("chunk cancelled"),
            Err(e) => {
                tracing::warn!(error = %e, "chunk failed");
                if self.options.cancel_on_failure {
                    self.cancel.cancel();
                }
            }
        }

        self.options.report(Progress::ChunkFinished {
            index,
            success: outcome.is_ok(),
        });
        ChunkResult { index, outcome }
    }

    async fn fetch_with_retry(&self) -> Result<ScratchSlot, ChunkFetchError> {
        let index = self.spec.index;
        let mut meter = ChunkMeter::new(index, &self.options);
        let mut attempt = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(ChunkFetchError::Cancelled { index }),
                result = self.attempt(&mut meter) => result,
            };

            match result {
                Ok(slot) => return Ok(slot),
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    let delay = retry_delay(attempt, self.options.retry_backoff);
                    attempt += 1;
                    tracing::info!(error = %e, attempt, ?delay, "retrying chunk");
                    self.options.report(Progress::ChunkRetry {
                        index,
                        attempt,
                        delay,
                        discarded: meter.reset(),
                    });

                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(ChunkFetchError::Cancelled { index }),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, meter: &mut ChunkMeter<'_>) -> Result<ScratchSlot, ChunkFetchError> {
        let slot = self
            .store
            .reserve(self.spec.index)
            .map_err(|source| ChunkFetchError::Scratch {
                index: self.spec.index,
                source,
            })?;
        fetch_segment(&*self.client, &self.url, self.spec, slot, &self.options, meter).await
    }
}
