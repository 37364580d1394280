use std::path::{Path, PathBuf};
use std::sync::Arc;

use parafetch_fs::ScratchStore;

use crate::core::{partition, resolve_filename, resource_info};
use crate::data::{DownloadJob, FetchOptions, FetchOutcome, JobPhase, Progress, ResourceInfo};
use crate::effects::coordinator::Coordinator;
use crate::effects::http::HttpClient;
use crate::effects::reassemble::Reassembler;
use crate::error::{Error, Result};

/// Probe, partition, fetch in parallel and reassemble a single resource.
pub struct Downloader<C: HttpClient> {
    client:  Arc<C>,
    options: Arc<FetchOptions>,
}

impl<C: HttpClient + 'static> Downloader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client:  Arc::new(client),
            options: Arc::new(FetchOptions::default()),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Ask the server for the size, range support and name of `url`.
    pub async fn probe(&self, url: &str) -> Result<ResourceInfo> {
        let head = self
            .client
            .head(url, &self.options.headers)
            .await
            .map_err(|e| Error::Probe {
                url:    url.to_string(),
                reason: e.to_string(),
            })?;

        let info = resource_info(&head).map_err(|reason| Error::Probe {
            url: url.to_string(),
            reason,
        })?;
        tracing::info!(
            url,
            total_len = info.total_len,
            supports_range = info.supports_range,
            "probed resource"
        );
        Ok(info)
    }

    /// Download `url` to `output`.
    ///
    /// Without `output` the file is named after the server's suggestion or
    /// the URL and placed in the working directory. An `output` that is an
    /// existing directory receives the derived name.
    pub async fn download(&self, url: &str, output: Option<&Path>) -> Result<PathBuf> {
        url::Url::parse(url).map_err(|e| Error::InvalidUrl {
            url:    url.to_string(),
            reason: e.to_string(),
        })?;

        let info = self.probe(url).await?;
        let destination = match output {
            Some(path) if path.is_dir() => {
                path.join(resolve_filename(info.suggested_name.as_deref(), url))
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(resolve_filename(info.suggested_name.as_deref(), url)),
        };

        let job = DownloadJob::new(url, &info, destination);
        self.run(&job).await
    }

    /// Run an already probed job to completion.
    pub async fn run(&self, job: &DownloadJob) -> Result<PathBuf> {
        let mut phase = PhaseTracker::new(&self.options, job.total_len());

        if !job.supports_range() {
            return Err(phase.fail(Error::UnsupportedRange {
                url: job.url().to_string(),
            }));
        }

        let output_dir = output_dir(job.destination());
        if !output_dir.is_dir() {
            return Err(phase.fail(Error::MissingOutputDir(output_dir)));
        }

        let specs = match partition(job.total_len(), self.options.workers) {
            Ok(specs) => specs,
            Err(e) => return Err(phase.fail(e)),
        };
        phase.enter(JobPhase::Partitioned);
        tracing::info!(chunks = specs.len(), "planned byte ranges");

        let store = match ScratchStore::create_in(self.scratch_root(job)) {
            Ok(store) => Arc::new(store),
            Err(e) => return Err(phase.fail(e.into())),
        };

        phase.enter(JobPhase::Fetching);
        let coordinator = Coordinator::new(Arc::clone(&self.client), Arc::clone(&self.options));
        let outcome = coordinator.run(job, &specs, Arc::clone(&store)).await;

        let outcome = match outcome {
            FetchOutcome::Failure(failures) => {
                return Err(phase.fail(Error::ChunksFailed {
                    total: specs.len(),
                    failures,
                }));
            }
            success => success,
        };

        phase.enter(JobPhase::Reassembling);
        let destination = match Reassembler::new().reassemble(job, outcome).await {
            Ok(path) => path,
            Err(e) => return Err(phase.fail(e.into())),
        };
        drop(store);

        phase.enter(JobPhase::Done);
        tracing::info!(path = %destination.display(), bytes = job.total_len(), "download complete");
        Ok(destination)
    }

    fn scratch_root(&self, job: &DownloadJob) -> PathBuf {
        match &self.options.scratch_root {
            Some(root) => root.clone(),
            None => output_dir(job.destination()),
        }
    }
}

fn output_dir(destination: &Path) -> PathBuf {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Enforces the job lifecycle and reports each transition.
struct PhaseTracker<'a> {
    phase:       JobPhase,
    total_bytes: u64,
    options:     &'a FetchOptions,
}

impl<'a> PhaseTracker<'a> {
    fn new(options: &'a FetchOptions, total_bytes: u64) -> Self {
        let tracker = Self {
            phase: JobPhase::Probed,
            total_bytes,
            options,
        };
        tracker.report();
        tracker
    }

    fn enter(&mut self, next: JobPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transition {} -> {}",
            self.phase,
            next
        );
        tracing::debug!(from = %self.phase, to = %next, "job phase");
        self.phase = next;
        self.report();
    }

    fn fail(&mut self, error: Error) -> Error {
        tracing::error!(phase = %self.phase, %error, "job failed");
        self.enter(JobPhase::Failed);
        error
    }

    fn report(&self) {
        self.options.report(Progress::Phase {
            phase:       self.phase,
            total_bytes: self.total_bytes,
        });
    }
}
