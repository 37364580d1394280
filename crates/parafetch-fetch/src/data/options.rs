use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::progress::{Progress, ProgressCallback};

/// Number of parallel range requests when none is configured.
pub const DEFAULT_WORKERS: u32 = 10;

/// Configuration for a segmented download.
///
/// # Examples
///
/// ```
/// use parafetch_fetch::data::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default()
///     .workers(8)
///     .max_retries(5)
///     .retry_backoff(Duration::from_millis(200))
///     .header("User-Agent", "parafetch");
/// ```
#[derive(Clone)]
pub struct FetchOptions {
    /// Requested number of byte ranges fetched in parallel.
    ///
    /// Fewer ranges are planned when the resource is shorter than this.
    ///
    /// Default: 10
    pub workers: u32,

    /// Retries per chunk after the initial attempt.
    ///
    /// - Triggered by transport errors, short bodies, 5xx, 408 and 429
    /// - Other statuses fail the chunk immediately
    /// - Total attempts per chunk = 1 + max_retries
    ///
    /// Default: 3
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries of one chunk.
    ///
    /// The delay before retry N (0-based) is `retry_backoff * 2^N`.
    ///
    /// Default: 100ms
    pub retry_backoff: Duration,

    /// Cancel all in-flight chunks as soon as one fails permanently.
    ///
    /// Default: true
    pub cancel_on_failure: bool,

    /// Existing directory under which the per-job scratch store is created.
    ///
    /// Default: None (the destination's directory)
    pub scratch_root: Option<PathBuf>,

    /// Extra HTTP headers sent with the probe and every range request.
    ///
    /// Default: empty
    pub headers: Arc<[(String, String)]>,

    /// Progress observer, invoked from every fetch unit.
    ///
    /// Default: None
    pub on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("workers", &self.workers)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("cancel_on_failure", &self.cancel_on_failure)
            .field("scratch_root", &self.scratch_root)
            .field("headers", &self.headers)
            .field("on_progress", &"{ ... }")
            .finish()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
            cancel_on_failure: true,
            scratch_root: None,
            headers: Arc::new([]),
            on_progress: None,
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn workers(mut self, workers: u32) -> Self {
        self.workers = workers;
        self
    }

    /// Set the per-chunk retry budget. `0` disables retries.
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    #[must_use]
    pub fn cancel_on_failure(mut self, cancel_on_failure: bool) -> Self {
        self.cancel_on_failure = cancel_on_failure;
        self
    }

    #[must_use]
    pub fn scratch_root(mut self, scratch_root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(scratch_root.into());
        self
    }

    /// Add a single HTTP header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    /// Set the progress observer.
    ///
    /// # Examples
    ///
    /// ```
    /// use parafetch_fetch::data::{FetchOptions, Progress};
    /// use std::sync::Arc;
    ///
    /// let options = FetchOptions::default().on_progress(Arc::new(|progress| {
    ///     if let Progress::Phase { phase, .. } = progress {
    ///         println!("now {phase}");
    ///     }
    /// }));
    /// ```
    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.on_progress {
            callback(&progress);
        }
    }
}
