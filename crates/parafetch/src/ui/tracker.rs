use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use parafetch_fetch::data::ProgressCallback;
use parafetch_fetch::{JobPhase, Progress};

pub trait Tracker<Inc> {
    fn step(&self, step: Inc) -> &Self;
    fn finish(&self, msg: Option<String>);
}

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Byte progress of one download, fed by the job's progress events.
pub struct DownloadTracker {
    pb: ProgressBar,
}

impl DownloadTracker {
    pub fn new(prefix: &str) -> Self { Self::with_bar(ProgressBar::no_length(), prefix) }

    fn with_bar(pb: ProgressBar, prefix: &str) -> Self {
        let pb = if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.with_style(style.clone())
        } else {
            pb
        };
        pb.set_prefix(prefix.to_string());
        Self { pb }
    }

    /// A progress callback that forwards every event to this tracker.
    pub fn observer(self: &Arc<Self>) -> ProgressCallback {
        let tracker = Arc::clone(self);
        Arc::new(move |event: &Progress| {
            tracker.step(event);
        })
    }

    pub fn abandon(&self) { self.pb.abandon_with_message("failed"); }
}

impl Tracker<&Progress> for DownloadTracker {
    fn step(&self, event: &Progress) -> &Self {
        match *event {
            Progress::Phase {
                phase: JobPhase::Probed,
                total_bytes,
            } => self.pb.set_length(total_bytes),
            Progress::Phase { phase, .. } => self.pb.set_message(phase.to_string().to_lowercase()),
            Progress::ChunkBytes { bytes, .. } => self.pb.inc(bytes),
            Progress::ChunkRetry {
                index,
                attempt,
                discarded,
                ..
            } => {
                self.pb.dec(discarded);
                self.pb
                    .set_message(format!("retrying chunk {index} (attempt {attempt})"));
            }
            Progress::ChunkFinished { .. } => {}
        }
        self
    }

    fn finish(&self, msg: Option<String>) {
        if let Some(msg) = msg {
            self.pb.finish_with_message(msg);
        }
        self.pb.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn hidden() -> DownloadTracker { DownloadTracker::with_bar(ProgressBar::hidden(), "test") }

    #[test]
    fn test_template_is_valid() { assert!(PB_TEMPLATE.is_some()); }

    #[test]
    fn test_bytes_accumulate() {
        let tracker = hidden();
        tracker
            .step(&Progress::Phase {
                phase:       JobPhase::Probed,
                total_bytes: 100,
            })
            .step(&Progress::ChunkBytes { index: 0, bytes: 40 })
            .step(&Progress::ChunkBytes { index: 1, bytes: 25 });

        assert_eq!(tracker.pb.length(), Some(100));
        assert_eq!(tracker.pb.position(), 65);
    }

    #[test]
    fn test_retry_discards_bytes() {
        let tracker = hidden();
        tracker
            .step(&Progress::ChunkBytes { index: 0, bytes: 30 })
            .step(&Progress::ChunkRetry {
                index:     0,
                attempt:   1,
                delay:     Duration::from_millis(100),
                discarded: 10,
            });
        assert_eq!(tracker.pb.position(), 20);
    }

    #[test]
    fn test_observer_forwards_events() {
        let tracker = Arc::new(hidden());
        let observer = tracker.observer();
        observer(&Progress::ChunkBytes { index: 3, bytes: 7 });
        assert_eq!(tracker.pb.position(), 7);
    }
}
