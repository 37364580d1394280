use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a download job.
///
/// `Probed → Partitioned → Fetching → Reassembling → Done`, with `Failed`
/// reachable from every non-terminal phase. No phase is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    /// Metadata is known; nothing has been planned yet.
    #[default]
    Probed,

    /// Byte ranges are planned.
    Partitioned,

    /// Range requests are in flight.
    Fetching,

    /// Every chunk arrived; scratch slots are being concatenated.
    Reassembling,

    /// The output artifact is in place.
    Done,

    /// The job stopped without producing output.
    Failed,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool { matches!(self, JobPhase::Done | JobPhase::Failed) }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: JobPhase) -> bool {
        use JobPhase::*;
        matches!(
            (self, next),
            (Probed, Partitioned)
                | (Partitioned, Fetching)
                | (Fetching, Reassembling)
                | (Reassembling, Done)
                | (Probed | Partitioned | Fetching | Reassembling, Failed)
        )
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPhase::Probed => write!(f, "Probed"),
            JobPhase::Partitioned => write!(f, "Partitioned"),
            JobPhase::Fetching => write!(f, "Fetching"),
            JobPhase::Reassembling => write!(f, "Reassembling"),
            JobPhase::Done => write!(f, "Done"),
            JobPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Observer events emitted while a job runs.
///
/// Byte counts are deltas so that events from concurrent chunks can be summed
/// by the receiver without coordination.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// The job entered a new phase. `total_bytes` is the resource length.
    Phase { phase: JobPhase, total_bytes: u64 },

    /// Bytes of one chunk were written to its scratch slot.
    ChunkBytes { index: u32, bytes: u64 },

    /// A chunk attempt failed and will be retried after `delay`. The
    /// `discarded` bytes of the failed attempt were thrown away.
    ChunkRetry {
        index:     u32,
        attempt:   u32,
        delay:     Duration,
        discarded: u64,
    },

    /// A chunk reached its final state.
    ChunkFinished { index: u32, success: bool },
}

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            JobPhase::Probed,
            JobPhase::Partitioned,
            JobPhase::Fetching,
            JobPhase::Reassembling,
            JobPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_terminal_phases_are_final() {
        for next in [JobPhase::Probed, JobPhase::Fetching, JobPhase::Done, JobPhase::Failed] {
            assert!(!JobPhase::Done.can_advance_to(next));
            assert!(!JobPhase::Failed.can_advance_to(next));
        }
        assert!(JobPhase::Done.is_terminal());
        assert!(JobPhase::Failed.is_terminal());
        assert!(!JobPhase::Fetching.is_terminal());
    }

    #[test]
    fn test_no_phase_is_skipped_or_revisited() {
        assert!(!JobPhase::Probed.can_advance_to(JobPhase::Fetching));
        assert!(!JobPhase::Fetching.can_advance_to(JobPhase::Done));
        assert!(!JobPhase::Reassembling.can_advance_to(JobPhase::Fetching));
        assert!(!JobPhase::Fetching.can_advance_to(JobPhase::Fetching));
    }

    #[test]
    fn test_any_running_phase_can_fail() {
        for phase in [
            JobPhase::Probed,
            JobPhase::Partitioned,
            JobPhase::Fetching,
            JobPhase::Reassembling,
        ] {
            assert!(phase.can_advance_to(JobPhase::Failed));
        }
    }
}
