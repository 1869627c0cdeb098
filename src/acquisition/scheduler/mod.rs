//! Cyclic poll scheduler: one diagnostic request per due tick,
//! round-robin over the fixed roster. "Waiting" for a response is state
//! carried across ticks, never a blocking call.
use crate::protocol::pid::{Pid, POLL_ROSTER};
use embassy_time::{Duration, Instant};

/// Interval between two consecutive roster requests. With twelve
/// entries this yields a fixed 1.2 s full-roster period.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Round-robin scheduler over [`POLL_ROSTER`].
///
/// State machine: idle → awaiting-response → idle. The transition back
/// happens either when the matching response lands ([`complete`]) or
/// when the next request supersedes the unanswered one ([`advance`]).
///
/// [`complete`]: PollScheduler::complete
/// [`advance`]: PollScheduler::advance
#[derive(Debug, Clone, Copy)]
pub struct PollScheduler {
    /// Next roster entry to request.
    cursor: usize,
    /// Dispatch time of the most recent request.
    last_request: Option<Instant>,
    /// Request still awaiting its response, if any.
    outstanding: Option<Pid>,
}

impl PollScheduler {
    /// Scheduler at the start of the roster with nothing in flight.
    pub const fn new() -> Self {
        Self {
            cursor: 0,
            last_request: None,
            outstanding: None,
        }
    }

    /// True when the inter-request interval has elapsed since the last
    /// dispatch (or nothing was ever requested).
    pub fn due(&self, now: Instant) -> bool {
        match self.last_request {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= POLL_INTERVAL,
        }
    }

    /// Select the roster entry at the cursor, advance modulo roster
    /// size, and mark the entry outstanding.
    ///
    /// A previous request that never got answered is superseded here
    /// without raising an error; the freshness predicate is the only
    /// signal such a gap leaves behind.
    pub fn advance(&mut self, now: Instant) -> Pid {
        let pid = POLL_ROSTER[self.cursor];
        self.cursor = (self.cursor + 1) % POLL_ROSTER.len();
        self.last_request = Some(now);
        self.outstanding = Some(pid);
        pid
    }

    /// Parameter currently awaiting its response.
    pub fn outstanding(&self) -> Option<Pid> {
        self.outstanding
    }

    /// Mark the outstanding request answered.
    pub fn complete(&mut self) {
        self.outstanding = None;
    }

    /// Return to the initial state: cursor at the roster start, no
    /// request in flight.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new()
    }
}
