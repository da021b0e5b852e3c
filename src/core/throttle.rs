//! Rate-limited coalescing of repository hits into progress batches

use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

/// Buffers hits between progress deliveries
///
/// With a zero interval every group of hits is handed back immediately.
/// Otherwise the first hit into an empty buffer opens a window of
/// `interval`; everything that arrives before the window closes is
/// delivered as one batch.
#[derive(Debug)]
pub struct ThrottleBuffer {
    interval: Duration,
    pending: Vec<PathBuf>,
    deadline: Option<Instant>,
}

impl ThrottleBuffer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: Vec::new(),
            deadline: None,
        }
    }

    pub fn is_immediate(&self) -> bool {
        self.interval.is_zero()
    }

    /// Adds a group of hits
    ///
    /// Returns the batch to deliver now when the buffer is in immediate
    /// mode; in throttled mode the hits wait for the window to close.
    pub fn add<I>(&mut self, hits: I, now: Instant) -> Option<Vec<PathBuf>>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let was_empty = self.pending.is_empty();
        self.pending.extend(hits);
        if self.pending.is_empty() {
            return None;
        }

        if self.is_immediate() {
            return self.flush();
        }

        if was_empty {
            self.deadline = Some(now + self.interval);
        }
        None
    }

    /// When the open window closes, if one is open
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Takes the pending batch if its window has closed by `now`
    pub fn take_due(&mut self, now: Instant) -> Option<Vec<PathBuf>> {
        match self.deadline {
            Some(deadline) if deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Takes whatever is pending regardless of the window
    pub fn flush(&mut self) -> Option<Vec<PathBuf>> {
        self.deadline = None;
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
