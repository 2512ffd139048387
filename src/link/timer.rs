// Lifecycle timers
//
// Two single-shot deadlines (advertisement loss, connect timeout). Every arm
// stamps the deadline with a fresh generation, so a deadline handed out
// before a cancel or re-arm no longer matches and fires as a no-op.

use std::time::Duration;
use tokio::time::Instant;

/// Which lifecycle timer a deadline belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    AdvertisementLoss,
    ConnectTimeout,
}

/// A scheduled expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    kind: TimerKind,
    at: Instant,
    generation: u64,
}

impl Deadline {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// When the deadline expires
    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if the deadline has passed at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.at <= now
    }
}

/// The two lifecycle timers
#[derive(Debug, Default)]
pub struct Timers {
    advertisement_loss: Option<Deadline>,
    connect_timeout: Option<Deadline>,
    next_generation: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<Deadline> {
        match kind {
            TimerKind::AdvertisementLoss => &mut self.advertisement_loss,
            TimerKind::ConnectTimeout => &mut self.connect_timeout,
        }
    }

    /// Arm (or re-arm) a timer to expire `after` from `now`
    pub fn arm(&mut self, kind: TimerKind, now: Instant, after: Duration) -> Deadline {
        self.next_generation += 1;
        let deadline = Deadline {
            kind,
            at: now + after,
            generation: self.next_generation,
        };
        *self.slot(kind) = Some(deadline);
        deadline
    }

    /// Cancel a timer; cancelling an idle timer is a no-op
    pub fn cancel(&mut self, kind: TimerKind) {
        *self.slot(kind) = None;
    }

    pub fn cancel_all(&mut self) {
        self.advertisement_loss = None;
        self.connect_timeout = None;
    }

    /// Check if a timer is armed
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed(kind).is_some()
    }

    /// Currently armed deadline of a timer
    pub fn armed(&self, kind: TimerKind) -> Option<Deadline> {
        match kind {
            TimerKind::AdvertisementLoss => self.advertisement_loss,
            TimerKind::ConnectTimeout => self.connect_timeout,
        }
    }

    /// Disarm `deadline` if it is still the armed one.
    ///
    /// Returns false for stale deadlines (cancelled, re-armed or already fired).
    pub fn take(&mut self, deadline: &Deadline) -> bool {
        let slot = self.slot(deadline.kind);
        if slot.as_ref() == Some(deadline) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Earliest armed deadline
    pub fn next(&self) -> Option<Deadline> {
        [self.advertisement_loss, self.connect_timeout]
            .into_iter()
            .flatten()
            .min_by_key(|d| d.at)
    }

    /// Armed deadlines that have passed at `now`, earliest first
    pub fn due(&self, now: Instant) -> Vec<Deadline> {
        let mut due: Vec<Deadline> = [self.advertisement_loss, self.connect_timeout]
            .into_iter()
            .flatten()
            .filter(|d| d.is_due(now))
            .collect();
        due.sort_by_key(|d| d.at);
        due
    }
}
