/// Named-timer scheduler for the auto-cycle coordinator.
///
/// The coordinator needs exactly three timers: the repeating advance tick,
/// the one-shot settle delay after a camera move, and the one-shot delayed
/// stop. Giving each a name and letting `arm` replace the previous deadline
/// makes the "every timer handle is tracked and cleared before a new one is
/// armed" rule structural — duplicate overlapping timers cannot exist.
///
/// Deadlines are plain `DateTime<Utc>` values supplied by the caller, so
/// tests drive the scheduler with a fixed fake clock.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Timer identifiers
// ---------------------------------------------------------------------------

/// The coordinator's timers. Variant order doubles as the tie-break priority
/// when two timers share a deadline: a settle must resolve before the tick
/// that would immediately un-settle it, and a due stop beats a due tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerId {
    Settle,
    DelayedStop,
    Tick,
}

const ALL_TIMERS: [TimerId; 3] = [TimerId::Settle, TimerId::DelayedStop, TimerId::Tick];

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// One optional deadline per named timer.
#[derive(Debug, Default)]
pub struct Scheduler {
    settle: Option<DateTime<Utc>>,
    delayed_stop: Option<DateTime<Utc>>,
    tick: Option<DateTime<Utc>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    /// Arms (or re-arms) a timer. Any previous deadline for the same timer
    /// is discarded.
    pub fn arm(&mut self, id: TimerId, deadline: DateTime<Utc>) {
        *self.slot_mut(id) = Some(deadline);
    }

    /// Cancels a timer if armed.
    pub fn cancel(&mut self, id: TimerId) {
        *self.slot_mut(id) = None;
    }

    /// Cancels every timer.
    pub fn clear(&mut self) {
        self.settle = None;
        self.delayed_stop = None;
        self.tick = None;
    }

    /// Current deadline of a timer, if armed.
    pub fn deadline(&self, id: TimerId) -> Option<DateTime<Utc>> {
        self.slot(id)
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slot(id).is_some()
    }

    /// Earliest armed deadline, if any. The daemon sleeps until this.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        ALL_TIMERS.iter().filter_map(|&id| self.slot(id)).min()
    }

    /// Removes and returns every timer due at or before `now`, ordered by
    /// deadline (ties broken by `TimerId` order). Callbacks therefore fire
    /// in the same order a real timer queue would run them.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<TimerId> {
        let mut due: Vec<(DateTime<Utc>, TimerId)> = ALL_TIMERS
            .iter()
            .filter_map(|&id| self.slot(id).filter(|d| *d <= now).map(|d| (d, id)))
            .collect();
        due.sort();
        for &(_, id) in &due {
            self.cancel(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    fn slot(&self, id: TimerId) -> Option<DateTime<Utc>> {
        match id {
            TimerId::Settle => self.settle,
            TimerId::DelayedStop => self.delayed_stop,
            TimerId::Tick => self.tick,
        }
    }

    fn slot_mut(&mut self, id: TimerId) -> &mut Option<DateTime<Utc>> {
        match id {
            TimerId::Settle => &mut self.settle,
            TimerId::DelayedStop => &mut self.delayed_stop,
            TimerId::Tick => &mut self.tick,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
