//! Deterministic wakeup schedule.
//!
//! Stands in for `setTimeout`/`setInterval` style callbacks: owners schedule
//! tagged wakeups at absolute times, cancel them by handle, and the runtime
//! pops whatever is due. Nothing here sleeps; the caller decides when to
//! look, which keeps every state machine testable with a manual clock.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeDelta, Utc};

/// Handle returned when a wakeup is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeupHandle(u64);

/// A wakeup whose deadline has been reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueWakeup<K> {
    /// Handle the wakeup was scheduled under.
    pub handle: WakeupHandle,
    /// The deadline it was scheduled for.
    pub deadline: DateTime<Utc>,
    /// Owner-defined tag.
    pub kind: K,
}

/// Ordered set of pending wakeups.
///
/// Wakeups with equal deadlines fire in the order they were scheduled.
#[derive(Debug)]
pub struct Schedule<K> {
    next_seq: u64,
    entries: BTreeMap<(DateTime<Utc>, u64), K>,
    deadlines: HashMap<u64, DateTime<Utc>>,
}

impl<K> Default for Schedule<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Schedule<K> {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Schedules `kind` to fire at `deadline`.
    pub fn schedule_at(&mut self, deadline: DateTime<Utc>, kind: K) -> WakeupHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((deadline, seq), kind);
        self.deadlines.insert(seq, deadline);
        WakeupHandle(seq)
    }

    /// Schedules `kind` to fire `delay` after `now`.
    pub fn schedule_after(&mut self, now: DateTime<Utc>, delay: TimeDelta, kind: K) -> WakeupHandle {
        self.schedule_at(now + delay, kind)
    }

    /// Cancels a pending wakeup. Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: WakeupHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => self.entries.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    /// Whether `handle` is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: WakeupHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    /// Deadline of the earliest pending wakeup.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest wakeup if its deadline is at or
    /// before `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<DueWakeup<K>> {
        let (&(deadline, seq), _) = self.entries.first_key_value()?;
        if deadline > now {
            return None;
        }
        let kind = self.entries.remove(&(deadline, seq))?;
        self.deadlines.remove(&seq);
        Some(DueWakeup {
            handle: WakeupHandle(seq),
            deadline,
            kind,
        })
    }

    /// Number of pending wakeups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates pending wakeups in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (DateTime<Utc>, &K)> {
        self.entries.iter().map(|((deadline, _), kind)| (*deadline, kind))
    }
}
