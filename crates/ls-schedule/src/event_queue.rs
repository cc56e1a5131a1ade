//! `EventQueue` — a time-ordered queue of pending events.
//!
//! # Ordering
//!
//! Events are kept in a `BTreeMap` keyed by [`SimTime`] (totally ordered),
//! with a FIFO per instant.  Events scheduled for the same time are
//! delivered in insertion order, so `schedule_now` from inside a handler runs
//! after everything already due.
//!
//! Popping an event advances [`now`](Scheduler::now) to its time; time never
//! runs backwards.

use std::collections::{BTreeMap, VecDeque};

use ls_core::SimTime;

use crate::{ScheduleError, ScheduleResult, Scheduler};

/// A priority queue mapping simulation times → events due at that time.
pub struct EventQueue<E> {
    inner: BTreeMap<SimTime, VecDeque<E>>,
    now:   SimTime,
    /// Cached total event count for O(1) `len()`.
    total: usize,
}

impl<E> EventQueue<E> {
    /// An empty queue whose clock starts at `start`.
    pub fn new(start: SimTime) -> Self {
        Self { inner: BTreeMap::new(), now: start, total: 0 }
    }

    /// Remove and return the earliest event, advancing the clock to its time.
    pub fn pop_next(&mut self) -> Option<(SimTime, E)> {
        let mut entry = self.inner.first_entry()?;
        let time = *entry.key();
        let event = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        let event = event?;
        self.total -= 1;
        self.now = time;
        Some((time, event))
    }

    /// The earliest time with at least one queued event, or `None` if empty.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    /// Total number of queued events.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future instants with at least one queued event.
    pub fn time_count(&self) -> usize {
        self.inner.len()
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new(SimTime::ZERO)
    }
}

impl<E> Scheduler for EventQueue<E> {
    type Event = E;

    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule_at(&mut self, time: SimTime, event: E) -> ScheduleResult<()> {
        if !time.is_finite() {
            return Err(ScheduleError::NonFiniteTime(time));
        }
        if time < self.now {
            return Err(ScheduleError::InPast { time, now: self.now });
        }
        self.inner.entry(time).or_default().push_back(event);
        self.total += 1;
        Ok(())
    }
}
