//! The `Scheduler` trait — the seam between planners and the simulation loop.

use ls_core::SimTime;

use crate::ScheduleResult;

/// Accepts events for delivery at a future simulated time.
///
/// Implementations must reject non-finite times and times before
/// [`now`](Self::now) with a [`ScheduleError`](crate::ScheduleError).
pub trait Scheduler {
    type Event;

    /// The current simulated time.
    fn now(&self) -> SimTime;

    /// Deliver `event` at `time`.
    fn schedule_at(&mut self, time: SimTime, event: Self::Event) -> ScheduleResult<()>;

    /// Deliver `event` at the current time, after events already queued for it.
    fn schedule_now(&mut self, event: Self::Event) -> ScheduleResult<()> {
        let now = self.now();
        self.schedule_at(now, event)
    }
}
