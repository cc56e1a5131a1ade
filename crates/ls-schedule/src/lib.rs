//! `ls-schedule` — deferred events for the operational layer.
//!
//! The planners never advance time themselves.  When a lane change is due to
//! complete part-way through a plan they hand a finalization event to a
//! [`Scheduler`], and the simulation loop delivers it when simulated time
//! reaches that instant.
//!
//! # Crate layout
//!
//! | Module          | Contents                                           |
//! |-----------------|----------------------------------------------------|
//! | [`scheduler`]   | `Scheduler` trait                                  |
//! | [`event_queue`] | `EventQueue<E>`: in-memory `Scheduler`             |
//! | [`error`]       | `ScheduleError`, `ScheduleResult`                  |

pub mod error;
pub mod event_queue;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use event_queue::EventQueue;
pub use scheduler::Scheduler;
