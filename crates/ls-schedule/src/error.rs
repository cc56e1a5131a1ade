//! Scheduling error type.

use thiserror::Error;

use ls_core::SimTime;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("cannot schedule at non-finite time {0}")]
    NonFiniteTime(SimTime),

    #[error("cannot schedule at {time}, which is before the current time {now}")]
    InPast { time: SimTime, now: SimTime },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
