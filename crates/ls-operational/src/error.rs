//! Operational-layer error type.

use thiserror::Error;

use ls_core::{AgentId, CoreError, LaneId, LateralDirection};
use ls_network::NetworkError;
use ls_schedule::ScheduleError;

/// Errors produced by `ls-operational`.
///
/// Every variant is a configuration or consistency failure; geometric
/// degeneracies and exhausted topology are recovered locally and never
/// surface here.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("agent {0} has no position on its reference lane")]
    NoReferencePosition(AgentId),

    #[error("from lane of agent {0} could not be determined during a lane change")]
    FromLaneUndetermined(AgentId),

    #[error("lane {lane} has no adjacent lane to the {direction}")]
    NoAdjacentLane { lane: LaneId, direction: LateralDirection },

    #[error("lane change of agent {agent} has a negative remaining distance {distance}")]
    NegativeFromDistance { agent: AgentId, distance: f64 },

    #[error("lane change requested without a direction")]
    MissingDirection,

    #[error("agent {0} defines no desired lane-change duration")]
    MissingLaneChangeDuration(AgentId),

    #[error("lane change needs forward motion, mean speed was {0}")]
    NoMotion(f64),

    #[error(transparent)]
    Geometry(#[from] CoreError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type PlanResult<T> = Result<T, PlanError>;
