//! Network error type.

use thiserror::Error;

use ls_core::{CoreError, LaneId};

/// Errors produced by `ls-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("lane {0} not found in network")]
    LaneNotFound(LaneId),

    #[error("lane {from} ends {gap} m away from the start of successor {to}")]
    Disconnected { from: LaneId, to: LaneId, gap: f64 },

    #[error("lane {0} cannot be adjacent to itself")]
    SelfAdjacent(LaneId),

    #[error(transparent)]
    Geometry(#[from] CoreError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
