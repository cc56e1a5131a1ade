//! Lanes and positions on them.

use ls_core::{LaneId, LateralDirection, Polyline};

/// One drivable lane.
///
/// Built through [`LaneNetworkBuilder`](crate::LaneNetworkBuilder); read-only
/// afterwards.
#[derive(Clone, Debug)]
pub struct Lane {
    pub id:         LaneId,
    pub centerline: Polyline,
    pub(crate) left:  Option<LaneId>,
    pub(crate) right: Option<LaneId>,
    pub(crate) next:  Vec<LaneId>,
    pub(crate) sink:  bool,
}

impl Lane {
    #[inline]
    pub fn length(&self) -> f64 {
        self.centerline.length()
    }

    /// Physically adjacent lane on `side`, if any.
    #[inline]
    pub fn adjacent(&self, side: LateralDirection) -> Option<LaneId> {
        match side {
            LateralDirection::Left => self.left,
            LateralDirection::Right => self.right,
        }
    }

    /// Successor lanes in the direction of travel.
    #[inline]
    pub fn next_lanes(&self) -> &[LaneId] {
        &self.next
    }

    /// Whether agents reaching the end of this lane leave the simulation.
    #[inline]
    pub fn is_sink(&self) -> bool {
        self.sink
    }

    /// Fraction of the length at `offset` metres (not clamped).
    #[inline]
    pub fn fraction(&self, offset: f64) -> f64 {
        offset / self.length()
    }

    /// Offset in metres at fraction `f` of the length.
    #[inline]
    pub fn offset(&self, f: f64) -> f64 {
        f * self.length()
    }
}

/// A longitudinal position on a lane.
///
/// `offset` may transiently exceed the lane length (long vehicles whose
/// reference point has passed the end) or be negative.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LanePosition {
    pub lane:   LaneId,
    pub offset: f64,
}

impl LanePosition {
    #[inline]
    pub fn new(lane: LaneId, offset: f64) -> Self {
        Self { lane, offset }
    }
}
