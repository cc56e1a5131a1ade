//! The `LaneBasedAgent` trait — what the planners need from an agent.
//!
//! Agents are owned by the application.  The planners read their kinematics
//! and lane registrations, ask them for route choices, and call back into
//! them when a maneuver starts, completes, or must be cut short.  Lane
//! registrations are keyed by `LaneId` in an `FxHashMap`: during a lane
//! change an agent is registered on both the from-lane and the to-lane.

use rustc_hash::FxHashMap;

use ls_core::{AgentId, LaneId, LateralDirection, OrientedPoint};
use ls_network::{LaneNetwork, LanePosition};

use crate::PlanResult;

// ── Parameters ────────────────────────────────────────────────────────────────

/// Per-agent behavioural defaults consulted by the operational layer.
///
/// Fields are optional where the planners have a documented fallback.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentParameters {
    /// Standstill gap s0 (m) kept to a leader.  Missing → 0.
    pub stopping_distance: Option<f64>,
    /// Comfortable deceleration b (m/s², positive).  Missing → 0.
    pub comfortable_deceleration: Option<f64>,
    /// Desired lane-change duration (s).  Required for lane changes.
    pub lane_change_duration: Option<f64>,
    /// Hop between lanes within one step instead of interpolating.
    pub instant_lane_changes: bool,
}

impl Default for AgentParameters {
    fn default() -> Self {
        Self {
            stopping_distance:        Some(3.0),
            comfortable_deceleration: Some(2.09),
            lane_change_duration:     Some(3.0),
            instant_lane_changes:     false,
        }
    }
}

/// Perceived ego speed and acceleration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EgoKinematics {
    pub speed:        f64,
    pub acceleration: f64,
}

/// The gap an agent would merge into, as seen from the agent.
///
/// `distance` is the net headway to the leader on the target lane; a leader
/// with unknown kinematics is treated as standing still.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GapInfo {
    pub distance:     f64,
    pub speed:        Option<f64>,
    pub acceleration: Option<f64>,
}

impl GapInfo {
    pub fn new(distance: f64, speed: f64, acceleration: f64) -> Self {
        Self { distance, speed: Some(speed), acceleration: Some(acceleration) }
    }
}

// ── LaneBasedAgent ────────────────────────────────────────────────────────────

/// An agent moving on the lane network.
///
/// # Required methods
///
/// Everything except [`ego_kinematics`](Self::ego_kinematics) and
/// [`next_lane_for_route`](Self::next_lane_for_route), which have defaults.
///
/// # Lane-change hooks
///
/// [`init_lane_change`](Self::init_lane_change) is called once when a
/// maneuver starts and must register the agent on the adjacent lanes;
/// [`finalize_lane_change`](Self::finalize_lane_change) is delivered later
/// through the scheduler and must drop the from-lanes.
pub trait LaneBasedAgent {
    fn id(&self) -> AgentId;

    /// Vehicle length (m).
    fn length(&self) -> f64;

    /// Distance (m) from the reference point to the front of the vehicle.
    fn front(&self) -> f64;

    fn speed(&self) -> f64;

    fn acceleration(&self) -> f64;

    /// Current pose.
    fn location(&self) -> OrientedPoint;

    fn parameters(&self) -> &AgentParameters;

    /// Kinematics as perceived by the agent itself.  Default: none, so the
    /// planners fall back to [`speed`](Self::speed) and
    /// [`acceleration`](Self::acceleration).
    fn ego_kinematics(&self) -> Option<EgoKinematics> {
        None
    }

    /// Position of the reference point on the reference lane.
    fn reference_position(&self) -> PlanResult<LanePosition>;

    /// Offsets of the reference point on every lane the agent is registered on.
    fn positions(&self) -> &FxHashMap<LaneId, f64>;

    /// Successors of `lane` that keep the agent on its route.
    fn next_lanes_for_route(&self, network: &LaneNetwork, lane: LaneId) -> Vec<LaneId>;

    /// The successor of `lane` the agent will take.  Default: the first
    /// route-compatible successor.
    fn next_lane_for_route(&self, network: &LaneNetwork, lane: LaneId) -> Option<LaneId> {
        self.next_lanes_for_route(network, lane).first().copied()
    }

    /// A lane change towards `direction` starts.
    fn init_lane_change(
        &mut self,
        network:   &LaneNetwork,
        direction: LateralDirection,
    ) -> PlanResult<()>;

    /// The lane change towards `direction` has completed.
    fn finalize_lane_change(
        &mut self,
        network:   &LaneNetwork,
        direction: LateralDirection,
    ) -> PlanResult<()>;

    /// Move to the adjacent lane(s) on `direction` within the current step.
    fn change_lane_instantaneously(
        &mut self,
        network:   &LaneNetwork,
        direction: LateralDirection,
    ) -> PlanResult<()>;

    /// Take the agent out of the simulation.
    fn remove_from_simulation(&mut self);
}
