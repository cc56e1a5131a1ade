//! `Vehicle` — a self-contained [`LaneBasedAgent`].
//!
//! Keeps its own kinematics and lane registrations and follows plans by
//! sampling them.  Applications with their own agent storage implement
//! [`LaneBasedAgent`] directly instead; `Vehicle` drives the demos and tests.

use rustc_hash::{FxHashMap, FxHashSet};

use ls_core::{AgentId, LaneId, LateralDirection, OrientedPoint, Point2};
use ls_network::{LaneNetwork, LanePosition};

use crate::{AgentParameters, LaneBasedAgent, Plan, PlanError, PlanResult};

#[derive(Clone, Debug)]
pub struct Vehicle {
    id:           AgentId,
    length:       f64,
    front:        f64,
    speed:        f64,
    acceleration: f64,
    location:     OrientedPoint,
    reference:    LaneId,
    /// Reference-point offset on every registered lane.
    positions:    FxHashMap<LaneId, f64>,
    /// Lanes the route may use; `None` accepts any successor.
    route:        Option<FxHashSet<LaneId>>,
    parameters:   AgentParameters,
    removed:      bool,
}

impl Vehicle {
    /// A vehicle at `position`, reference point at its centre.
    pub fn new(
        id:       AgentId,
        length:   f64,
        network:  &LaneNetwork,
        position: LanePosition,
        speed:    f64,
    ) -> PlanResult<Self> {
        let location = network.lane(position.lane)?.centerline.location_extended(position.offset);
        let mut positions = FxHashMap::default();
        positions.insert(position.lane, position.offset);
        Ok(Self {
            id,
            length,
            front: length / 2.0,
            speed,
            acceleration: 0.0,
            location,
            reference: position.lane,
            positions,
            route: None,
            parameters: AgentParameters::default(),
            removed: false,
        })
    }

    /// A vehicle on the lane nearest to `point`.
    pub fn place(
        id:      AgentId,
        length:  f64,
        network: &LaneNetwork,
        point:   Point2,
        speed:   f64,
    ) -> PlanResult<Self> {
        let position = network.snap_to_lane(point).ok_or(PlanError::NoReferencePosition(id))?;
        Self::new(id, length, network, position, speed)
    }

    pub fn with_front(mut self, front: f64) -> Self {
        self.front = front;
        self
    }

    pub fn with_parameters(mut self, parameters: AgentParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Restrict route choices to `lanes`.
    pub fn with_route(mut self, lanes: impl IntoIterator<Item = LaneId>) -> Self {
        self.route = Some(lanes.into_iter().collect());
        self
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn reference_lane(&self) -> LaneId {
        self.reference
    }

    /// Follow `plan` for `elapsed` seconds from its start.
    ///
    /// Updates pose and kinematics from the plan and advances every lane
    /// registration by the distance covered, crossing onto successor lanes.
    pub fn execute(&mut self, network: &LaneNetwork, plan: &Plan, elapsed: f64) -> PlanResult<()> {
        let elapsed = elapsed.clamp(0.0, plan.duration());
        let time = plan.start_time() + elapsed;
        let covered = plan.profile().distance_at(elapsed);
        self.location = plan.location_at(time);
        self.speed = plan.speed_at(time);
        self.acceleration = plan.acceleration_at(time);

        let mut advanced = FxHashMap::default();
        let mut reference = self.reference;
        for (&lane, &offset) in &self.positions {
            let (l, o) = self.advance(network, lane, offset + covered)?;
            if lane == self.reference {
                reference = l;
            }
            advanced.insert(l, o);
        }
        self.positions = advanced;
        self.reference = reference;
        Ok(())
    }

    fn advance(&self, network: &LaneNetwork, mut lane: LaneId, mut offset: f64) -> PlanResult<(LaneId, f64)> {
        loop {
            let length = network.lane(lane)?.length();
            if offset <= length {
                break;
            }
            let next = self
                .next_lane_for_route(network, lane)
                .or_else(|| network.next_lanes(lane).first().copied());
            match next {
                Some(n) => {
                    offset -= length;
                    lane = n;
                }
                None => break,
            }
        }
        Ok((lane, offset))
    }

    /// Registrations moved onto the `direction` neighbours by projecting each
    /// registered point sideways.  Lanes without such a neighbour are left out.
    fn shifted(&self, network: &LaneNetwork, direction: LateralDirection) -> PlanResult<FxHashMap<LaneId, f64>> {
        let mut shifted = FxHashMap::default();
        for (&lane, &offset) in &self.positions {
            if let Some(adj) = network.adjacent_lane(lane, direction) {
                let at = network.lane(lane)?.centerline.location_extended(offset).point();
                let adj = network.lane(adj)?;
                let f = adj.centerline.project_fractional(at);
                let f = if f.is_nan() { network.lane(lane)?.fraction(offset) } else { f };
                shifted.insert(adj.id, adj.offset(f));
            }
        }
        Ok(shifted)
    }
}

impl LaneBasedAgent for Vehicle {
    fn id(&self) -> AgentId {
        self.id
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn front(&self) -> f64 {
        self.front
    }

    fn speed(&self) -> f64 {
        self.speed
    }

    fn acceleration(&self) -> f64 {
        self.acceleration
    }

    fn location(&self) -> OrientedPoint {
        self.location
    }

    fn parameters(&self) -> &AgentParameters {
        &self.parameters
    }

    fn reference_position(&self) -> PlanResult<LanePosition> {
        self.positions
            .get(&self.reference)
            .map(|&offset| LanePosition::new(self.reference, offset))
            .ok_or(PlanError::NoReferencePosition(self.id))
    }

    fn positions(&self) -> &FxHashMap<LaneId, f64> {
        &self.positions
    }

    fn next_lanes_for_route(&self, network: &LaneNetwork, lane: LaneId) -> Vec<LaneId> {
        network
            .next_lanes(lane)
            .iter()
            .copied()
            .filter(|l| self.route.as_ref().is_none_or(|r| r.contains(l)))
            .collect()
    }

    fn init_lane_change(&mut self, network: &LaneNetwork, direction: LateralDirection) -> PlanResult<()> {
        if network.adjacent_lane(self.reference, direction).is_none() {
            return Err(PlanError::NoAdjacentLane { lane: self.reference, direction });
        }
        let added = self.shifted(network, direction)?;
        self.positions.extend(added);
        Ok(())
    }

    fn finalize_lane_change(&mut self, network: &LaneNetwork, direction: LateralDirection) -> PlanResult<()> {
        let from: Vec<LaneId> = self
            .positions
            .keys()
            .copied()
            .filter(|&lane| {
                network
                    .adjacent_lane(lane, direction)
                    .is_some_and(|adj| self.positions.contains_key(&adj))
            })
            .collect();
        if from.contains(&self.reference) {
            if let Some(adj) = network.adjacent_lane(self.reference, direction) {
                self.reference = adj;
            }
        }
        for lane in from {
            self.positions.remove(&lane);
        }
        Ok(())
    }

    fn change_lane_instantaneously(&mut self, network: &LaneNetwork, direction: LateralDirection) -> PlanResult<()> {
        let target = network
            .adjacent_lane(self.reference, direction)
            .ok_or(PlanError::NoAdjacentLane { lane: self.reference, direction })?;
        self.positions = self.shifted(network, direction)?;
        self.reference = target;
        if let Some(&offset) = self.positions.get(&target) {
            self.location = network.lane(target)?.centerline.location_extended(offset);
        }
        Ok(())
    }

    fn remove_from_simulation(&mut self) {
        self.removed = true;
    }
}
