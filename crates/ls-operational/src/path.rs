//! Forward paths along lane centerlines.

use tracing::{error, warn};

use ls_core::{LaneId, LateralDirection, Polyline};
use ls_network::{Lane, LaneNetwork};

use crate::{LaneBasedAgent, PlanResult, PlanningContext};

// ── Continuation ──────────────────────────────────────────────────────────────

/// What lies beyond the end of a lane for a given agent.
///
/// Evaluated once each time a path crosses a lane boundary.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Continuation {
    /// The route continues on this lane.
    Lane(LaneId),
    /// The lane ends in a sink; the agent leaves the simulation there.
    Sink,
    /// Nothing follows.
    DeadEnd,
}

impl Continuation {
    /// Classify the end of `lane` given the successor chosen for the agent.
    pub fn resolve(next: Option<LaneId>, lane: &Lane) -> Self {
        match next {
            Some(next) => Continuation::Lane(next),
            None if lane.is_sink() => Continuation::Sink,
            None => Continuation::DeadEnd,
        }
    }
}

enum Forward {
    Done(Polyline),
    DeadEnd { lane: LaneId, partial: Option<Polyline> },
}

// ── PathAlongLaneBuilder ──────────────────────────────────────────────────────

/// Builds the path of an agent that keeps its lane.
pub struct PathAlongLaneBuilder;

impl PathAlongLaneBuilder {
    /// Path of exactly `target_distance` metres from the agent's reference
    /// position along the centerlines of the lanes on its route.
    ///
    /// At a lane without continuation the path is extended straight if the
    /// lane ends in a sink.  At a dead end the agent is shifted onto an
    /// adjacent lane whose route continues, and the path rebuilt; when no
    /// such lane exists the agent is removed from the simulation and the
    /// partial path returned.
    pub fn build_forward_path<A: LaneBasedAgent + ?Sized>(
        ctx:             &PlanningContext<'_>,
        agent:           &mut A,
        target_distance: f64,
    ) -> PlanResult<Polyline> {
        let mut shifts = 0;
        loop {
            let (lane, partial) = match Self::walk(ctx, agent, target_distance)? {
                Forward::Done(path) => return Ok(path),
                Forward::DeadEnd { lane, partial } => (lane, partial),
            };

            if shifts < ctx.config.maximum_forced_shifts {
                if let Some(side) = escape_side(ctx.network, agent, lane) {
                    warn!(agent = %agent.id(), lane = %lane, %side, "lane ends off-route, forcing lateral shift");
                    agent.change_lane_instantaneously(ctx.network, side)?;
                    shifts += 1;
                    continue;
                }
            }

            error!(agent = %agent.id(), lane = %lane, "no continuation at end of lane, removing agent");
            agent.remove_from_simulation();
            return match partial {
                Some(path) => Ok(path),
                None => {
                    let at = agent.location();
                    Ok(Polyline::from_endpoints(at.point(), at.ahead(ctx.config.standstill_path_length))?)
                }
            };
        }
    }

    fn walk<A: LaneBasedAgent + ?Sized>(
        ctx:    &PlanningContext<'_>,
        agent:  &A,
        target: f64,
    ) -> PlanResult<Forward> {
        let network = ctx.network;
        let margin = ctx.config.lane_margin;
        let reference = agent.reference_position()?;
        let mut lane = network.lane(reference.lane)?;
        let mut offset = reference.offset;

        // Long vehicles: the reference point may already be past the lane end.
        while offset > lane.length() {
            match Continuation::resolve(agent.next_lane_for_route(network, lane.id), lane) {
                Continuation::Lane(next) => {
                    offset -= lane.length();
                    lane = network.lane(next)?;
                }
                _ => break,
            }
        }

        let start = lane.fraction(offset).clamp(0.0, 1.0);
        let mut path = if (1.0 - start) * lane.length() > f64::EPSILON {
            Some(lane.centerline.extract_fractional(start, 1.0)?)
        } else {
            None
        };

        let mut joins = 0;
        loop {
            let length = path.as_ref().map_or(0.0, Polyline::length);
            if length >= target + joins as f64 * margin {
                break;
            }
            match Continuation::resolve(agent.next_lane_for_route(network, lane.id), lane) {
                Continuation::Lane(next) => {
                    lane = network.lane(next)?;
                    path = Some(match path {
                        Some(p) => {
                            joins += 1;
                            Polyline::concatenate(margin, &p, &lane.centerline)?
                        }
                        None => lane.centerline.clone(),
                    });
                }
                Continuation::Sink => {
                    let missing = target - length;
                    path = Some(match path {
                        Some(p) => p.extended(missing)?,
                        None => Polyline::from_endpoints(
                            lane.centerline.last(),
                            lane.centerline.location_extended(lane.length() + missing).point(),
                        )?,
                    });
                    break;
                }
                Continuation::DeadEnd => {
                    return Ok(Forward::DeadEnd { lane: lane.id, partial: path });
                }
            }
        }

        Ok(match path {
            Some(p) => Forward::Done(p.truncate(target)?),
            None => {
                let at = agent.location();
                Forward::Done(Polyline::from_endpoints(
                    at.point(),
                    at.ahead(ctx.config.standstill_path_length),
                )?)
            }
        })
    }
}

/// Side on which the agent can leave the route's dead end `lane`: the
/// adjacent lane there must continue on the route, and the agent's own lane
/// must have a neighbour on that side to shift onto.
fn escape_side<A: LaneBasedAgent + ?Sized>(
    network: &LaneNetwork,
    agent:   &A,
    lane:    LaneId,
) -> Option<LateralDirection> {
    let reference = agent.reference_position().ok()?.lane;
    [LateralDirection::Left, LateralDirection::Right].into_iter().find(|&side| {
        network.adjacent_lane(reference, side).is_some()
            && network
                .adjacent_lane(lane, side)
                .is_some_and(|adj| !agent.next_lanes_for_route(network, adj).is_empty())
    })
}
