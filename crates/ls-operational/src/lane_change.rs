//! Lane changes as resumable, multi-cycle maneuvers.
//!
//! # State machine
//!
//! ```text
//!            get_path (first call)                 progress >= completion
//!   Idle ─────────────────────────────▶ Active ───────────────────────────▶ Idle
//!                                     (direction,   or path too short
//!                                      progress)
//! ```
//!
//! While active the tracker remembers the direction and the fraction of the
//! maneuver already driven.  Each cycle it rebuilds the remaining geometry
//! from the agent's actual pose, so plans from consecutive cycles join up
//! even if the agent's speed changed in between.
//!
//! # Finalization
//!
//! Completing a maneuver does not immediately move the agent off its
//! from-lane: the agent is still physically between lanes until it has
//! driven the returned distance.  The tracker therefore returns a
//! [`PendingFinalization`] that the plan builder turns into a scheduled
//! [`LaneChangeFinalization`] event.  Each maneuver gets a new generation
//! number; an event whose generation no longer matches the tracker's is
//! stale and must be ignored.

use tracing::{debug, warn};

use ls_core::{AgentId, LaneId, LateralDirection, OrientedPoint, PlannerConfig, Polyline};
use ls_network::{LaneNetwork, LanePosition};

use crate::{
    Continuation, GapInfo, InterpolationInput, InterpolationStrategy, LaneBasedAgent, PlanError,
    PlanResult, PlanningContext,
};

/// Fractional step used to keep a single-lane sub-line from collapsing.
const FRACTION_STEP: f64 = 0.001;

/// Lane pieces shorter than this (m) are skipped when joining centerlines.
const MIN_PIECE_M: f64 = 1e-6;

// ── Public value types ────────────────────────────────────────────────────────

/// How the from-side lane is chosen where the route splits mid-maneuver.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContinuationPreference {
    /// Of the route-compatible successors, the one furthest towards the
    /// maneuver side.
    #[default]
    FavouredSide,
    /// The successor the agent's route picks.
    RouteDetermined,
}

/// Scheduler event: the lane change of `agent` is physically complete.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LaneChangeFinalization {
    pub agent:      AgentId,
    pub direction:  LateralDirection,
    pub generation: u64,
}

/// A completed maneuver whose finalization still has to be scheduled.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PendingFinalization {
    /// Distance into the plan at which the agent reaches the target lane.
    pub distance:   f64,
    pub direction:  LateralDirection,
    pub generation: u64,
}

/// Result of [`LaneChangeTracker::get_path`].
#[derive(Clone, Debug)]
pub struct LaneChangePath {
    pub path:         Polyline,
    pub finalization: Option<PendingFinalization>,
}

// ── LaneChangeTracker ─────────────────────────────────────────────────────────

/// One agent's lane-change state.  Owned by the agent's driver and only
/// mutated from that agent's planning calls.
#[derive(Clone, Debug)]
pub struct LaneChangeTracker {
    direction:        Option<LateralDirection>,
    progress:         f64,
    desired_duration: Option<f64>,
    boundary:         Option<f64>,
    strategy:         InterpolationStrategy,
    preference:       ContinuationPreference,
    minimum_length:   f64,
    generation:       u64,
}

impl LaneChangeTracker {
    /// An idle tracker whose maneuvers span at least `minimum_length` metres.
    pub fn new(minimum_length: f64) -> Self {
        Self {
            direction:        None,
            progress:         0.0,
            desired_duration: None,
            boundary:         None,
            strategy:         InterpolationStrategy::default(),
            preference:       ContinuationPreference::default(),
            minimum_length,
            generation:       0,
        }
    }

    /// Minimum length derived from the agent's vehicle length.
    pub fn for_agent<A: LaneBasedAgent + ?Sized>(agent: &A, config: &PlannerConfig) -> Self {
        Self::new(agent.length() * config.minimum_lane_change_length_factor)
    }

    pub fn with_desired_duration(mut self, duration: f64) -> Self {
        self.desired_duration = Some(duration);
        self
    }

    pub fn with_strategy(mut self, strategy: InterpolationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_preference(mut self, preference: ContinuationPreference) -> Self {
        self.preference = preference;
        self
    }

    // ── Settings ──────────────────────────────────────────────────────────

    pub fn set_desired_duration(&mut self, duration: f64) {
        self.desired_duration = Some(duration);
    }

    /// Cap the remaining maneuver to `boundary` metres (e.g. a lane drop
    /// ahead).  Cleared when the maneuver completes.
    pub fn set_boundary(&mut self, boundary: Option<f64>) {
        self.boundary = boundary;
    }

    pub fn set_strategy(&mut self, strategy: InterpolationStrategy) {
        self.strategy = strategy;
    }

    pub fn set_preference(&mut self, preference: ContinuationPreference) {
        self.preference = preference;
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn direction(&self) -> Option<LateralDirection> {
        self.direction
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn desired_duration(&self) -> Option<f64> {
        self.desired_duration
    }

    pub fn boundary(&self) -> Option<f64> {
        self.boundary
    }

    pub fn strategy(&self) -> InterpolationStrategy {
        self.strategy
    }

    pub fn preference(&self) -> ContinuationPreference {
        self.preference
    }

    pub fn minimum_length(&self) -> f64 {
        self.minimum_length
    }

    /// Incremented each time a maneuver starts.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn is_changing_lane(&self) -> bool {
        self.direction.is_some()
    }

    #[inline]
    pub fn is_changing_left(&self) -> bool {
        self.direction == Some(LateralDirection::Left)
    }

    #[inline]
    pub fn is_changing_right(&self) -> bool {
        self.direction == Some(LateralDirection::Right)
    }

    /// Side of the reference lane on which the agent's other registered lane
    /// lies; `None` while idle.
    pub fn second_lane_side<A: LaneBasedAgent + ?Sized>(
        &self,
        network: &LaneNetwork,
        agent:   &A,
    ) -> PlanResult<Option<LateralDirection>> {
        let Some(direction) = self.direction else {
            return Ok(None);
        };
        let reference = agent.reference_position()?.lane;
        let positions = agent.positions();
        [direction, direction.flip()]
            .into_iter()
            .find(|&side| {
                network
                    .adjacent_lane(reference, side)
                    .is_some_and(|lane| positions.contains_key(&lane))
            })
            .map(Some)
            .ok_or(PlanError::FromLaneUndetermined(agent.id()))
    }

    fn reset(&mut self) {
        self.direction = None;
        self.boundary = None;
        self.progress = 0.0;
    }

    /// Desired duration, defaulted from the agent's parameters on first use.
    fn resolve_duration<A: LaneBasedAgent + ?Sized>(&mut self, agent: &A) -> PlanResult<f64> {
        if let Some(d) = self.desired_duration {
            return Ok(d);
        }
        let d = agent
            .parameters()
            .lane_change_duration
            .ok_or(PlanError::MissingLaneChangeDuration(agent.id()))?;
        self.desired_duration = Some(d);
        Ok(d)
    }

    fn next_from_lane<A: LaneBasedAgent + ?Sized>(
        &self,
        network:   &LaneNetwork,
        agent:     &A,
        lane:      LaneId,
        direction: LateralDirection,
    ) -> PlanResult<Option<LaneId>> {
        match self.preference {
            ContinuationPreference::RouteDetermined => Ok(agent.next_lane_for_route(network, lane)),
            ContinuationPreference::FavouredSide => {
                let mut best = None;
                for next in agent.next_lanes_for_route(network, lane) {
                    best = Some(match best {
                        Some(current) => network.most_on_side(current, next, direction)?,
                        None => next,
                    });
                }
                Ok(best)
            }
        }
    }

    // ── Path ──────────────────────────────────────────────────────────────

    /// Path for the next `interval` seconds of the maneuver, covering
    /// `interval_distance` metres from `start_pose`.
    ///
    /// Starts a maneuver towards `direction` when idle; while active the
    /// stored direction wins.  When the maneuver completes in this interval
    /// the path continues on the destination lane up to `interval_distance`,
    /// the tracker returns to idle, and a [`PendingFinalization`] is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn get_path<A: LaneBasedAgent + ?Sized>(
        &mut self,
        ctx:               &PlanningContext<'_>,
        agent:             &mut A,
        interval:          f64,
        from:              LanePosition,
        start_pose:        OrientedPoint,
        interval_distance: f64,
        direction:         LateralDirection,
    ) -> PlanResult<LaneChangePath> {
        let network = ctx.network;
        let config = ctx.config;

        let mean_speed = interval_distance / interval;
        if !(mean_speed.is_finite() && mean_speed > 0.0) {
            return Err(PlanError::NoMotion(mean_speed));
        }
        let desired = self.resolve_duration(&*agent)?;

        // The maneuver is only started once its geometry has been built.
        let starting = self.direction.is_none();
        let direction = self.direction.unwrap_or(direction);

        // ── Maneuver length ───────────────────────────────────────────────
        let mut duration = desired.max(self.minimum_length / mean_speed);
        if let Some(boundary) = self.boundary {
            duration = duration.min(boundary / mean_speed);
        }
        let from_dist = (1.0 - self.progress) * duration * mean_speed;
        if from_dist < 0.0 {
            return Err(PlanError::NegativeFromDistance { agent: agent.id(), distance: from_dist });
        }

        // ── Walk from-lanes and their to-lanes ────────────────────────────
        let front = agent.front();
        let first_to = network
            .adjacent_lane(from.lane, direction)
            .ok_or(PlanError::NoAdjacentLane { lane: from.lane, direction })?;
        let mut from_lanes = vec![from.lane];
        let mut to_lanes = vec![first_to];
        let mut from_lane = network.lane(from.lane)?;
        let mut end_pos_from = from.offset + from_dist;
        let mut sink = false;

        while end_pos_from + front > from_lane.length() {
            let next = self.next_from_lane(network, &*agent, from_lane.id, direction)?;
            let pair = match Continuation::resolve(next, from_lane) {
                Continuation::Lane(n) => network.adjacent_lane(n, direction).map(|t| (n, t)),
                Continuation::Sink => {
                    sink = true;
                    None
                }
                Continuation::DeadEnd => None,
            };
            let Some((next_from, next_to)) = pair else {
                if !sink {
                    // Topology runs out: squeeze the rest of the maneuver
                    // into what is left of this lane.
                    let limit = from_lane.length() - front;
                    let factor = if from_dist > 0.0 {
                        (1.0 - (end_pos_from - limit) / from_dist).max(0.0)
                    } else {
                        0.0
                    };
                    duration *= factor;
                    end_pos_from = limit;
                    debug!(agent = %agent.id(), lane = %from_lane.id, factor, "lane change shortened at lane end");
                }
                break;
            };
            end_pos_from -= from_lane.length();
            from_lane = network.lane(next_from)?;
            from_lanes.push(next_from);
            to_lanes.push(next_to);
        }

        // The front overhang may have carried the walk past the end position.
        while end_pos_from < 0.0 && from_lanes.len() > 1 {
            from_lanes.pop();
            to_lanes.pop();
            end_pos_from += network.lane(from_lanes[from_lanes.len() - 1])?.length();
        }
        let last_from = network.lane(from_lanes[from_lanes.len() - 1])?;
        let end_frac_from = last_from.fraction(end_pos_from.max(0.0)).min(1.0);

        // Long vehicles: the reference point may lie beyond the first lane.
        let mut start_offset = from.offset;
        while from_lanes.len() > 1 {
            let first = network.lane(from_lanes[0])?;
            if start_offset <= first.length() {
                break;
            }
            start_offset -= first.length();
            from_lanes.remove(0);
            to_lanes.remove(0);
        }
        let start_frac_from = network.lane(from_lanes[0])?.fraction(start_offset).clamp(0.0, 1.0);

        // ── From- and to-lines ────────────────────────────────────────────
        let margin = config.lane_margin;
        let (from_line, _) = centerline_between(network, &from_lanes, start_frac_from, end_frac_from, margin)?;

        let mut start_frac_to = network.lane(to_lanes[0])?.centerline.project_fractional(start_pose.point());
        if start_frac_to.is_nan() {
            start_frac_to = start_frac_from;
        }
        start_frac_to = start_frac_to.clamp(0.0, 1.0);

        let end_point = last_from.centerline.location_fraction(end_frac_from)?.point();
        let last_to = network.lane(to_lanes[to_lanes.len() - 1])?;
        let mut end_frac_to = last_to.centerline.project_fractional(end_point);
        end_frac_to = if end_frac_to.is_nan() || end_frac_to <= 0.0 {
            end_frac_from
        } else {
            end_frac_to.min(1.0)
        };
        if to_lanes.len() == 1 && end_frac_to <= start_frac_to {
            end_frac_to = (start_frac_to + FRACTION_STEP).max(end_frac_from).min(1.0);
        }
        if start_frac_to >= 1.0 && to_lanes.len() > 1 {
            to_lanes.remove(0);
            start_frac_to = 0.0;
        }
        // The destination remainder must start where the to-line really ends.
        let (to_line, end_frac_to) = centerline_between(network, &to_lanes, start_frac_to, end_frac_to, margin)?;

        // ── Interpolate ───────────────────────────────────────────────────
        let input = InterpolationInput {
            start:         start_pose,
            from_line:     &from_line,
            to_line:       &to_line,
            progress:      self.progress,
            samples:       config.interpolation_samples,
            heading_limit: config.heading_repair_limit,
        };
        let path = self.strategy.path(&input)?;

        if starting {
            agent.init_lane_change(network, direction)?;
            self.direction = Some(direction);
            self.generation += 1;
            debug!(agent = %agent.id(), %direction, generation = self.generation, "lane change started");
        }
        self.progress += if duration > 0.0 { interval / duration } else { 1.0 };

        let short = path.length() < interval_distance;
        if !short && self.progress < config.lane_change_completion {
            return Ok(LaneChangePath { path, finalization: None });
        }

        // ── Completion ────────────────────────────────────────────────────
        let pending = PendingFinalization {
            distance:   interval_distance.min(path.length()),
            direction,
            generation: self.generation,
        };
        let path = if short {
            extend_on_destination(ctx, &*agent, path, last_to.id, end_frac_to, interval_distance)?
        } else {
            path
        };
        debug!(agent = %agent.id(), %direction, generation = self.generation, "lane change complete");
        self.reset();
        Ok(LaneChangePath { path, finalization: Some(pending) })
    }

    // ── Gap acceptance ────────────────────────────────────────────────────

    /// Whether a gap with the given headway is large enough to start a lane
    /// change now.
    ///
    /// The leader is assumed to brake as hard as the agent's comfortable
    /// deceleration allows; the agent needs room for the full maneuver
    /// (bounded by its own time to stop) plus its standstill gap.
    pub fn check_room<A: LaneBasedAgent + ?Sized>(&mut self, agent: &A, gap: &GapInfo) -> PlanResult<bool> {
        let desired = self.resolve_duration(agent)?;
        let (v, a) = agent
            .ego_kinematics()
            .map_or((agent.speed(), agent.acceleration()), |k| (k.speed, k.acceleration));
        let params = agent.parameters();
        let s0 = params.stopping_distance.unwrap_or(0.0);

        let leader_speed = gap.speed.unwrap_or(0.0);
        let leader_acc = gap.acceleration.unwrap_or(0.0);
        let leader_stop = if leader_speed == 0.0 {
            0.0
        } else {
            let b = -params.comfortable_deceleration.unwrap_or(0.0);
            let decel = b.max(leader_acc + b).min(leader_acc);
            if decel >= 0.0 {
                return Ok(true);
            }
            let t = leader_speed / -decel;
            leader_speed * t + 0.5 * decel * t * t
        };
        let available = gap.distance + leader_stop;

        let mut t = desired;
        if a < 0.0 {
            t = t.min(v / -a);
        }
        let required = (v * t + 0.5 * a * t * t).max(self.minimum_length) + s0;
        Ok(available > required)
    }
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// Centerline over `lanes` from fraction `f0` of the first lane to `f1` of
/// the last, joined with `margin` tolerance.
///
/// Also returns the fraction of the last lane at which the line actually
/// ends; a single-lane span shorter than [`FRACTION_STEP`] is widened.
fn centerline_between(
    network: &LaneNetwork,
    lanes:   &[LaneId],
    f0:      f64,
    f1:      f64,
    margin:  f64,
) -> PlanResult<(Polyline, f64)> {
    let last = lanes.len() - 1;
    if last == 0 {
        let lane = network.lane(lanes[0])?;
        let (a, b) = if f1 - f0 < FRACTION_STEP {
            let b = (f0 + FRACTION_STEP).clamp(FRACTION_STEP, 1.0);
            (b - FRACTION_STEP, b)
        } else {
            (f0, f1)
        };
        return Ok((lane.centerline.extract_fractional(a, b)?, b));
    }

    let mut line: Option<Polyline> = None;
    for (i, &id) in lanes.iter().enumerate() {
        let lane = network.lane(id)?;
        let a = if i == 0 { f0 } else { 0.0 };
        let b = if i == last { f1 } else { 1.0 };
        if (b - a) * lane.length() < MIN_PIECE_M {
            continue;
        }
        let piece = lane.centerline.extract_fractional(a, b)?;
        line = Some(match line {
            Some(l) => Polyline::concatenate(margin, &l, &piece)?,
            None => piece,
        });
    }
    match line {
        Some(l) => Ok((l, f1)),
        None => {
            let lane = network.lane(lanes[last])?;
            let b = f1.clamp(FRACTION_STEP, 1.0);
            Ok((lane.centerline.extract_fractional(b - FRACTION_STEP, b)?, b))
        }
    }
}

/// Continue `path` along the destination lane `to_lane` (from fraction
/// `end_frac_to`) and its route successors, then cut it to `distance`.
fn extend_on_destination<A: LaneBasedAgent + ?Sized>(
    ctx:         &PlanningContext<'_>,
    agent:       &A,
    path:        Polyline,
    to_lane:     LaneId,
    end_frac_to: f64,
    distance:    f64,
) -> PlanResult<Polyline> {
    let network = ctx.network;
    let margin = ctx.config.lane_margin;
    let mut lane = network.lane(to_lane)?;
    let mut path = path;

    if (1.0 - end_frac_to) * lane.length() >= MIN_PIECE_M {
        let remainder = lane.centerline.extract_fractional(end_frac_to, 1.0)?;
        path = Polyline::concatenate(margin, &path, &remainder)?;
    }
    while path.length() < distance + margin {
        match Continuation::resolve(agent.next_lane_for_route(network, lane.id), lane) {
            Continuation::Lane(next) => {
                lane = network.lane(next)?;
                path = Polyline::concatenate(margin, &path, &lane.centerline)?;
            }
            Continuation::Sink => {
                path = path.extended(distance + margin - path.length())?;
                break;
            }
            Continuation::DeadEnd => {
                warn!(agent = %agent.id(), lane = %lane.id, "destination lanes end before the requested distance");
                break;
            }
        }
    }
    Ok(path.truncate(distance)?)
}
