//! `OperationalPlanBuilder` — turns an intent into a [`Plan`].
//!
//! # Dispatch
//!
//! | Situation                                         | Plan                               |
//! |---------------------------------------------------|------------------------------------|
//! | agent changes lanes instantaneously               | lateral hop, then lane-keeping     |
//! | no lane change requested or in progress           | lane-keeping, deviative, offset by the intent's deviation |
//! | standing still and not accelerating               | lane-keeping (standstill)          |
//! | otherwise                                         | lane-change step via the tracker   |
//!
//! Lane-keeping plans whose distance is not credible become standstill
//! plans: a one-metre stub path along the current heading with a
//! zero-distance profile.

use tracing::debug;

use ls_core::{AgentId, LateralDirection, OrientedPoint, PlannerConfig, SimTime};
use ls_intent::IntentSummary;
use ls_network::{LaneNetwork, LanePosition};
use ls_schedule::Scheduler;

use crate::{
    KinematicProfile, LaneBasedAgent, LaneChangeFinalization, LaneChangeTracker,
    PathAlongLaneBuilder, PendingFinalization, Plan, PlanError, PlanResult, PlanningContext,
    acceleration_segments, braking_time,
};

/// Builds one plan per agent per cycle.
///
/// Holds only the validated [`PlannerConfig`]; all per-agent state lives in
/// the agent and its [`LaneChangeTracker`].
#[derive(Clone, Debug, Default)]
pub struct OperationalPlanBuilder {
    config: PlannerConfig,
}

impl OperationalPlanBuilder {
    pub fn new(config: PlannerConfig) -> PlanResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn profile(start_speed: f64, acceleration: f64, interval: f64) -> KinematicProfile {
        let bt = braking_time(acceleration, start_speed, interval);
        KinematicProfile::new(start_speed, acceleration_segments(acceleration, bt, interval))
    }

    fn standstill(&self, at: OrientedPoint, start_time: SimTime, interval: f64, deviative: bool) -> PlanResult<Plan> {
        Ok(Plan::standstill(at, start_time, interval, self.config.standstill_path_length, deviative)?)
    }

    // ── Lane keeping ──────────────────────────────────────────────────────

    /// Plan accelerating at `acceleration` from `start_speed` for `interval`
    /// seconds along the agent's current lane and route.
    #[allow(clippy::too_many_arguments)]
    pub fn build_acceleration_plan<A: LaneBasedAgent + ?Sized>(
        &self,
        network:      &LaneNetwork,
        agent:        &mut A,
        start_time:   SimTime,
        start_speed:  f64,
        acceleration: f64,
        interval:     f64,
        deviative:    bool,
    ) -> PlanResult<Plan> {
        if start_speed <= self.config.drifting_speed && acceleration <= 0.0 {
            return self.standstill(agent.location(), start_time, interval, deviative);
        }
        let profile = Self::profile(start_speed, acceleration, interval);
        let distance = profile.distance();
        if distance <= self.config.minimum_credible_path_length {
            return self.standstill(agent.location(), start_time, interval, deviative);
        }
        let ctx = PlanningContext::new(network, &self.config);
        let path = PathAlongLaneBuilder::build_forward_path(&ctx, agent, distance)?;
        Ok(Plan::new(path, start_time, profile, deviative))
    }

    // ── Lane changing ─────────────────────────────────────────────────────

    /// Plan for the next step of a lane change towards `direction` (ignored
    /// while a maneuver is already in progress).
    ///
    /// Schedules the maneuver's finalization on `scheduler` when it
    /// completes within this plan.
    #[allow(clippy::too_many_arguments)]
    pub fn build_acceleration_lane_change_plan<A, S>(
        &self,
        network:      &LaneNetwork,
        agent:        &mut A,
        direction:    Option<LateralDirection>,
        start_pose:   OrientedPoint,
        start_time:   SimTime,
        start_speed:  f64,
        acceleration: f64,
        interval:     f64,
        tracker:      &mut LaneChangeTracker,
        scheduler:    &mut S,
    ) -> PlanResult<Plan>
    where
        A: LaneBasedAgent + ?Sized,
        S: Scheduler + ?Sized,
        S::Event: From<LaneChangeFinalization>,
    {
        let direction = tracker.direction().or(direction).ok_or(PlanError::MissingDirection)?;
        let profile = Self::profile(start_speed, acceleration, interval);
        let distance = profile.distance();
        if distance <= self.config.minimum_credible_path_length {
            return self.standstill(start_pose, start_time, interval, true);
        }

        let from = from_position(network, &*agent, tracker, direction)?;
        let ctx = PlanningContext::new(network, &self.config);
        let step = tracker.get_path(&ctx, agent, interval, from, start_pose, distance, direction)?;
        let plan = Plan::new(step.path, start_time, profile, true);
        if let Some(pending) = step.finalization {
            self.schedule_lane_change_finalization(&plan, scheduler, agent.id(), pending)?;
        }
        Ok(plan)
    }

    /// Entry point: the plan for this cycle's `intent`.
    pub fn build_plan_from_simple_plan<A, S>(
        &self,
        network:    &LaneNetwork,
        agent:      &mut A,
        start_time: SimTime,
        intent:     &IntentSummary,
        tracker:    &mut LaneChangeTracker,
        scheduler:  &mut S,
    ) -> PlanResult<Plan>
    where
        A: LaneBasedAgent + ?Sized,
        S: Scheduler + ?Sized,
        S::Event: From<LaneChangeFinalization>,
    {
        let speed = agent.speed();
        let acceleration = intent.acceleration();
        let interval = intent.duration();

        if agent.parameters().instant_lane_changes {
            if let Some(direction) = intent.lane_change_direction() {
                agent.change_lane_instantaneously(network, direction)?;
            }
            return self.build_acceleration_plan(network, agent, start_time, speed, acceleration, interval, false);
        }
        if !intent.is_lane_change() && !tracker.is_changing_lane() {
            let plan = self.build_acceleration_plan(network, agent, start_time, speed, acceleration, interval, true)?;
            return apply_deviation(plan, intent.deviation());
        }
        if speed <= self.config.drifting_speed && acceleration <= 0.0 {
            return self.build_acceleration_plan(network, agent, start_time, speed, acceleration, interval, false);
        }
        let pose = agent.location();
        self.build_acceleration_lane_change_plan(
            network,
            agent,
            intent.lane_change_direction(),
            pose,
            start_time,
            speed,
            acceleration,
            interval,
            tracker,
            scheduler,
        )
    }

    // ── Finalization ──────────────────────────────────────────────────────

    /// Schedule the finalization of a completed maneuver at the time `plan`
    /// covers the pending distance (the plan's end if it never does).
    pub fn schedule_lane_change_finalization<S>(
        &self,
        plan:      &Plan,
        scheduler: &mut S,
        agent:     AgentId,
        pending:   PendingFinalization,
    ) -> PlanResult<SimTime>
    where
        S: Scheduler + ?Sized,
        S::Event: From<LaneChangeFinalization>,
    {
        let time = plan
            .time_at_distance(pending.distance)
            .filter(|t| t.is_finite())
            .unwrap_or_else(|| plan.end_time());
        let event = LaneChangeFinalization {
            agent,
            direction:  pending.direction,
            generation: pending.generation,
        };
        scheduler.schedule_at(time, event.into())?;
        debug!(agent = %agent, %time, generation = pending.generation, "lane change finalization scheduled");
        Ok(time)
    }

    /// Deliver a finalization event.  Returns `false` (and does nothing) when
    /// the event belongs to an earlier maneuver than the tracker's current one.
    pub fn finalize_lane_change<A: LaneBasedAgent + ?Sized>(
        &self,
        network: &LaneNetwork,
        agent:   &mut A,
        tracker: &LaneChangeTracker,
        event:   &LaneChangeFinalization,
    ) -> PlanResult<bool> {
        if event.generation != tracker.generation() {
            debug!(
                agent = %event.agent,
                event_generation = event.generation,
                generation = tracker.generation(),
                "ignoring stale lane change finalization"
            );
            return Ok(false);
        }
        agent.finalize_lane_change(network, event.direction)?;
        Ok(true)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The lane the maneuver is leaving.
///
/// Idle trackers start from the reference lane.  Mid-maneuver the agent is
/// registered on two lanes and its reference may already be on either: the
/// from-lane is the occupied lane whose neighbour in the maneuver direction
/// is also occupied.
fn from_position<A: LaneBasedAgent + ?Sized>(
    network:   &LaneNetwork,
    agent:     &A,
    tracker:   &LaneChangeTracker,
    direction: LateralDirection,
) -> PlanResult<LanePosition> {
    let reference = agent.reference_position()?;
    if !tracker.is_changing_lane() {
        return Ok(reference);
    }
    let positions = agent.positions();
    if network
        .adjacent_lane(reference.lane, direction)
        .is_some_and(|lane| positions.contains_key(&lane))
    {
        return Ok(reference);
    }
    positions
        .iter()
        .find(|&(&lane, _)| network.adjacent_lane(lane, direction) == Some(reference.lane))
        .map(|(&lane, &offset)| LanePosition::new(lane, offset))
        .ok_or(PlanError::FromLaneUndetermined(agent.id()))
}

fn apply_deviation(plan: Plan, deviation: f64) -> PlanResult<Plan> {
    if deviation == 0.0 || plan.is_standstill() {
        return Ok(plan);
    }
    let path = plan.path().offset(deviation)?;
    Ok(Plan::new(path, plan.start_time(), plan.profile().clone(), true))
}
