//! two_lane — lane-change demo for the lanesim planning engine.
//!
//! Eight vehicles drive a two-lane road whose left lane is dropped halfway.
//! Every half second each vehicle picks an acceleration with a simple
//! car-following rule, overtakes on the left when a slow leader blocks it
//! and the target gap is large enough, and merges right ahead of the lane
//! drop.  Plan steps and lane-change finalizations share one event queue.
//!
//! Usage: `two_lane [planner_config.json]`
//!
//! Trajectories are written to `output/two_lane/trajectories.csv`.  Set
//! `RUST_LOG=debug` to follow every maneuver.

mod network;

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use csv::Writer;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ls_core::{AgentId, LaneId, LateralDirection, PlannerConfig, SimTime};
use ls_intent::IntentSummary;
use ls_network::{LaneNetwork, LanePosition};
use ls_operational::{
    GapInfo, LaneBasedAgent, LaneChangeFinalization, LaneChangeTracker, OperationalPlanBuilder,
    Plan, Vehicle,
};
use ls_schedule::{EventQueue, Scheduler};

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:    usize = 8;
const SEED:           u64   = 42;
const STEP_SECS:      f64   = 0.5;
const SIM_SECS:       f64   = 90.0;
const VEHICLE_LENGTH: f64   = 4.5;
const SPACING_M:      f64   = 45.0;
const OUTPUT_DIR:     &str  = "output/two_lane";

// Car following.
const MAX_ACCELERATION:         f64 = 1.5;
const COMFORTABLE_DECELERATION: f64 = 2.09;
const STOPPING_DISTANCE:        f64 = 3.0;
const TIME_HEADWAY:             f64 = 1.2;

/// Overtake when the leader is at least this much slower (m/s) ...
const OVERTAKE_SPEED_DIFF: f64 = 2.0;
/// ... and closer than this (m).
const OVERTAKE_RANGE_M:    f64 = 60.0;

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
enum DemoEvent {
    /// Execute the previous plan up to now and plan the next step.
    Step(AgentId),
    Finalize(LaneChangeFinalization),
}

impl From<LaneChangeFinalization> for DemoEvent {
    fn from(event: LaneChangeFinalization) -> Self {
        DemoEvent::Finalize(event)
    }
}

// ── Drivers ───────────────────────────────────────────────────────────────────

struct Driver {
    vehicle:       Vehicle,
    tracker:       LaneChangeTracker,
    desired_speed: f64,
    plan:          Option<Plan>,
    exited:        bool,
    lane_changes:  u32,
}

/// A lane change the driver would like to start, with the gap it would
/// merge into (`None`: target lane empty ahead).
struct Request {
    direction: LateralDirection,
    gap:       Option<GapInfo>,
    /// Metres left before the current lane ends.
    boundary:  Option<f64>,
}

fn car_following(speed: f64, desired: f64, leader: Option<GapInfo>) -> f64 {
    let free = 1.0 - (speed / desired).powi(4);
    let interaction = leader.map_or(0.0, |g| {
        let dv = speed - g.speed.unwrap_or(0.0);
        let s_star = STOPPING_DISTANCE
            + speed * TIME_HEADWAY
            + speed * dv / (2.0 * (MAX_ACCELERATION * COMFORTABLE_DECELERATION).sqrt());
        (s_star.max(STOPPING_DISTANCE) / g.distance.max(0.1)).powi(2)
    });
    MAX_ACCELERATION * (free - interaction)
}

/// Nearest vehicle ahead of `offset` on `lane`, seen from `me`.
///
/// Leaders on successor lanes are not looked for.
fn leader_on(drivers: &[Driver], me: AgentId, lane: LaneId, offset: f64) -> Option<GapInfo> {
    drivers
        .iter()
        .filter(|d| !d.exited && d.vehicle.id() != me)
        .filter_map(|d| d.vehicle.positions().get(&lane).map(|&o| (d, o)))
        .filter(|&(_, o)| o > offset)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(d, o)| {
            GapInfo::new(o - offset - d.vehicle.length(), d.vehicle.speed(), d.vehicle.acceleration())
        })
}

fn closer(a: Option<GapInfo>, b: Option<GapInfo>) -> Option<GapInfo> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.distance < a.distance { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// This step's acceleration and lane-change wish for driver `idx`.
fn perceive(network: &LaneNetwork, drivers: &[Driver], idx: usize) -> Result<(IntentSummary, Option<Request>)> {
    let driver = &drivers[idx];
    let vehicle = &driver.vehicle;
    let me = vehicle.id();
    let pos = vehicle.reference_position()?;
    let lane = network.lane(pos.lane)?;

    let mut leader = leader_on(drivers, me, pos.lane, pos.offset);
    let remaining = lane.length() - pos.offset - vehicle.front();
    let lane_drop = lane.next_lanes().is_empty() && !lane.is_sink();
    if lane_drop {
        // The lane end acts as a standing obstacle.
        leader = closer(leader, Some(GapInfo { distance: remaining, speed: Some(0.0), acceleration: Some(0.0) }));
    }

    if let Some(direction) = driver.tracker.direction() {
        // Mid-maneuver: respect leaders on both lanes.
        let other = driver
            .tracker
            .second_lane_side(network, vehicle)?
            .and_then(|side| network.adjacent_lane(pos.lane, side))
            .and_then(|l| leader_on(drivers, me, l, pos.offset));
        let a = car_following(vehicle.speed(), driver.desired_speed, closer(leader, other));
        let mut intent = IntentSummary::with_lane_change(a, STEP_SECS, Some(direction));
        indicate(&mut intent, direction, None);
        return Ok((intent, None));
    }

    let acceleration = car_following(vehicle.speed(), driver.desired_speed, leader);
    let intent = IntentSummary::new(acceleration, STEP_SECS);

    let wish = if lane_drop {
        Some(LateralDirection::Right)
    } else if leader.is_some_and(|g| {
        g.distance < OVERTAKE_RANGE_M && g.speed.unwrap_or(0.0) < driver.desired_speed - OVERTAKE_SPEED_DIFF
    }) {
        Some(LateralDirection::Left)
    } else {
        None
    };
    let request = wish.and_then(|direction| {
        network.adjacent_lane(pos.lane, direction).map(|target| Request {
            direction,
            gap: leader_on(drivers, me, target, pos.offset),
            boundary: lane_drop.then_some(remaining.max(0.0)),
        })
    });
    Ok((intent, request))
}

fn indicate(intent: &mut IntentSummary, direction: LateralDirection, distance: Option<f64>) {
    match (direction, distance) {
        (LateralDirection::Left, Some(d)) => intent.set_indicator_intent_left_at(d),
        (LateralDirection::Left, None) => intent.set_indicator_intent_left(),
        (LateralDirection::Right, Some(d)) => intent.set_indicator_intent_right_at(d),
        (LateralDirection::Right, None) => intent.set_indicator_intent_right(),
    }
}

/// Past the end of a sink lane.
fn has_left_road(network: &LaneNetwork, vehicle: &Vehicle) -> Result<bool> {
    let LanePosition { lane, offset } = vehicle.reference_position()?;
    let lane = network.lane(lane)?;
    Ok(lane.is_sink() && offset > lane.length())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== two_lane — lanesim planning demo ===");
    println!("Agents: {AGENT_COUNT}  |  Step: {STEP_SECS} s  |  Horizon: {SIM_SECS} s  |  Seed: {SEED}");
    println!();

    // 1. Planner config: defaults, or overrides from a JSON file.
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<PlannerConfig>(&text).with_context(|| format!("parsing {path}"))?
        }
        None => PlannerConfig::default(),
    };
    let builder = OperationalPlanBuilder::new(config)?;

    // 2. Road network.
    let (network, [right_a, left_a, ..]) = build_network()?;
    println!("Lane network: {} lanes", network.lane_count());

    // 3. Vehicles: alternate lanes, staggered, random start and desired speeds.
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut drivers = Vec::with_capacity(AGENT_COUNT);
    for i in 0..AGENT_COUNT {
        let lane = if i % 2 == 0 { right_a } else { left_a };
        let offset = 10.0 + (AGENT_COUNT - 1 - i) as f64 / 2.0 * SPACING_M;
        let speed = rng.gen_range(10.0..16.0);
        let vehicle = Vehicle::new(AgentId::try_from(i)?, VEHICLE_LENGTH, &network, LanePosition::new(lane, offset), speed)?;
        let tracker = LaneChangeTracker::for_agent(&vehicle, builder.config());
        drivers.push(Driver {
            vehicle,
            tracker,
            desired_speed: rng.gen_range(18.0..30.0),
            plan:          None,
            exited:        false,
            lane_changes:  0,
        });
    }

    // 4. Event queue: every vehicle plans at t = 0.
    let mut queue: EventQueue<DemoEvent> = EventQueue::new(SimTime::ZERO);
    for d in &drivers {
        queue.schedule_now(DemoEvent::Step(d.vehicle.id()))?;
    }

    // 5. Output.
    fs::create_dir_all(OUTPUT_DIR)?;
    let mut out = Writer::from_path(Path::new(OUTPUT_DIR).join("trajectories.csv"))?;
    out.write_record(["time", "agent_id", "x", "y", "heading", "speed", "acceleration", "lane", "changing_lane"])?;
    let mut rows = 0usize;

    // 6. Run.
    let t0 = Instant::now();
    while let Some((now, event)) = queue.pop_next() {
        match event {
            DemoEvent::Finalize(event) => {
                let d = &mut drivers[event.agent.index()];
                if d.exited {
                    continue;
                }
                if builder.finalize_lane_change(&network, &mut d.vehicle, &d.tracker, &event)? {
                    d.lane_changes += 1;
                    info!(agent = %event.agent, direction = %event.direction, %now, "lane change finalized");
                }
            }
            DemoEvent::Step(id) => {
                let idx = id.index();
                {
                    let d = &mut drivers[idx];
                    if d.exited {
                        continue;
                    }
                    if let Some(prev) = d.plan.take() {
                        d.vehicle.execute(&network, &prev, now - prev.start_time())?;
                    }
                    if d.vehicle.is_removed() || has_left_road(&network, &d.vehicle)? {
                        d.exited = true;
                        info!(agent = %id, %now, "left the road");
                        continue;
                    }

                    let at = d.vehicle.location();
                    out.write_record(&[
                        format!("{:.3}", now.secs()),
                        id.0.to_string(),
                        format!("{:.3}", at.x),
                        format!("{:.3}", at.y),
                        format!("{:.4}", at.heading),
                        format!("{:.3}", d.vehicle.speed()),
                        format!("{:.3}", d.vehicle.acceleration()),
                        d.vehicle.reference_lane().0.to_string(),
                        (d.tracker.is_changing_lane() as u8).to_string(),
                    ])?;
                    rows += 1;
                }
                if now.secs() >= SIM_SECS {
                    continue;
                }

                let (mut intent, request) = perceive(&network, &drivers, idx)?;
                let d = &mut drivers[idx];
                if let Some(Request { direction, gap, boundary }) = request {
                    let room = match gap {
                        Some(g) => d.tracker.check_room(&d.vehicle, &g)?,
                        None => true,
                    };
                    indicate(&mut intent, direction, gap.map(|g| g.distance));
                    if room {
                        intent.set_lane_change_direction(Some(direction));
                        d.tracker.set_boundary(boundary);
                    }
                }

                let plan = builder.build_plan_from_simple_plan(&network, &mut d.vehicle, now, &intent, &mut d.tracker, &mut queue)?;
                if d.vehicle.is_removed() {
                    warn!(agent = %id, %now, "removed while planning");
                }
                queue.schedule_at(plan.end_time(), DemoEvent::Step(id))?;
                d.plan = Some(plan);
            }
        }
    }
    out.flush()?;
    let elapsed = t0.elapsed();

    // 7. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  trajectories.csv : {rows} rows");
    println!();
    println!("{:<8} {:<10} {:<10} {:<8} {:<8}", "Agent", "Lane", "Speed", "Changes", "Exited");
    println!("{}", "-".repeat(48));
    for d in &drivers {
        println!(
            "{:<8} {:<10} {:<10.2} {:<8} {:<8}",
            d.vehicle.id().0,
            d.vehicle.reference_lane().0,
            d.vehicle.speed(),
            d.lane_changes,
            if d.exited { "yes" } else { "no" },
        );
    }

    Ok(())
}
