//! `ls-operational` — turns per-cycle intents into executable plans.
//!
//! Each planning cycle the decision layer produces an
//! [`IntentSummary`](ls_intent::IntentSummary).  The
//! [`OperationalPlanBuilder`] turns it into a [`Plan`]: a literal path plus a
//! kinematic profile.  Lane keeping uses [`PathAlongLaneBuilder`]; lane
//! changes are multi-cycle maneuvers owned by a per-agent
//! [`LaneChangeTracker`], which resumes the maneuver each cycle with
//! consistent geometry and schedules its finalization on completion.
//!
//! # Crate layout
//!
//! | Module              | Contents                                                   |
//! |---------------------|------------------------------------------------------------|
//! | [`agent`]           | `LaneBasedAgent` trait, `AgentParameters`, `GapInfo`       |
//! | [`context`]         | `PlanningContext` (network + config)                       |
//! | [`profile`]         | `Segment`, `KinematicProfile`, braking-time helpers        |
//! | [`plan`]            | `Plan`                                                     |
//! | [`interpolation`]   | `InterpolationStrategy` (sine, linear, curve)              |
//! | [`path`]            | `PathAlongLaneBuilder`, `Continuation`                     |
//! | [`lane_change`]     | `LaneChangeTracker` and finalization events                |
//! | [`builder`]         | `OperationalPlanBuilder`                                   |
//! | [`vehicle`]         | `Vehicle`: reference `LaneBasedAgent` implementation       |
//! | [`error`]           | `PlanError`, `PlanResult`                                  |
//!
//! # Logging
//!
//! Diagnostics go through `tracing`.  Maneuver lifecycle events are `debug!`,
//! forced lateral shifts and exhausted destination topology are `warn!`, and
//! removing an agent at a dead end is `error!`.  Installing a subscriber is
//! up to the application.

pub mod agent;
pub mod builder;
pub mod context;
pub mod error;
pub mod interpolation;
pub mod lane_change;
pub mod path;
pub mod plan;
pub mod profile;
pub mod vehicle;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::{AgentParameters, EgoKinematics, GapInfo, LaneBasedAgent};
pub use builder::OperationalPlanBuilder;
pub use context::PlanningContext;
pub use error::{PlanError, PlanResult};
pub use interpolation::{InterpolationInput, InterpolationStrategy};
pub use lane_change::{
    ContinuationPreference, LaneChangeFinalization, LaneChangePath, LaneChangeTracker,
    PendingFinalization,
};
pub use path::{Continuation, PathAlongLaneBuilder};
pub use plan::Plan;
pub use profile::{KinematicProfile, Segment, acceleration_segments, braking_time};
pub use vehicle::Vehicle;
