//! `ls-core` — foundational types for the `lanesim` operational planning engine.
//!
//! This crate is a dependency of every other `ls-*` crate.  It has no `ls-*`
//! dependencies and a single external one (`thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `LaneId`                                   |
//! | [`geometry`]    | `Point2`, `OrientedPoint`, `Polyline`                 |
//! | [`time`]        | `SimTime`                                             |
//! | [`direction`]   | `LateralDirection` enum                               |
//! | [`config`]      | `PlannerConfig`                                       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod config;
pub mod direction;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::PlannerConfig;
pub use direction::LateralDirection;
pub use error::{CoreError, CoreResult};
pub use geometry::{OrientedPoint, Point2, Polyline, normalize_angle};
pub use ids::{AgentId, LaneId};
pub use time::SimTime;
