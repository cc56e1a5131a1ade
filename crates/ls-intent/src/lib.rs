//! `ls-intent` — what the decision layer wants this cycle.
//!
//! The tactical layer (car following, lane-change desire) is outside this
//! workspace.  It hands its numeric output to the operational layer as an
//! [`IntentSummary`]: one acceleration for the planning interval, an optional
//! lane-change direction, a lateral deviation, and a turn-indicator intent
//! arbitrated between the sub-models that requested one.
//!
//! # Crate layout
//!
//! | Module        | Contents                          |
//! |---------------|-----------------------------------|
//! | [`indicator`] | `TurnIndicatorIntent`             |
//! | [`intent`]    | `IntentSummary`                   |

pub mod indicator;
pub mod intent;

#[cfg(test)]
mod tests;

pub use indicator::TurnIndicatorIntent;
pub use intent::{IntentSummary, MIN_ACCELERATION};
