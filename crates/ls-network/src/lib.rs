//! `ls-network` — the lane graph consumed by the operational planners.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`lane`]    | `Lane`, `LanePosition`                                     |
//! | [`network`] | `LaneNetwork` (+ R-tree lane snapping), `LaneNetworkBuilder` |
//! | [`error`]   | `NetworkError`, `NetworkResult`                            |
//!
//! # Topology model
//!
//! Every lane has a centerline, at most one adjacent lane per side, and any
//! number of successor lanes.  A lane without successors either ends in a
//! sink (agents leave the simulation there) or is a dead end.  The network is
//! read-only once built; editing and topology rebuild belong to the
//! application.

pub mod error;
pub mod lane;
pub mod network;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use lane::{Lane, LanePosition};
pub use network::{LaneNetwork, LaneNetworkBuilder};
