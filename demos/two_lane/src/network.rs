//! Synthetic two-lane road used by the demo.
//!
//! Two consecutive 400 m sections with a right and a left lane each.  The
//! left lane of the second section is dropped after 250 m, so left-lane
//! traffic has to merge right.  A single-lane run-out ends in a sink.

use ls_core::{LaneId, Point2};
use ls_network::{LaneNetwork, LaneNetworkBuilder, NetworkResult};

pub const LANE_WIDTH: f64 = 3.5;

/// Build the road.
///
/// Returns `(network, [right_a, left_a, right_b, left_b, run_out])`.
pub fn build_network() -> NetworkResult<(LaneNetwork, [LaneId; 5])> {
    let mut b = LaneNetworkBuilder::new();

    let right_a = b.add_straight_lane(Point2::new(0.0,   0.0),        Point2::new(400.0, 0.0))?;
    let left_a  = b.add_straight_lane(Point2::new(0.0,   LANE_WIDTH), Point2::new(400.0, LANE_WIDTH))?;
    let right_b = b.add_straight_lane(Point2::new(400.0, 0.0),        Point2::new(800.0, 0.0))?;
    let left_b  = b.add_straight_lane(Point2::new(400.0, LANE_WIDTH), Point2::new(650.0, LANE_WIDTH))?;
    let run_out = b.add_straight_lane(Point2::new(800.0, 0.0),        Point2::new(1_000.0, 0.0))?;

    b.connect(right_a, right_b);
    b.connect(left_a, left_b);
    b.connect(right_b, run_out);
    b.set_adjacent(left_a, right_a);
    b.set_adjacent(left_b, right_b);
    b.mark_sink(run_out);

    let net = b.build()?;
    Ok((net, [right_a, left_a, right_b, left_b, run_out]))
}
