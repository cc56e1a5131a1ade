//! Unit tests for the lane network.

use ls_core::{LaneId, LateralDirection, Point2, Polyline};

use crate::{LaneNetwork, LaneNetworkBuilder, NetworkError};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Two parallel 100 m lanes (right at y = 0, left at y = 3.5), each followed
/// by a 50 m continuation.  The right continuation is a sink.
///
/// ```text
///   1 ──────────── 3
///   0 ──────────── 2 (sink)
/// ```
fn two_lane_road() -> (LaneNetwork, [LaneId; 4]) {
    let mut b = LaneNetworkBuilder::new();
    let r0 = b.add_straight_lane(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)).unwrap();
    let l0 = b.add_straight_lane(Point2::new(0.0, 3.5), Point2::new(100.0, 3.5)).unwrap();
    let r1 = b.add_straight_lane(Point2::new(100.0, 0.0), Point2::new(150.0, 0.0)).unwrap();
    let l1 = b.add_straight_lane(Point2::new(100.0, 3.5), Point2::new(150.0, 3.5)).unwrap();
    b.set_adjacent(l0, r0);
    b.set_adjacent(l1, r1);
    b.connect(r0, r1);
    b.connect(l0, l1);
    b.mark_sink(r1);
    (b.build().unwrap(), [r0, l0, r1, l1])
}

#[cfg(test)]
mod topology {
    use super::*;

    #[test]
    fn adjacency_is_symmetric() {
        let (net, [r0, l0, ..]) = two_lane_road();
        assert_eq!(net.adjacent_lane(r0, LateralDirection::Left), Some(l0));
        assert_eq!(net.adjacent_lane(l0, LateralDirection::Right), Some(r0));
        assert_eq!(net.adjacent_lane(r0, LateralDirection::Right), None);
    }

    #[test]
    fn successors_and_sinks() {
        let (net, [r0, l0, r1, l1]) = two_lane_road();
        assert_eq!(net.next_lanes(r0), &[r1]);
        assert_eq!(net.next_lanes(l0), &[l1]);
        assert!(net.next_lanes(r1).is_empty());
        assert!(net.lane(r1).unwrap().is_sink());
        assert!(!net.lane(l1).unwrap().is_sink());
    }

    #[test]
    fn unknown_lane() {
        let (net, _) = two_lane_road();
        assert!(matches!(net.lane(LaneId(99)), Err(NetworkError::LaneNotFound(LaneId(99)))));
        assert!(net.next_lanes(LaneId(99)).is_empty());
        assert_eq!(net.adjacent_lane(LaneId(99), LateralDirection::Left), None);
    }

    #[test]
    fn lane_fractions() {
        let (net, [r0, ..]) = two_lane_road();
        let lane = net.lane(r0).unwrap();
        assert_eq!(lane.length(), 100.0);
        assert_eq!(lane.fraction(25.0), 0.25);
        assert_eq!(lane.offset(0.5), 50.0);
    }
}

#[cfg(test)]
mod most_on_side {
    use super::*;

    #[test]
    fn parallel_lanes() {
        let (net, [r0, l0, ..]) = two_lane_road();
        assert_eq!(net.most_on_side(r0, l0, LateralDirection::Left).unwrap(), l0);
        assert_eq!(net.most_on_side(r0, l0, LateralDirection::Right).unwrap(), r0);
        assert_eq!(net.most_on_side(l0, r0, LateralDirection::Right).unwrap(), r0);
    }

    #[test]
    fn diverging_from_common_point() {
        let mut b = LaneNetworkBuilder::new();
        let up = b.add_straight_lane(Point2::new(0.0, 0.0), Point2::new(50.0, 10.0)).unwrap();
        let down = b.add_straight_lane(Point2::new(0.0, 0.0), Point2::new(50.0, -10.0)).unwrap();
        let net = b.build().unwrap();
        assert_eq!(net.most_on_side(down, up, LateralDirection::Left).unwrap(), up);
        assert_eq!(net.most_on_side(up, down, LateralDirection::Right).unwrap(), down);
    }
}

#[cfg(test)]
mod builder {
    use super::*;

    #[test]
    fn rejects_disconnected_successor() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_straight_lane(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        let c = b.add_straight_lane(Point2::new(20.0, 0.0), Point2::new(30.0, 0.0)).unwrap();
        b.connect(a, c);
        assert!(matches!(b.build(), Err(NetworkError::Disconnected { .. })));
    }

    #[test]
    fn rejects_unknown_ids() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_straight_lane(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        b.set_adjacent(a, LaneId(5));
        assert!(matches!(b.build(), Err(NetworkError::LaneNotFound(LaneId(5)))));
    }

    #[test]
    fn rejects_self_adjacency() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_straight_lane(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        b.set_adjacent(a, a);
        assert!(matches!(b.build(), Err(NetworkError::SelfAdjacent(_))));
    }

    #[test]
    fn duplicate_links_collapse() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_straight_lane(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        let c = b
            .add_lane(Polyline::new(vec![Point2::new(10.0, 0.0), Point2::new(20.0, 5.0)]).unwrap());
        b.connect(a, c);
        b.connect(a, c);
        let net = b.build().unwrap();
        assert_eq!(net.next_lanes(a), &[c]);
        assert_eq!(net.lane_count(), 2);
    }
}

#[cfg(test)]
mod snapping {
    use super::*;

    #[test]
    fn snaps_to_nearest_lane() {
        let (net, [r0, l0, _, l1]) = two_lane_road();
        let p = net.snap_to_lane(Point2::new(40.0, 0.4)).unwrap();
        assert_eq!(p.lane, r0);
        assert!((p.offset - 40.0).abs() < 1e-9);
        assert_eq!(net.snap_to_lane(Point2::new(10.0, 3.0)).unwrap().lane, l0);
        let q = net.snap_to_lane(Point2::new(120.0, 3.6)).unwrap();
        assert_eq!(q.lane, l1);
        assert!((q.offset - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_network_snaps_nothing() {
        let net = LaneNetworkBuilder::new().build().unwrap();
        assert!(net.is_empty());
        assert!(net.snap_to_lane(Point2::new(0.0, 0.0)).is_none());
    }
}
