//! Unit tests for ls-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, LaneId};

    #[test]
    fn index_roundtrip() {
        let id = LaneId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(LaneId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(AgentId::default(), AgentId::INVALID);
        assert_eq!(LaneId::INVALID.0, u32::MAX);
        assert!(!LaneId::default().is_valid());
        assert!(LaneId(0).is_valid());
    }

    #[test]
    fn display_reads_in_messages() {
        assert_eq!(format!("lane {}", LaneId(3)), "lane #3");
        assert_eq!(AgentId(7).to_string(), "#7");
        assert_eq!(AgentId::INVALID.to_string(), "#invalid");
    }
}

#[cfg(test)]
mod time {
    use std::collections::BTreeMap;

    use crate::SimTime;

    #[test]
    fn arithmetic() {
        let t = SimTime(2.0) + 0.5;
        assert_eq!(t, SimTime(2.5));
        assert_eq!(SimTime(3.0) - SimTime(1.0), 2.0);
        assert_eq!(SimTime(3.0).since(SimTime(4.0)), -1.0);
    }

    #[test]
    fn total_order_keys_a_map() {
        let mut m = BTreeMap::new();
        m.insert(SimTime(1.5), "b");
        m.insert(SimTime(0.25), "a");
        m.insert(SimTime(10.0), "c");
        let order: Vec<_> = m.values().copied().collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(!SimTime(f64::NAN).is_finite());
        assert!(SimTime::ZERO.is_finite());
    }
}

#[cfg(test)]
mod direction {
    use crate::LateralDirection;

    #[test]
    fn flip_and_sign() {
        assert_eq!(LateralDirection::Left.flip(), LateralDirection::Right);
        assert_eq!(LateralDirection::Right.sign(), -1.0);
        assert!(LateralDirection::Left.is_left());
        assert_eq!(LateralDirection::Right.to_string(), "right");
    }
}

#[cfg(test)]
mod config {
    use crate::PlannerConfig;

    #[test]
    fn defaults_validate() {
        let cfg = PlannerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.lane_margin, 0.5);
        assert_eq!(cfg.interpolation_samples, 64);
    }

    #[test]
    fn rejects_zero_margin() {
        let cfg = PlannerConfig { lane_margin: 0.0, ..PlannerConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_completion_above_one() {
        let cfg = PlannerConfig { lane_change_completion: 1.5, ..PlannerConfig::default() };
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod geometry {
    use std::f64::consts::{FRAC_PI_2, PI};

    use crate::{CoreError, OrientedPoint, Point2, Polyline, normalize_angle};

    // ── Helpers ───────────────────────────────────────────────────────────

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// L-shaped line: 10 m east, then 10 m north.
    fn ell() -> Polyline {
        Polyline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ])
        .unwrap()
    }

    // ── Construction ──────────────────────────────────────────────────────

    #[test]
    fn merges_duplicates_and_rejects_degenerate() {
        let l = Polyline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
        ])
        .unwrap();
        assert_eq!(l.point_count(), 2);
        assert!(matches!(
            Polyline::new(vec![Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)]),
            Err(CoreError::TooFewPoints(1))
        ));
        assert!(matches!(
            Polyline::new(vec![Point2::new(f64::NAN, 0.0), Point2::new(1.0, 0.0)]),
            Err(CoreError::NonFinitePoint { .. })
        ));
    }

    #[test]
    fn length_and_headings() {
        let l = ell();
        assert!(close(l.length(), 20.0));
        assert!(close(l.start_heading(), 0.0));
        assert!(close(l.end_heading(), FRAC_PI_2));
    }

    // ── Locations ─────────────────────────────────────────────────────────

    #[test]
    fn location_on_second_segment() {
        let p = ell().location(15.0).unwrap();
        assert!(close(p.x, 10.0) && close(p.y, 5.0));
        assert!(close(p.heading, FRAC_PI_2));
    }

    #[test]
    fn location_out_of_bounds() {
        assert!(ell().location(20.5).is_err());
        assert!(ell().location(-0.1).is_err());
    }

    #[test]
    fn location_extended_beyond_end() {
        let p = ell().location_extended(25.0);
        assert!(close(p.x, 10.0) && close(p.y, 15.0));
        let q = ell().location_extended(-2.0);
        assert!(close(q.x, -2.0) && close(q.y, 0.0));
    }

    // ── Sub-lines ─────────────────────────────────────────────────────────

    #[test]
    fn extract_keeps_interior_vertex() {
        let sub = ell().extract(5.0, 15.0).unwrap();
        assert_eq!(sub.point_count(), 3);
        assert!(close(sub.length(), 10.0));
        assert!(close(sub.first().x, 5.0));
        assert!(close(sub.last().y, 5.0));
    }

    #[test]
    fn extract_roundtrip_matches_direct() {
        let line = ell();
        let direct = line.extract_fractional(0.2, 0.7).unwrap();
        let nested = direct.extract_fractional(0.0, 1.0).unwrap();
        assert_eq!(direct.point_count(), nested.point_count());
        for (a, b) in direct.points().iter().zip(nested.points()) {
            assert!(a.distance(*b) < 1e-9);
        }
    }

    #[test]
    fn extract_empty_range_fails() {
        assert!(matches!(ell().extract(5.0, 5.0), Err(CoreError::InvalidRange { .. })));
        assert!(ell().extract(5.0, 25.0).is_err());
    }

    #[test]
    fn truncate_and_extend() {
        let l = ell();
        assert!(close(l.truncate(12.0).unwrap().length(), 12.0));
        assert_eq!(l.truncate(50.0).unwrap(), l);
        let ext = l.extended(5.0).unwrap();
        assert!(close(ext.length(), 25.0));
        assert!(close(ext.last().y, 15.0));
    }

    #[test]
    fn concatenate_within_tolerance() {
        let a = Polyline::from_endpoints(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        let b = Polyline::from_endpoints(Point2::new(10.2, 0.0), Point2::new(20.0, 0.0)).unwrap();
        let joined = Polyline::concatenate(0.5, &a, &b).unwrap();
        assert!(close(joined.length(), 20.0));
        assert!(matches!(
            Polyline::concatenate(0.1, &a, &b),
            Err(CoreError::Disjoint { .. })
        ));
    }

    #[test]
    fn offset_left_of_straight_line() {
        let a = Polyline::from_endpoints(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        let left = a.offset(2.0).unwrap();
        assert!(close(left.first().y, 2.0) && close(left.last().y, 2.0));
        let right = a.offset(-1.0).unwrap();
        assert!(close(right.first().y, -1.0));
    }

    // ── Projection ────────────────────────────────────────────────────────

    #[test]
    fn projection_fraction() {
        let l = ell();
        assert!(close(l.project_fractional(Point2::new(5.0, -3.0)), 0.25));
        assert!(close(l.project_fractional(Point2::new(13.0, 5.0)), 0.75));
        // Before the start clamps to 0, beyond the end clamps to 1.
        assert!(close(l.project_fractional(Point2::new(-5.0, 0.0)), 0.0));
        assert!(close(l.project_fractional(Point2::new(10.0, 30.0)), 1.0));
        assert!(l.project_fractional(Point2::new(f64::NAN, 0.0)).is_nan());
    }

    #[test]
    fn angles_wrap() {
        assert!(close(normalize_angle(3.0 * PI / 2.0), -FRAC_PI_2));
        assert!(close(normalize_angle(-PI), PI));
        let p = OrientedPoint::new(1.0, 1.0, FRAC_PI_2).ahead(2.0);
        assert!(close(p.x, 1.0) && close(p.y, 3.0));
    }
}
