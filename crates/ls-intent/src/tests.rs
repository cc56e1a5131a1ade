//! Unit tests for intent summaries.

#[cfg(test)]
mod acceleration {
    use crate::{IntentSummary, MIN_ACCELERATION};

    #[test]
    fn minimize_keeps_lowest() {
        let mut s = IntentSummary::new(1.0, 0.5);
        s.minimize_acceleration(2.0);
        assert_eq!(s.acceleration(), 1.0);
        s.minimize_acceleration(-3.0);
        assert_eq!(s.acceleration(), -3.0);
    }

    #[test]
    fn floor_is_applied() {
        let mut s = IntentSummary::new(-500.0, 0.5);
        assert_eq!(s.acceleration(), MIN_ACCELERATION);
        s = IntentSummary::new(0.0, 0.5);
        s.minimize_acceleration(f64::NEG_INFINITY);
        assert_eq!(s.acceleration(), MIN_ACCELERATION);
    }
}

#[cfg(test)]
mod lane_change {
    use ls_core::LateralDirection;

    use crate::IntentSummary;

    #[test]
    fn is_lane_change() {
        assert!(!IntentSummary::new(0.0, 0.5).is_lane_change());
        let s = IntentSummary::with_lane_change(0.0, 0.5, Some(LateralDirection::Left));
        assert!(s.is_lane_change());
        assert_eq!(s.lane_change_direction(), Some(LateralDirection::Left));
        assert!(!IntentSummary::with_lane_change(0.0, 0.5, None).is_lane_change());
    }

    #[test]
    fn deviation_does_not_imply_lane_change() {
        let s = IntentSummary::with_deviation(0.5, 0.5, 0.3);
        assert_eq!(s.deviation(), 0.3);
        assert!(!s.is_lane_change());
    }
}

#[cfg(test)]
mod indicator {
    use crate::{IntentSummary, TurnIndicatorIntent};

    fn summary() -> IntentSummary {
        IntentSummary::new(0.0, 0.5)
    }

    #[test]
    fn plain_requests_merge() {
        let mut s = summary();
        s.set_indicator_intent_left();
        assert_eq!(s.indicator_intent(), TurnIndicatorIntent::Left);
        s.set_indicator_intent_left();
        assert_eq!(s.indicator_intent(), TurnIndicatorIntent::Left);
        s.set_indicator_intent_right();
        assert_eq!(s.indicator_intent(), TurnIndicatorIntent::Conflicting);
    }

    #[test]
    fn nearest_object_wins() {
        let mut s = summary();
        s.set_indicator_intent_left_at(80.0);
        s.set_indicator_intent_right_at(30.0);
        assert_eq!(s.indicator_intent(), TurnIndicatorIntent::Right);
        assert_eq!(s.indicator_object_distance(), Some(30.0));
        s.set_indicator_intent_left_at(50.0);
        assert_eq!(s.indicator_intent(), TurnIndicatorIntent::Right);
    }

    #[test]
    fn distanced_overrides_plain() {
        let mut s = summary();
        s.set_indicator_intent_left();
        s.set_indicator_intent_right_at(100.0);
        assert_eq!(s.indicator_intent(), TurnIndicatorIntent::Right);
        // Plain requests are ignored once a distance is known.
        s.set_indicator_intent_left();
        assert_eq!(s.indicator_intent(), TurnIndicatorIntent::Right);
    }

    #[test]
    fn equal_distance_opposite_sides_conflict() {
        let mut s = summary();
        s.set_indicator_intent_left_at(40.0);
        s.set_indicator_intent_right_at(40.0);
        assert!(s.indicator_intent().is_conflicting());
        let mut t = summary();
        t.set_indicator_intent_right_at(40.0);
        t.set_indicator_intent_right_at(40.0);
        assert!(t.indicator_intent().is_right());
    }
}
