//! `IntentSummary` — the decision layer's output for one planning cycle.
//!
//! # Indicator arbitration
//!
//! Several sub-models may ask for an indicator in the same cycle.  Requests
//! that carry the distance to the object they refer to (a junction, a lane
//! drop) compete on that distance: the nearest object wins and farther
//! requests are discarded.  Requests without a distance only count while no
//! distanced request has been made.  Requests that survive are merged: the
//! same side twice stays that side, opposite sides become
//! [`TurnIndicatorIntent::Conflicting`].

use ls_core::LateralDirection;

use crate::TurnIndicatorIntent;

/// Lower bound (m/s²) applied to every acceleration stored in a summary.
pub const MIN_ACCELERATION: f64 = -100.0;

/// Acceleration, lateral intent, and indicator intent for one interval.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntentSummary {
    acceleration:       f64,
    duration:           f64,
    deviation:          f64,
    lane_change:        Option<LateralDirection>,
    indicator:          TurnIndicatorIntent,
    indicator_distance: Option<f64>,
}

impl IntentSummary {
    /// Stay in lane with `acceleration` for `duration` seconds.
    pub fn new(acceleration: f64, duration: f64) -> Self {
        Self {
            acceleration: acceleration.max(MIN_ACCELERATION),
            duration,
            deviation: 0.0,
            lane_change: None,
            indicator: TurnIndicatorIntent::None,
            indicator_distance: None,
        }
    }

    /// Change lane towards `direction` (`None` stays in lane).
    pub fn with_lane_change(
        acceleration: f64,
        duration: f64,
        direction: Option<LateralDirection>,
    ) -> Self {
        Self { lane_change: direction, ..Self::new(acceleration, duration) }
    }

    /// Stay in lane but drive `deviation` metres left (negative: right) of
    /// the centerline.
    pub fn with_deviation(acceleration: f64, duration: f64, deviation: f64) -> Self {
        Self { deviation, ..Self::new(acceleration, duration) }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline]
    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    #[inline]
    pub fn lane_change_direction(&self) -> Option<LateralDirection> {
        self.lane_change
    }

    #[inline]
    pub fn is_lane_change(&self) -> bool {
        self.lane_change.is_some()
    }

    #[inline]
    pub fn indicator_intent(&self) -> TurnIndicatorIntent {
        self.indicator
    }

    /// Distance to the object the winning indicator request referred to.
    #[inline]
    pub fn indicator_object_distance(&self) -> Option<f64> {
        self.indicator_distance
    }

    // ── Mutators ──────────────────────────────────────────────────────────

    /// Keep the lower of the current acceleration and `a`, floor-clamped to
    /// [`MIN_ACCELERATION`].  Used to combine the outputs of several
    /// acceleration sub-models.
    pub fn minimize_acceleration(&mut self, a: f64) {
        self.acceleration = self.acceleration.min(a).max(MIN_ACCELERATION);
    }

    pub fn set_lane_change_direction(&mut self, direction: Option<LateralDirection>) {
        self.lane_change = direction;
    }

    pub fn set_deviation(&mut self, deviation: f64) {
        self.deviation = deviation;
    }

    pub fn set_indicator_intent_left(&mut self) {
        self.request_indicator(LateralDirection::Left);
    }

    pub fn set_indicator_intent_right(&mut self) {
        self.request_indicator(LateralDirection::Right);
    }

    /// Left indicator for an object `distance` metres ahead.
    pub fn set_indicator_intent_left_at(&mut self, distance: f64) {
        self.request_indicator_at(LateralDirection::Left, distance);
    }

    /// Right indicator for an object `distance` metres ahead.
    pub fn set_indicator_intent_right_at(&mut self, distance: f64) {
        self.request_indicator_at(LateralDirection::Right, distance);
    }

    fn request_indicator(&mut self, side: LateralDirection) {
        if self.indicator_distance.is_some() {
            return;
        }
        self.indicator = self.indicator.merge(side);
    }

    fn request_indicator_at(&mut self, side: LateralDirection, distance: f64) {
        match self.indicator_distance {
            Some(current) if current < distance => return,
            Some(current) if current == distance => {}
            // Farther or un-distanced requests are discarded.
            _ => self.indicator = TurnIndicatorIntent::None,
        }
        self.indicator_distance = Some(distance);
        self.indicator = self.indicator.merge(side);
    }
}
