//! `Plan` — the executable result of one planning cycle.

use ls_core::{CoreResult, OrientedPoint, Polyline, SimTime};

use crate::KinematicProfile;

/// A path plus a kinematic profile, starting at an absolute time.
///
/// The agent's position at time `t` is the point of `path` at the distance
/// the profile has covered after `t - start_time` seconds.  Plans are
/// immutable; a new one is built every cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    path:       Polyline,
    profile:    KinematicProfile,
    start_time: SimTime,
    /// The agent may deviate laterally from its lane centerline while
    /// executing this plan (lane changes, lateral offsets).
    deviative:  bool,
}

impl Plan {
    pub fn new(path: Polyline, start_time: SimTime, profile: KinematicProfile, deviative: bool) -> Self {
        Self { path, profile, start_time, deviative }
    }

    /// Stand still at `location` for `duration` seconds.
    ///
    /// The path is a stub of `stub_length` metres along the current heading so
    /// the heading stays defined.
    pub fn standstill(
        location:    OrientedPoint,
        start_time:  SimTime,
        duration:    f64,
        stub_length: f64,
        deviative:   bool,
    ) -> CoreResult<Self> {
        let path = Polyline::from_endpoints(location.point(), location.ahead(stub_length))?;
        Ok(Self::new(path, start_time, KinematicProfile::standstill(duration), deviative))
    }

    pub fn path(&self) -> &Polyline {
        &self.path
    }

    pub fn profile(&self) -> &KinematicProfile {
        &self.profile
    }

    pub fn start_time(&self) -> SimTime {
        self.start_time
    }

    pub fn is_deviative(&self) -> bool {
        self.deviative
    }

    pub fn duration(&self) -> f64 {
        self.profile.duration()
    }

    pub fn end_time(&self) -> SimTime {
        self.start_time + self.profile.duration()
    }

    /// Distance covered by the whole plan.
    pub fn distance(&self) -> f64 {
        self.profile.distance()
    }

    pub fn is_standstill(&self) -> bool {
        self.profile.start_speed() == 0.0 && self.profile.distance() == 0.0
    }

    /// Absolute time at which `distance` metres have been covered.
    pub fn time_at_distance(&self, distance: f64) -> Option<SimTime> {
        self.profile.time_at_distance(distance).map(|t| self.start_time + t)
    }

    /// Pose at absolute `time` (clamped to the plan).
    pub fn location_at(&self, time: SimTime) -> OrientedPoint {
        let d = self.profile.distance_at(time - self.start_time);
        self.path.location_extended(d)
    }

    pub fn speed_at(&self, time: SimTime) -> f64 {
        self.profile.speed_at(time - self.start_time)
    }

    pub fn acceleration_at(&self, time: SimTime) -> f64 {
        self.profile.acceleration_at(time - self.start_time)
    }
}
