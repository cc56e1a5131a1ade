//! Kinematic profiles: how speed evolves over one planning interval.
//!
//! A profile is a start speed plus an ordered list of segments.  The
//! decision layer supplies a single acceleration per interval; when that
//! acceleration would bring the agent to a halt before the interval ends,
//! the profile is split into a braking segment and a standstill segment so
//! the agent never reverses.

/// Tolerance (m) when locating a distance on a profile.
const DISTANCE_TOLERANCE_M: f64 = 1e-9;

// ── Segment ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Segment {
    /// Constant acceleration.
    Acceleration { duration: f64, acceleration: f64 },
    /// Constant speed (whatever speed the previous segment ended at).
    Speed { duration: f64 },
}

impl Segment {
    #[inline]
    pub fn duration(&self) -> f64 {
        match *self {
            Segment::Acceleration { duration, .. } | Segment::Speed { duration } => duration,
        }
    }

    #[inline]
    pub fn acceleration(&self) -> f64 {
        match *self {
            Segment::Acceleration { acceleration, .. } => acceleration,
            Segment::Speed { .. } => 0.0,
        }
    }

    /// Distance covered when entering the segment at speed `v0`.
    #[inline]
    pub fn distance(&self, v0: f64) -> f64 {
        let (t, a) = (self.duration(), self.acceleration());
        v0 * t + 0.5 * a * t * t
    }

    #[inline]
    pub fn end_speed(&self, v0: f64) -> f64 {
        v0 + self.acceleration() * self.duration()
    }

    /// Time into the segment at which `d` metres are covered, entering at `v0`.
    fn time_at_distance(&self, v0: f64, d: f64) -> Option<f64> {
        if d <= 0.0 {
            return Some(0.0);
        }
        let a = self.acceleration();
        let t = if a == 0.0 {
            if v0 <= 0.0 {
                return None;
            }
            d / v0
        } else {
            let disc = v0 * v0 + 2.0 * a * d;
            if disc < 0.0 {
                return None;
            }
            (disc.sqrt() - v0) / a
        };
        t.is_finite().then(|| t.clamp(0.0, self.duration()))
    }
}

// ── KinematicProfile ──────────────────────────────────────────────────────────

/// Start speed plus ordered segments.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicProfile {
    start_speed: f64,
    segments:    Vec<Segment>,
}

impl KinematicProfile {
    pub fn new(start_speed: f64, segments: Vec<Segment>) -> Self {
        Self { start_speed, segments }
    }

    /// Zero speed for `duration` seconds.
    pub fn standstill(duration: f64) -> Self {
        Self::new(0.0, vec![Segment::Speed { duration }])
    }

    pub fn start_speed(&self) -> f64 {
        self.start_speed
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    /// Total distance covered.
    pub fn distance(&self) -> f64 {
        self.segment_distances().iter().sum()
    }

    /// Distance covered by each segment, in order.
    pub fn segment_distances(&self) -> Vec<f64> {
        let mut v = self.start_speed;
        self.segments
            .iter()
            .map(|s| {
                let d = s.distance(v);
                v = s.end_speed(v);
                d
            })
            .collect()
    }

    pub fn end_speed(&self) -> f64 {
        self.segments.iter().fold(self.start_speed, |v, s| s.end_speed(v))
    }

    /// The segment active at `t` seconds, with its entry speed and the time
    /// into it.  `t` is clamped to the profile.
    fn segment_at(&self, t: f64) -> Option<(Segment, f64, f64)> {
        let mut v = self.start_speed;
        let mut rem = t.max(0.0);
        let last = self.segments.len().checked_sub(1)?;
        for (i, s) in self.segments.iter().enumerate() {
            if rem <= s.duration() || i == last {
                return Some((*s, v, rem.min(s.duration())));
            }
            rem -= s.duration();
            v = s.end_speed(v);
        }
        None
    }

    pub fn speed_at(&self, t: f64) -> f64 {
        self.segment_at(t)
            .map_or(self.start_speed, |(s, v, dt)| v + s.acceleration() * dt)
    }

    pub fn acceleration_at(&self, t: f64) -> f64 {
        self.segment_at(t).map_or(0.0, |(s, _, _)| s.acceleration())
    }

    /// Distance covered after `t` seconds (clamped to the profile).
    pub fn distance_at(&self, t: f64) -> f64 {
        let mut v = self.start_speed;
        let mut rem = t.max(0.0);
        let mut covered = 0.0;
        for s in &self.segments {
            let dt = rem.min(s.duration());
            covered += v * dt + 0.5 * s.acceleration() * dt * dt;
            rem -= dt;
            v = s.end_speed(v);
            if rem <= 0.0 {
                break;
            }
        }
        covered
    }

    /// Seconds after the start at which `d` metres are covered.
    ///
    /// `None` when `d` lies beyond the profile or the profile never gets
    /// there (zero speed).
    pub fn time_at_distance(&self, d: f64) -> Option<f64> {
        if d.is_nan() || d < 0.0 {
            return None;
        }
        let mut v = self.start_speed;
        let mut rem = d;
        let mut elapsed = 0.0;
        for s in &self.segments {
            let seg_d = s.distance(v);
            if rem <= seg_d + DISTANCE_TOLERANCE_M {
                return s.time_at_distance(v, rem.min(seg_d)).map(|t| elapsed + t);
            }
            rem -= seg_d;
            elapsed += s.duration();
            v = s.end_speed(v);
        }
        None
    }
}

// ── Construction helpers ─────────────────────────────────────────────────────

/// Time within `interval` until the agent stops when decelerating at `a`
/// from `v0`; the whole interval when not decelerating.
pub fn braking_time(a: f64, v0: f64, interval: f64) -> f64 {
    if a >= 0.0 {
        interval
    } else {
        (v0 / -a).min(interval)
    }
}

/// Segments for accelerating at `a` over `interval`, where the agent stops
/// after `braking_time` seconds if that is shorter.
pub fn acceleration_segments(a: f64, braking_time: f64, interval: f64) -> Vec<Segment> {
    if braking_time < interval {
        let mut segments = Vec::with_capacity(2);
        if braking_time > 0.0 {
            segments.push(Segment::Acceleration { duration: braking_time, acceleration: a });
        }
        segments.push(Segment::Speed { duration: interval - braking_time });
        segments
    } else if a == 0.0 {
        vec![Segment::Speed { duration: interval }]
    } else {
        vec![Segment::Acceleration { duration: interval, acceleration: a }]
    }
}
