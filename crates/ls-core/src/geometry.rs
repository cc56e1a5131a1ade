//! Planar geometry: points, oriented points, and polylines.
//!
//! # Conventions
//!
//! Coordinates are metres in a right-handed planar frame.  Headings are
//! radians counter-clockwise from the +x axis, so "left" of a heading is the
//! side reached by rotating it by +π/2.
//!
//! A [`Polyline`] always holds at least two distinct points and caches the
//! cumulative length at every vertex, so distance lookups are a binary search.

use std::f64::consts::PI;

use crate::{CoreError, CoreResult};

/// Consecutive points closer than this are merged when building a polyline.
const COINCIDENT_M: f64 = 1e-9;

/// Slack accepted on distance arguments before they count as out of bounds.
const RANGE_TOLERANCE_M: f64 = 1e-9;

/// Wrap an angle into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}

// ── Point2 ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation: `t = 0` gives `self`, `t = 1` gives `other`.
    #[inline]
    pub fn lerp(self, other: Point2, t: f64) -> Point2 {
        Point2::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ── OrientedPoint ─────────────────────────────────────────────────────────────

/// A position with a heading; the pose of an agent or a location on a line.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrientedPoint {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl OrientedPoint {
    #[inline]
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    #[inline]
    pub fn point(self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// The point `distance` metres straight ahead along the heading.
    #[inline]
    pub fn ahead(self, distance: f64) -> Point2 {
        Point2::new(
            self.x + distance * self.heading.cos(),
            self.y + distance * self.heading.sin(),
        )
    }
}

// ── Polyline ──────────────────────────────────────────────────────────────────

/// An immutable polyline with cached cumulative vertex distances.
///
/// Used for lane centerlines and for the literal paths of operational plans.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    points:     Vec<Point2>,
    /// `cumulative[i]` = length of the line up to `points[i]`.
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Build a polyline, merging consecutive (near-)duplicate points.
    ///
    /// Fails if any point is not finite or fewer than two distinct points
    /// remain.
    pub fn new(points: Vec<Point2>) -> CoreResult<Self> {
        let mut kept: Vec<Point2> = Vec::with_capacity(points.len());
        for p in points {
            if !p.is_finite() {
                return Err(CoreError::NonFinitePoint { x: p.x, y: p.y });
            }
            if kept.last().is_none_or(|q| q.distance(p) > COINCIDENT_M) {
                kept.push(p);
            }
        }
        if kept.len() < 2 {
            return Err(CoreError::TooFewPoints(kept.len()));
        }

        let mut cumulative = Vec::with_capacity(kept.len());
        let mut total = 0.0;
        cumulative.push(total);
        for w in kept.windows(2) {
            total += w[0].distance(w[1]);
            cumulative.push(total);
        }
        Ok(Self { points: kept, cumulative })
    }

    /// A straight two-point line.
    pub fn from_endpoints(a: Point2, b: Point2) -> CoreResult<Self> {
        Self::new(vec![a, b])
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn first(&self) -> Point2 {
        self.points[0]
    }

    #[inline]
    pub fn last(&self) -> Point2 {
        self.points[self.points.len() - 1]
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Heading of the first segment.
    pub fn start_heading(&self) -> f64 {
        self.segment_heading(0)
    }

    /// Heading of the last segment.
    pub fn end_heading(&self) -> f64 {
        self.segment_heading(self.points.len() - 2)
    }

    fn segment_heading(&self, i: usize) -> f64 {
        let (a, b) = (self.points[i], self.points[i + 1]);
        (b.y - a.y).atan2(b.x - a.x)
    }

    /// Segment index containing `distance` (clamped to the line) and the
    /// distance into that segment.
    fn locate(&self, distance: f64) -> (usize, f64) {
        let last_segment = self.points.len() - 2;
        let i = self
            .cumulative
            .partition_point(|&c| c <= distance)
            .saturating_sub(1)
            .min(last_segment);
        (i, distance - self.cumulative[i])
    }

    // ── Locations ─────────────────────────────────────────────────────────

    /// Pose at `distance` along the line.
    pub fn location(&self, distance: f64) -> CoreResult<OrientedPoint> {
        let length = self.length();
        if !(distance >= -RANGE_TOLERANCE_M && distance <= length + RANGE_TOLERANCE_M) {
            return Err(CoreError::OutOfBounds { distance, length });
        }
        Ok(self.location_extended(distance.clamp(0.0, length)))
    }

    /// Pose at `distance`, extrapolating along the first or last segment
    /// when `distance` lies before the start or past the end.
    pub fn location_extended(&self, distance: f64) -> OrientedPoint {
        let last_segment = self.points.len() - 2;
        let (i, along) = if distance < 0.0 {
            (0, distance)
        } else if distance > self.length() {
            (last_segment, distance - self.cumulative[last_segment])
        } else {
            self.locate(distance)
        };
        let (a, b) = (self.points[i], self.points[i + 1]);
        let segment = self.cumulative[i + 1] - self.cumulative[i];
        let p = a.lerp(b, along / segment);
        OrientedPoint::new(p.x, p.y, self.segment_heading(i))
    }

    /// Pose at fraction `f` of the length.
    pub fn location_fraction(&self, f: f64) -> CoreResult<OrientedPoint> {
        self.location(f * self.length())
    }

    // ── Sub-lines ─────────────────────────────────────────────────────────

    /// The part of the line between `start` and `end` (metres).
    pub fn extract(&self, start: f64, end: f64) -> CoreResult<Polyline> {
        let length = self.length();
        if !(start >= -RANGE_TOLERANCE_M
            && end <= length + RANGE_TOLERANCE_M
            && end - start > COINCIDENT_M)
        {
            return Err(CoreError::InvalidRange { start, end, length });
        }
        let start = start.max(0.0);
        let end = end.min(length);

        let mut pts = Vec::with_capacity(self.points.len() + 2);
        pts.push(self.location_extended(start).point());
        for (p, &c) in self.points.iter().zip(&self.cumulative) {
            if c > start && c < end {
                pts.push(*p);
            }
        }
        pts.push(self.location_extended(end).point());
        Polyline::new(pts)
    }

    /// The part of the line between fractions `f0` and `f1` of its length.
    pub fn extract_fractional(&self, f0: f64, f1: f64) -> CoreResult<Polyline> {
        let length = self.length();
        self.extract(f0 * length, f1 * length)
    }

    /// The first `distance` metres of the line (the whole line if shorter).
    pub fn truncate(&self, distance: f64) -> CoreResult<Polyline> {
        if distance >= self.length() {
            return Ok(self.clone());
        }
        self.extract(0.0, distance)
    }

    /// The line with a straight continuation of `distance` metres appended
    /// along the last segment's heading.
    pub fn extended(&self, distance: f64) -> CoreResult<Polyline> {
        if distance.is_nan() || distance <= 0.0 {
            return Ok(self.clone());
        }
        let mut pts = self.points.clone();
        pts.push(self.location_extended(self.length() + distance).point());
        Polyline::new(pts)
    }

    /// Join `a` and `b`.  The end of `a` must be within `tolerance` of the
    /// start of `b`; the first point of `b` is dropped.
    pub fn concatenate(tolerance: f64, a: &Polyline, b: &Polyline) -> CoreResult<Polyline> {
        let gap = a.last().distance(b.first());
        if gap > tolerance {
            return Err(CoreError::Disjoint { gap, tolerance });
        }
        let mut pts = Vec::with_capacity(a.points.len() + b.points.len() - 1);
        pts.extend_from_slice(&a.points);
        pts.extend_from_slice(&b.points[1..]);
        Polyline::new(pts)
    }

    /// Parallel line at lateral `distance` (positive to the left).
    ///
    /// Interior vertices are displaced along the bisector of the adjacent
    /// segment normals.
    pub fn offset(&self, distance: f64) -> CoreResult<Polyline> {
        if distance == 0.0 {
            return Ok(self.clone());
        }
        let n = self.points.len();
        let mut pts = Vec::with_capacity(n);
        for i in 0..n {
            let heading = if i == 0 {
                self.segment_heading(0)
            } else if i == n - 1 {
                self.segment_heading(n - 2)
            } else {
                let (h0, h1) = (self.segment_heading(i - 1), self.segment_heading(i));
                h0 + normalize_angle(h1 - h0) / 2.0
            };
            let p = self.points[i];
            pts.push(Point2::new(
                p.x - distance * heading.sin(),
                p.y + distance * heading.cos(),
            ));
        }
        Polyline::new(pts)
    }

    // ── Projection ────────────────────────────────────────────────────────

    /// Fraction of the length at the point of the line nearest to `p`.
    ///
    /// Always within `[0, 1]`; NaN only if `p` is not finite.
    pub fn project_fractional(&self, p: Point2) -> f64 {
        if !p.is_finite() {
            return f64::NAN;
        }
        let mut best_d2 = f64::INFINITY;
        let mut best_along = 0.0;
        for (i, w) in self.points.windows(2).enumerate() {
            let (a, b) = (w[0], w[1]);
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            let seg2 = dx * dx + dy * dy;
            let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / seg2).clamp(0.0, 1.0);
            let q = a.lerp(b, t);
            let d2 = (p.x - q.x).powi(2) + (p.y - q.y).powi(2);
            if d2 < best_d2 {
                best_d2 = d2;
                best_along = self.cumulative[i] + t * seg2.sqrt();
            }
        }
        best_along / self.length()
    }
}
