//! Lane-change path shapes.
//!
//! A strategy turns the remaining part of a maneuver into a literal path.
//! It receives the current pose, the centerline stretch still to be covered
//! on the from-side (`from_line`) and the matching stretch on the to-side
//! (`to_line`), and the progress fraction reached so far.
//!
//! The blend strategies place samples at equal fractions along both lines
//! and mix them with a lateral fraction derived from the longitudinal one.
//! Because the maneuver resumes every cycle from wherever the agent actually
//! is, the current lateral fraction is first inverted to a longitudinal
//! fraction so the new path continues the old curve instead of restarting it.

use std::f64::consts::PI;

use ls_core::{CoreResult, OrientedPoint, Point2, Polyline, normalize_angle};

/// Control-point distance of the curve, as a fraction of the chord length.
const CURVE_SHAPE: f64 = 0.5;

/// Inputs of one path construction.
#[derive(Copy, Clone, Debug)]
pub struct InterpolationInput<'a> {
    pub start:         OrientedPoint,
    pub from_line:     &'a Polyline,
    pub to_line:       &'a Polyline,
    /// Maneuver progress fraction before this cycle, in `[0, 1)`.
    pub progress:      f64,
    /// Samples of a full maneuver; scaled down by the remaining fraction.
    pub samples:       usize,
    /// Largest accepted deviation (rad) of the first segment from `start`.
    pub heading_limit: f64,
}

/// Closed set of lane-change path shapes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationStrategy {
    /// Lateral fraction follows half a cosine wave: smooth at both ends.
    #[default]
    SineBlend,
    /// Lateral fraction equals longitudinal fraction.
    LinearBlend,
    /// Cubic Bézier curve from the current pose to the end of `to_line`.
    SimpleCurve,
}

impl InterpolationStrategy {
    /// Lateral fraction reached at `longitudinal` fraction of the maneuver.
    pub fn lateral_fraction(self, longitudinal: f64) -> f64 {
        match self {
            InterpolationStrategy::SineBlend => 0.5 - 0.5 * (longitudinal * PI).cos(),
            InterpolationStrategy::LinearBlend | InterpolationStrategy::SimpleCurve => longitudinal,
        }
    }

    /// Inverse of [`lateral_fraction`](Self::lateral_fraction).
    pub fn longitudinal_fraction(self, lateral: f64) -> f64 {
        match self {
            InterpolationStrategy::SineBlend => {
                1.0 - (2.0 * (lateral - 0.5)).clamp(-1.0, 1.0).acos() / PI
            }
            InterpolationStrategy::LinearBlend | InterpolationStrategy::SimpleCurve => lateral,
        }
    }

    /// Build the path for the rest of the maneuver.
    pub fn path(self, input: &InterpolationInput<'_>) -> CoreResult<Polyline> {
        match self {
            InterpolationStrategy::SineBlend | InterpolationStrategy::LinearBlend => {
                self.blend(input)
            }
            InterpolationStrategy::SimpleCurve => curve(input),
        }
    }

    fn blend(self, input: &InterpolationInput<'_>) -> CoreResult<Polyline> {
        let from0 = input.from_line.first();
        let to0 = input.to_line.first();
        let start = input.start.point();

        let mut start_lateral = from0.distance(start) / from0.distance(to0);
        if start_lateral.is_nan() || start_lateral > 1.0 {
            start_lateral = 1.0;
        }
        let start_longitudinal = self.longitudinal_fraction(start_lateral);

        let remaining = (1.0 - input.progress).clamp(0.0, 1.0);
        let n = ((input.samples as f64 * remaining).ceil() as usize).max(1);

        let mut points = Vec::with_capacity(n + 1);
        points.push(start);
        for i in 1..=n {
            let f = i as f64 / n as f64;
            let longitudinal = start_longitudinal + f * (1.0 - start_longitudinal);
            let lateral = self.lateral_fraction(longitudinal);
            let p = input.from_line.location_fraction(f)?.point();
            let q = input.to_line.location_fraction(f)?.point();
            points.push(p.lerp(q, lateral));
        }
        repair_heading(points, input.start.heading, input.heading_limit)
    }
}

/// Drop leading samples (keeping the pinned start) while the first segment
/// turns away from `heading` by more than `limit`.  Gives up and returns the
/// unrepaired line once two or fewer samples would remain.
fn repair_heading(points: Vec<Point2>, heading: f64, limit: f64) -> CoreResult<Polyline> {
    let mut line = Polyline::new(points.clone())?;
    let mut i = 1;
    while normalize_angle(line.start_heading() - heading).abs() > limit {
        i += 1;
        if i >= points.len().saturating_sub(2) {
            return Polyline::new(points);
        }
        let mut kept = Vec::with_capacity(points.len() - i + 1);
        kept.push(points[0]);
        kept.extend_from_slice(&points[i..]);
        line = Polyline::new(kept)?;
    }
    Ok(line)
}

fn curve(input: &InterpolationInput<'_>) -> CoreResult<Polyline> {
    let start = input.start.point();
    let end = input.to_line.last();
    let end_heading = input.to_line.end_heading();
    let reach = CURVE_SHAPE * start.distance(end);

    let c1 = input.start.ahead(reach);
    let c2 = Point2::new(end.x - reach * end_heading.cos(), end.y - reach * end_heading.sin());

    let n = input.samples.max(2);
    let points = (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            let u = 1.0 - t;
            let (b0, b1, b2, b3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            Point2::new(
                b0 * start.x + b1 * c1.x + b2 * c2.x + b3 * end.x,
                b0 * start.y + b1 * c1.y + b2 * c2.y + b3 * end.y,
            )
        })
        .collect();
    Polyline::new(points)
}
