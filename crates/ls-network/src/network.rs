//! Lane network representation and builder.
//!
//! # Data layout
//!
//! Lanes live in a `Vec<Lane>` indexed by `LaneId`.  Adjacency and successor
//! links are stored on the lanes themselves as ids, so the network holds no
//! reference cycles and is trivially `Send + Sync`.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) holds every centerline segment.  Used when placing
//! agents from free coordinates: the nearest segment gives the lane, and a
//! projection onto that lane's centerline gives the offset.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use ls_core::{LaneId, LateralDirection, Point2, Polyline};

use crate::{Lane, LanePosition, NetworkError, NetworkResult};

/// Maximum gap (m) accepted between a lane's end and its successor's start.
pub const DEFAULT_CONNECTION_TOLERANCE: f64 = 0.5;

// ── R-tree segment entry ──────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: one centerline segment.
#[derive(Clone)]
struct SegmentEntry {
    a:    [f64; 2],
    b:    [f64; 2],
    lane: LaneId,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

impl PointDistance for SegmentEntry {
    /// Squared distance from `point` to the nearest point of the segment.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (dx, dy) = (self.b[0] - self.a[0], self.b[1] - self.a[1]);
        let seg2 = dx * dx + dy * dy;
        let t = if seg2 > 0.0 {
            (((point[0] - self.a[0]) * dx + (point[1] - self.a[1]) * dy) / seg2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let qx = self.a[0] + t * dx - point[0];
        let qy = self.a[1] + t * dy - point[1];
        qx * qx + qy * qy
    }
}

// ── LaneNetwork ───────────────────────────────────────────────────────────────

/// Read-only lane graph plus a spatial index for lane snapping.
///
/// Do not construct directly; use [`LaneNetworkBuilder`].
pub struct LaneNetwork {
    lanes:       Vec<Lane>,
    spatial_idx: RTree<SegmentEntry>,
}

impl LaneNetwork {
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter()
    }

    pub fn lane(&self, id: LaneId) -> NetworkResult<&Lane> {
        self.lanes.get(id.index()).ok_or(NetworkError::LaneNotFound(id))
    }

    // ── Topology ──────────────────────────────────────────────────────────

    /// Physically adjacent lane on `side`; `None` for unknown lanes too.
    #[inline]
    pub fn adjacent_lane(&self, id: LaneId, side: LateralDirection) -> Option<LaneId> {
        self.lanes.get(id.index()).and_then(|l| l.adjacent(side))
    }

    /// Successor lanes of `id`; empty for unknown lanes.
    #[inline]
    pub fn next_lanes(&self, id: LaneId) -> &[LaneId] {
        self.lanes.get(id.index()).map_or(&[], |l| l.next_lanes())
    }

    /// Of lanes `a` and `b`, the one lying furthest towards `side`.
    ///
    /// Lateral order is decided at the shorter of the two lane lengths,
    /// measured from the start of each centerline, so lanes diverging from a
    /// common point compare correctly.  Ties return `a`.
    pub fn most_on_side(&self, a: LaneId, b: LaneId, side: LateralDirection) -> NetworkResult<LaneId> {
        let (la, lb) = (self.lane(a)?, self.lane(b)?);
        let s = la.length().min(lb.length());
        let pa = la.centerline.location_extended(s);
        let pb = lb.centerline.location_extended(s);
        // Positive when b is left of a.
        let lateral = -(pb.x - pa.x) * pa.heading.sin() + (pb.y - pa.y) * pa.heading.cos();
        let b_wins = match side {
            LateralDirection::Left => lateral > 0.0,
            LateralDirection::Right => lateral < 0.0,
        };
        Ok(if b_wins { b } else { a })
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Position on the lane whose centerline passes nearest to `p`.
    ///
    /// Returns `None` only if the network has no lanes.
    pub fn snap_to_lane(&self, p: Point2) -> Option<LanePosition> {
        let entry = self.spatial_idx.nearest_neighbor(&[p.x, p.y])?;
        let lane = self.lanes.get(entry.lane.index())?;
        let offset = lane.centerline.project_fractional(p) * lane.length();
        Some(LanePosition::new(lane.id, offset))
    }
}

// ── LaneNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`LaneNetwork`] incrementally, then call [`build`](Self::build).
///
/// Links may reference lanes added later; `build()` validates every id and
/// checks that successors start where their predecessor ends.
///
/// # Example
///
/// ```
/// use ls_core::{LateralDirection, Point2};
/// use ls_network::LaneNetworkBuilder;
///
/// let mut b = LaneNetworkBuilder::new();
/// let right = b.add_straight_lane(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)).unwrap();
/// let left  = b.add_straight_lane(Point2::new(0.0, 3.5), Point2::new(100.0, 3.5)).unwrap();
/// b.set_adjacent(left, right);
/// let net = b.build().unwrap();
/// assert_eq!(net.adjacent_lane(right, LateralDirection::Left), Some(left));
/// ```
pub struct LaneNetworkBuilder {
    lanes:     Vec<Polyline>,
    links:     Vec<(LaneId, LaneId)>,
    adjacency: Vec<(LaneId, LaneId)>,
    sinks:     Vec<LaneId>,
    tolerance: f64,
}

impl LaneNetworkBuilder {
    pub fn new() -> Self {
        Self {
            lanes:     Vec::new(),
            links:     Vec::new(),
            adjacency: Vec::new(),
            sinks:     Vec::new(),
            tolerance: DEFAULT_CONNECTION_TOLERANCE,
        }
    }

    /// Override the maximum end-to-start gap accepted between linked lanes.
    pub fn connection_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Add a lane and return its `LaneId` (sequential from 0).
    pub fn add_lane(&mut self, centerline: Polyline) -> LaneId {
        let id = LaneId(self.lanes.len() as u32);
        self.lanes.push(centerline);
        id
    }

    /// Convenience: add a straight lane from `a` to `b`.
    pub fn add_straight_lane(&mut self, a: Point2, b: Point2) -> NetworkResult<LaneId> {
        Ok(self.add_lane(Polyline::from_endpoints(a, b)?))
    }

    /// Declare `to` a successor of `from`.
    pub fn connect(&mut self, from: LaneId, to: LaneId) {
        self.links.push((from, to));
    }

    /// Declare `left` and `right` physically adjacent (`left` on the left).
    pub fn set_adjacent(&mut self, left: LaneId, right: LaneId) {
        self.adjacency.push((left, right));
    }

    /// Agents reaching the end of `lane` leave the simulation.
    pub fn mark_sink(&mut self, lane: LaneId) {
        self.sinks.push(lane);
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Consume the builder and produce a [`LaneNetwork`].
    pub fn build(self) -> NetworkResult<LaneNetwork> {
        let mut lanes: Vec<Lane> = self
            .lanes
            .into_iter()
            .enumerate()
            .map(|(i, centerline)| Lane {
                id: LaneId(i as u32),
                centerline,
                left: None,
                right: None,
                next: Vec::new(),
                sink: false,
            })
            .collect();
        let count = lanes.len();
        let check = |id: LaneId| {
            if id.index() < count { Ok(()) } else { Err(NetworkError::LaneNotFound(id)) }
        };

        for (from, to) in self.links {
            check(from)?;
            check(to)?;
            let gap = lanes[from.index()].centerline.last().distance(lanes[to.index()].centerline.first());
            if gap > self.tolerance {
                return Err(NetworkError::Disconnected { from, to, gap });
            }
            if !lanes[from.index()].next.contains(&to) {
                lanes[from.index()].next.push(to);
            }
        }
        for (left, right) in self.adjacency {
            check(left)?;
            check(right)?;
            if left == right {
                return Err(NetworkError::SelfAdjacent(left));
            }
            lanes[left.index()].right = Some(right);
            lanes[right.index()].left = Some(left);
        }
        for lane in self.sinks {
            check(lane)?;
            lanes[lane.index()].sink = true;
        }

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<SegmentEntry> = lanes
            .iter()
            .flat_map(|lane| {
                lane.centerline.points().windows(2).map(move |w| SegmentEntry {
                    a:    [w[0].x, w[0].y],
                    b:    [w[1].x, w[1].y],
                    lane: lane.id,
                })
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Ok(LaneNetwork { lanes, spatial_idx })
    }
}

impl Default for LaneNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
