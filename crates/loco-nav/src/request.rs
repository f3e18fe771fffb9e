//! The navigation collaborator contract.
//!
//! # Pluggability
//!
//! The path follower asks for paths only through [`Navigator`], so an
//! application can put a navmesh, a grid planner or anything else behind it.
//! The bundled [`WaypointGraph`](crate::WaypointGraph) is a Dijkstra search
//! over a hand-authored waypoint graph.

use glam::Vec3;

use crate::NavResult;

/// One path-find query.  The limits mirror what navmesh libraries expose.
#[derive(Clone, Debug, PartialEq)]
pub struct PathRequest {
    pub from:              Vec3,
    pub to:                Vec3,
    /// Spacing of points along the returned path.
    pub step_size:         f32,
    /// Half-size of the box searched when snapping `from`/`to` onto the graph.
    pub pick_extents:      Vec3,
    /// Maximum nodes the search may expand.
    pub max_polygon_nodes: usize,
    /// Maximum points after resampling at `step_size`.
    pub max_smooth_nodes:  usize,
    /// Maximum points returned to the caller.
    pub max_steer_points:  usize,
}

/// Turns a start/goal pair into a waypoint sequence.
pub trait Navigator {
    /// Waypoints from (near) `request.from` to (near) `request.to`, in
    /// traversal order.  An empty or `Err` result is a failed request.
    fn find_path(&self, request: &PathRequest) -> NavResult<Vec<Vec3>>;
}

impl<N: Navigator + ?Sized> Navigator for &N {
    fn find_path(&self, request: &PathRequest) -> NavResult<Vec<Vec3>> {
        (**self).find_path(request)
    }
}

/// Resample the polyline `points` so consecutive points are at most `step`
/// apart, keeping every original corner.  Stops after `max_points`.
pub fn resample(points: &[Vec3], step: f32, max_points: usize) -> Vec<Vec3> {
    let mut out = Vec::new();
    let Some(&first) = points.first() else { return out };
    out.push(first);

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance(b);
        let pieces = if step > 0.0 { (len / step).ceil().max(1.0) as usize } else { 1 };
        for i in 1..=pieces {
            if out.len() >= max_points {
                return out;
            }
            out.push(a.lerp(b, i as f32 / pieces as f32));
        }
    }
    out.truncate(max_points);
    out
}
