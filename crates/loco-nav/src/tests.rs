//! Unit tests for loco-nav.

#[cfg(test)]
mod helpers {
    use std::cell::Cell;

    use glam::Vec3;

    use loco_core::NodeId;

    use crate::{NavError, NavResult, Navigator, PathRequest};

    /// Navigator returning a fixed answer and counting calls.
    pub struct Scripted {
        pub answer: Option<Vec<Vec3>>,
        pub calls:  Cell<u32>,
    }

    impl Scripted {
        pub fn path(points: Vec<Vec3>) -> Self {
            Self { answer: Some(points), calls: Cell::new(0) }
        }

        pub fn failing() -> Self {
            Self { answer: None, calls: Cell::new(0) }
        }
    }

    impl Navigator for Scripted {
        fn find_path(&self, _request: &PathRequest) -> NavResult<Vec<Vec3>> {
            self.calls.set(self.calls.get() + 1);
            self.answer.clone().ok_or(NavError::NoPath { from: NodeId(0), to: NodeId(1) })
        }
    }

    /// Waypoints every 2 m along +X from x=2 to x=10.
    pub fn straight_line() -> Vec<Vec3> {
        (1..=5).map(|i| Vec3::new(i as f32 * 2.0, 0.0, 0.0)).collect()
    }

    pub fn request(from: Vec3, to: Vec3) -> PathRequest {
        PathRequest {
            from,
            to,
            step_size:         1.0,
            pick_extents:      Vec3::splat(2.0),
            max_polygon_nodes: 512,
            max_smooth_nodes:  4096,
            max_steer_points:  4096,
        }
    }
}

#[cfg(test)]
mod graph {
    use glam::Vec3;

    use loco_core::NodeId;

    use super::helpers::request;
    use crate::{resample, NavError, Navigator, WaypointGraphBuilder};

    fn grid() -> crate::WaypointGraph {
        let mut b = WaypointGraphBuilder::new();
        b.add_grid(Vec3::ZERO, 3, 3, 10.0);
        b.build()
    }

    #[test]
    fn grid_has_expected_links() {
        let g = grid();
        assert_eq!(g.node_count(), 9);
        // 12 undirected links in a 3×3 grid.
        assert_eq!(g.link_count(), 24);
        assert_eq!(g.out_links(NodeId(4)).count(), 4);
    }

    #[test]
    fn corner_to_corner_route() {
        let g = grid();
        let route = g.shortest_route(NodeId(0), NodeId(8), 512).unwrap();
        assert_eq!(route.len(), 5);
        assert_eq!(route.first(), Some(&NodeId(0)));
        assert_eq!(route.last(), Some(&NodeId(8)));
    }

    #[test]
    fn pick_respects_extents() {
        let g = grid();
        assert_eq!(g.pick_node(Vec3::new(9.0, 1.0, 0.0), Vec3::splat(2.0)), Some(NodeId(1)));
        assert_eq!(g.pick_node(Vec3::new(5.0, 5.0, 0.0), Vec3::splat(2.0)), None);
        assert_eq!(g.pick_node(Vec3::new(0.0, 0.0, 3.0), Vec3::splat(2.0)), None);
    }

    #[test]
    fn search_limit_is_reported() {
        let g = grid();
        let err = g.shortest_route(NodeId(0), NodeId(8), 1).unwrap_err();
        assert!(matches!(err, NavError::SearchLimit(1)));
    }

    #[test]
    fn disconnected_nodes_have_no_path() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_node(Vec3::ZERO);
        let c = b.add_node(Vec3::new(5.0, 0.0, 0.0));
        let g = b.build();
        assert!(matches!(g.shortest_route(a, c, 512), Err(NavError::NoPath { .. })));
    }

    #[test]
    fn find_path_runs_from_start_to_goal() {
        let g = grid();
        let from = Vec3::new(0.5, 0.5, 0.0);
        let to = Vec3::new(20.0, 19.0, 0.0);
        let path = g.find_path(&request(from, to)).unwrap();
        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        for pair in path.windows(2) {
            assert!(pair[0].distance(pair[1]) <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn find_path_caps_steer_points() {
        let g = grid();
        let mut req = request(Vec3::ZERO, Vec3::new(20.0, 20.0, 0.0));
        req.max_steer_points = 16;
        assert_eq!(g.find_path(&req).unwrap().len(), 16);
    }

    #[test]
    fn far_goal_fails_to_snap() {
        let g = grid();
        let err = g.find_path(&request(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0))).unwrap_err();
        assert!(matches!(err, NavError::NoNodeNear(_)));
    }

    #[test]
    fn resample_keeps_corners_and_caps_length() {
        let pts = [Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 0.0)];
        let out = resample(&pts, 1.0, 100);
        assert_eq!(out.len(), 6);
        assert!(out.contains(&Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(resample(&pts, 1.0, 3).len(), 3);
        assert!(resample(&[], 1.0, 10).is_empty());
    }
}

#[cfg(test)]
mod follower {
    use glam::Vec3;

    use super::helpers::{straight_line, Scripted};
    use crate::{PathConfig, PathFollower};

    const DT: f32 = 0.05;
    const REACH: f32 = 0.5;
    const TARGET: Vec3 = Vec3::new(10.0, 0.0, 0.0);

    fn follower_with_path(nav: &Scripted) -> PathFollower {
        let mut f = PathFollower::new(PathConfig::default());
        let wp = f.update(Vec3::ZERO, TARGET, REACH, DT, nav);
        assert_eq!(wp, Some(Vec3::new(2.0, 0.0, 0.0)));
        f
    }

    #[test]
    fn reaching_target_clears_path() {
        let nav = Scripted::path(straight_line());
        let mut f = follower_with_path(&nav);
        assert!(f.state.has_path());
        assert_eq!(f.update(Vec3::new(9.8, 0.2, 0.5), TARGET, REACH, DT, &nav), None);
        assert!(!f.state.has_path());
    }

    #[test]
    fn z_band_blocks_reach() {
        let nav = Scripted::path(straight_line());
        let mut f = PathFollower::new(PathConfig::default());
        // Directly above the target but on another floor.
        let wp = f.update(Vec3::new(10.0, 0.0, 3.0), TARGET, REACH, DT, &nav);
        assert_eq!(nav.calls.get(), 1);
        assert!(wp.is_some());
    }

    #[test]
    fn reached_waypoints_are_skipped() {
        let nav = Scripted::path(straight_line());
        let mut f = follower_with_path(&nav);
        let wp = f.update(Vec3::new(1.8, 0.0, 0.0), TARGET, REACH, DT, &nav);
        assert_eq!(wp, Some(Vec3::new(4.0, 0.0, 0.0)));
        assert_eq!(f.state.current, 1);
        assert_eq!(f.state.segment_start(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn passing_last_waypoint_clears_path() {
        let nav = Scripted::path(vec![Vec3::new(2.0, 0.0, 0.0)]);
        let mut f = follower_with_path(&nav);
        assert_eq!(f.update(Vec3::new(1.9, 0.0, 0.0), TARGET, REACH, DT, &nav), None);
        assert!(!f.state.has_path());
    }

    #[test]
    fn lateral_deviation_drops_path() {
        let nav = Scripted::path(straight_line());
        let mut f = follower_with_path(&nav);
        assert_eq!(f.update(Vec3::new(1.0, 2.0, 0.0), TARGET, REACH, DT, &nav), None);
        assert!(!f.state.has_path());
        // Throttled: no new request yet.
        assert_eq!(nav.calls.get(), 1);
    }

    #[test]
    fn vertical_deviation_drops_path() {
        let nav = Scripted::path(straight_line());
        let mut f = follower_with_path(&nav);
        f.update(Vec3::new(1.0, 0.0, -2.5), TARGET, REACH, DT, &nav);
        assert!(!f.state.has_path());
    }

    #[test]
    fn moved_target_drops_path() {
        let nav = Scripted::path(straight_line());
        let mut f = follower_with_path(&nav);
        f.update(Vec3::new(0.5, 0.0, 0.0), TARGET + Vec3::new(0.0, 2.0, 0.0), REACH, DT, &nav);
        assert!(!f.state.has_path());
        assert_eq!(f.stats.requests, 1);
    }

    #[test]
    fn small_target_motion_keeps_path() {
        let nav = Scripted::path(straight_line());
        let mut f = follower_with_path(&nav);
        f.update(Vec3::new(0.5, 0.0, 0.0), TARGET + Vec3::new(0.0, 0.5, 0.0), REACH, DT, &nav);
        assert!(f.state.has_path());
    }

    #[test]
    fn clear_keeps_replan_timer() {
        let nav = Scripted::path(straight_line());
        let mut f = follower_with_path(&nav);
        f.clear();
        assert!(f.state.replan_wait > 0.0);
        assert_eq!(f.update(Vec3::ZERO, TARGET, REACH, DT, &nav), None);
        assert_eq!(nav.calls.get(), 1);
    }

    /// Drive the follower for `secs` with a target that jumps every tick,
    /// returning the times at which path-finds were issued.
    fn request_times(nav: &Scripted, secs: f32) -> Vec<f32> {
        let mut f = PathFollower::new(PathConfig::default());
        let mut times = Vec::new();
        let ticks = (secs / DT) as usize;
        for i in 0..ticks {
            let target = if i % 2 == 0 { TARGET } else { TARGET + Vec3::new(0.0, 3.0, 0.0) };
            let before = f.stats.requests;
            f.update(Vec3::ZERO, target, REACH, DT, nav);
            if f.stats.requests > before {
                times.push(i as f32 * DT);
            }
        }
        times
    }

    #[test]
    fn successful_replans_are_throttled() {
        let nav = Scripted::path(straight_line());
        let times = request_times(&nav, 5.0);
        assert!(times.len() >= 10, "only {} requests", times.len());
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= 0.3 - 1e-3, "gap {}", pair[1] - pair[0]);
        }
    }

    #[test]
    fn failed_replans_back_off_longer() {
        let nav = Scripted::failing();
        let times = request_times(&nav, 5.0);
        assert!(times.len() >= 4, "only {} requests", times.len());
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= 1.0 - 1e-3, "gap {}", pair[1] - pair[0]);
        }
    }

    #[test]
    fn empty_path_counts_as_failure() {
        let nav = Scripted::path(Vec::new());
        let mut f = PathFollower::new(PathConfig::default());
        assert_eq!(f.update(Vec3::ZERO, TARGET, REACH, DT, &nav), None);
        assert_eq!(f.stats.failures, 1);
        assert!((f.state.replan_wait - 1.0).abs() < 1e-6);
    }
}
