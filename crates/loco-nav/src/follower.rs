//! Per-agent path following.
//!
//! # Update order
//!
//! Each call to [`PathFollower::update`] runs, in order:
//!
//! 1. tick the replan-wait countdown;
//! 2. target reached (2-D distance and Z-band) → drop the path, report done;
//! 3. path exists and the target moved past the threshold → drop it;
//! 4. path exists and the agent drifted off the current segment → drop it;
//! 5. no path and the countdown is zero → request one (success waits
//!    `replan_wait_success`, failure waits `replan_wait_failure`);
//! 6. path exists → skip reached waypoints and return the next one.
//!
//! Dropping a path never resets the countdown, so path-find load stays bounded
//! however often the agent is knocked off course.

use glam::Vec3;

use loco_core::math::{flat_distance, flat_segment_distance};

use crate::{Navigator, PathRequest};

/// Countdowns below this are treated as expired.
const WAIT_EPSILON: f32 = 1e-5;

// ── PathConfig ────────────────────────────────────────────────────────────────

/// Tunable thresholds for [`PathFollower`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathConfig {
    /// Vertical tolerance when testing whether a point has been reached.
    pub reach_z_band:            f32,
    /// Target displacement that invalidates the current path.
    pub target_moved_threshold:  f32,
    /// 2-D distance from the current segment that invalidates the path.
    pub max_allowable_deviation: f32,
    /// Vertical slack around the current segment's endpoints.
    pub segment_z_band:          f32,
    pub replan_wait_success:     f32,
    pub replan_wait_failure:     f32,

    // ── Forwarded to the navigator ────────────────────────────────────────
    pub step_size:               f32,
    pub pick_extents:            Vec3,
    pub max_polygon_nodes:       usize,
    pub max_smooth_nodes:        usize,
    pub max_steer_points:        usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            reach_z_band:            1.5,
            target_moved_threshold:  1.0,
            max_allowable_deviation: 1.0,
            segment_z_band:          2.0,
            replan_wait_success:     0.3,
            replan_wait_failure:     1.0,
            step_size:               1.0,
            pick_extents:            Vec3::new(2.0, 2.0, 2.0),
            max_polygon_nodes:       512,
            max_smooth_nodes:        4096,
            max_steer_points:        16,
        }
    }
}

// ── PathState ─────────────────────────────────────────────────────────────────

/// Persistent per-agent path state.
///
/// Invariant: when `waypoints` is non-empty, `current < waypoints.len()`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathState {
    /// Target the current path was computed for.
    pub target:      Option<Vec3>,
    /// Agent position when the path was computed (start of the first segment).
    pub origin:      Vec3,
    pub waypoints:   Vec<Vec3>,
    pub current:     usize,
    /// Seconds until another path-find may be issued.
    pub replan_wait: f32,
}

impl PathState {
    #[inline]
    pub fn has_path(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Start of the segment the agent is currently on.
    pub fn segment_start(&self) -> Vec3 {
        match self.current {
            0 => self.origin,
            i => self.waypoints[i - 1],
        }
    }

    /// Drop the path, keeping the replan countdown.
    pub fn clear(&mut self) {
        self.target = None;
        self.waypoints.clear();
        self.current = 0;
    }
}

/// Running totals, useful for tracing and tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FollowerStats {
    pub requests: u32,
    pub failures: u32,
}

// ── PathFollower ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct PathFollower {
    pub config: PathConfig,
    pub state:  PathState,
    pub stats:  FollowerStats,
}

impl PathFollower {
    pub fn new(config: PathConfig) -> Self {
        Self { config, state: PathState::default(), stats: FollowerStats::default() }
    }

    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// `true` if `point` is within `reach` in 2-D and inside the Z-band.
    pub fn within_reach(&self, position: Vec3, point: Vec3, reach: f32) -> bool {
        flat_distance(position, point) < reach && (position.z - point.z).abs() < self.config.reach_z_band
    }

    /// `true` if `position` has left the corridor around the current segment.
    pub fn deviated(&self, position: Vec3) -> bool {
        let Some(&end) = self.state.waypoints.get(self.state.current) else {
            return false;
        };
        let start = self.state.segment_start();
        if flat_segment_distance(position, start, end) > self.config.max_allowable_deviation {
            return true;
        }
        let band = self.config.segment_z_band;
        position.z < start.z.min(end.z) - band || position.z > start.z.max(end.z) + band
    }

    /// Advance one tick toward `target`.  Returns the waypoint to steer
    /// toward, or `None` when there is nothing to follow.
    pub fn update<N: Navigator + ?Sized>(
        &mut self,
        position:       Vec3,
        target:         Vec3,
        reach_distance: f32,
        dt:             f32,
        navigator:      &N,
    ) -> Option<Vec3> {
        self.state.replan_wait = (self.state.replan_wait - dt).max(0.0);
        if self.state.replan_wait < WAIT_EPSILON {
            self.state.replan_wait = 0.0;
        }

        if self.within_reach(position, target, reach_distance) {
            self.state.clear();
            return None;
        }

        if self.state.has_path() {
            let moved = self
                .state
                .target
                .is_some_and(|t| t.distance(target) > self.config.target_moved_threshold);
            if moved {
                log::debug!("target moved to {target}; dropping path");
                self.state.clear();
            } else if self.deviated(position) {
                log::debug!("drifted off path at {position}; dropping path");
                self.state.clear();
            }
        }

        if !self.state.has_path() && self.state.replan_wait == 0.0 {
            self.request(position, target, navigator);
        }

        self.next_waypoint(position, reach_distance)
    }

    fn request<N: Navigator + ?Sized>(&mut self, position: Vec3, target: Vec3, navigator: &N) {
        let c = &self.config;
        let req = PathRequest {
            from:              position,
            to:                target,
            step_size:         c.step_size,
            pick_extents:      c.pick_extents,
            max_polygon_nodes: c.max_polygon_nodes,
            max_smooth_nodes:  c.max_smooth_nodes,
            max_steer_points:  c.max_steer_points,
        };
        self.stats.requests += 1;

        match navigator.find_path(&req) {
            Ok(points) if !points.is_empty() => {
                log::debug!("path found: {} waypoints toward {target}", points.len());
                self.state.target = Some(target);
                self.state.origin = position;
                self.state.waypoints = points;
                self.state.current = 0;
                self.state.replan_wait = self.config.replan_wait_success;
            }
            Ok(_) => self.fail(position, target, "empty path"),
            Err(e) => self.fail(position, target, &e.to_string()),
        }
    }

    fn fail(&mut self, position: Vec3, target: Vec3, reason: &str) {
        log::debug!("path-find {position} -> {target} failed: {reason}");
        self.stats.failures += 1;
        self.state.clear();
        self.state.replan_wait = self.config.replan_wait_failure;
    }

    fn next_waypoint(&mut self, position: Vec3, reach_distance: f32) -> Option<Vec3> {
        while let Some(&wp) = self.state.waypoints.get(self.state.current) {
            if !self.within_reach(position, wp, reach_distance) {
                return Some(wp);
            }
            self.state.current += 1;
        }
        if self.state.has_path() {
            self.state.clear();
        }
        None
    }
}
