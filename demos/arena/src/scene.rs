//! Arena geometry and waypoint graph.
//!
//! A 24 × 24 m floor with a 0.3 m platform in the north-east corner and a
//! 1.5 m wall segment in the middle.  The waypoint grid skips nodes inside
//! the wall so routes go around it.

use glam::{Quat, Vec3};

use loco_nav::{WaypointGraph, WaypointGraphBuilder};
use loco_physics::{PhysicsResult, SimpleWorld};

pub const PLATFORM_HEIGHT: f32 = 0.3;

/// Centre and half extents of the wall.
const WALL: (Vec3, Vec3) = (Vec3::new(0.0, 0.0, 0.75), Vec3::new(0.25, 4.0, 0.75));

pub fn build_world() -> PhysicsResult<SimpleWorld> {
    let mut world = SimpleWorld::new();
    world.add_ground_plane(0.0)?;
    world.add_box(
        Vec3::new(8.0, 8.0, PLATFORM_HEIGHT / 2.0),
        Vec3::new(4.0, 4.0, PLATFORM_HEIGHT / 2.0),
        Quat::IDENTITY,
    )?;
    world.add_box(WALL.0, WALL.1, Quat::IDENTITY)?;
    Ok(world)
}

fn inside_wall(p: Vec3) -> bool {
    let (center, half) = WALL;
    let d = (p - center).abs();
    d.x <= half.x + 0.5 && d.y <= half.y + 0.5
}

/// 2 m grid over the floor, standing on the platform where it overlaps.
pub fn build_graph() -> WaypointGraph {
    const N: usize = 13;
    const SPACING: f32 = 2.0;
    let origin = Vec3::new(-12.0, -12.0, 0.0);

    let mut b = WaypointGraphBuilder::new();
    let mut ids = vec![None; N * N];
    for j in 0..N {
        for i in 0..N {
            let mut p = origin + Vec3::new(i as f32 * SPACING, j as f32 * SPACING, 0.0);
            if inside_wall(p) {
                continue;
            }
            if p.x >= 4.0 && p.y >= 4.0 {
                p.z = PLATFORM_HEIGHT;
            }
            ids[j * N + i] = Some(b.add_node(p));
        }
    }
    for j in 0..N {
        for i in 0..N {
            let Some(here) = ids[j * N + i] else { continue };
            if i + 1 < N {
                if let Some(east) = ids[j * N + i + 1] {
                    b.add_link(here, east);
                }
            }
            if j + 1 < N {
                if let Some(north) = ids[(j + 1) * N + i] {
                    b.add_link(here, north);
                }
            }
        }
    }
    b.build()
}
