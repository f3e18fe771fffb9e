//! Unit tests for loco-physics.

#[cfg(test)]
mod helpers {
    use glam::Vec3;

    use crate::{BodyDesc, PhysicsWorld, Shape, SimpleWorld};

    pub fn flat_world() -> SimpleWorld {
        let mut w = SimpleWorld::new();
        w.add_ground_plane(0.0).unwrap();
        w
    }

    /// Dynamic capsule body standing on `feet`, 1.8 tall, radius 0.4.
    pub fn add_character(w: &mut SimpleWorld, feet: Vec3) -> loco_core::BodyId {
        let shape = Shape::Capsule { a: Vec3::new(0.0, 0.0, 0.9), b: Vec3::new(0.0, 0.0, 1.4), radius: 0.4 };
        w.insert_body(BodyDesc::dynamic(shape, feet, 80.0)).unwrap()
    }
}

#[cfg(test)]
mod rays {
    use glam::{Quat, Vec3};

    use super::helpers::{add_character, flat_world};
    use crate::{ContactMask, PhysicsWorld, Ray};

    #[test]
    fn straight_down_hits_floor() {
        let w = flat_world();
        let hits = w.ray_cast_piercing(&Ray::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z, 5.0), ContactMask::ALL, &[]);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 1.0).abs() < 1e-5);
        assert!((hits[0].normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn too_short_ray_misses() {
        let w = flat_world();
        let hits = w.ray_cast_piercing(&Ray::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z, 0.5), ContactMask::ALL, &[]);
        assert!(hits.is_empty());
    }

    #[test]
    fn piercing_reports_every_body_in_order() {
        let mut w = flat_world();
        let far = w.add_box(Vec3::new(6.0, 0.0, 1.0), Vec3::splat(0.5), Quat::IDENTITY).unwrap();
        let near = w.add_box(Vec3::new(3.0, 0.0, 1.0), Vec3::splat(0.5), Quat::IDENTITY).unwrap();
        let hits = w.ray_cast_piercing(&Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X, 10.0), ContactMask::ALL, &[]);
        let bodies: Vec<_> = hits.iter().map(|h| h.body).collect();
        assert_eq!(bodies, vec![near, far]);
        assert!((hits[0].distance - 2.5).abs() < 1e-5);
        assert!((hits[0].normal + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn excluded_bodies_are_skipped() {
        let mut w = flat_world();
        let wall = w.add_box(Vec3::new(3.0, 0.0, 1.0), Vec3::splat(0.5), Quat::IDENTITY).unwrap();
        let hits = w.ray_cast_piercing(&Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X, 10.0), ContactMask::ALL, &[wall]);
        assert!(hits.is_empty());
    }

    #[test]
    fn origin_inside_hits_at_zero() {
        let mut w = flat_world();
        w.add_box(Vec3::new(0.0, 0.0, 1.0), Vec3::splat(0.5), Quat::IDENTITY).unwrap();
        let hits = w.ray_cast_piercing(&Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X, 2.0), ContactMask::ALL, &[]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn capsule_side_hit() {
        let mut w = flat_world();
        let c = add_character(&mut w, Vec3::new(5.0, 0.0, 0.0));
        let hits = w.ray_cast_piercing(&Ray::new(Vec3::new(0.0, 0.0, 1.2), Vec3::X, 10.0), ContactMask::ALL, &[]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].body, c);
        assert!((hits[0].distance - 4.6).abs() < 1e-4);
        assert!((hits[0].normal + Vec3::X).length() < 1e-4);
    }

    #[test]
    fn mask_filters_groups() {
        let mut w = flat_world();
        add_character(&mut w, Vec3::new(5.0, 0.0, 0.0));
        let hits = w.ray_cast_piercing(&Ray::new(Vec3::new(0.0, 0.0, 1.2), Vec3::X, 10.0), ContactMask::STATIC, &[]);
        assert!(hits.is_empty());
    }

    #[test]
    fn slope_normal_matches_angle() {
        let mut w = crate::SimpleWorld::new();
        let angle = 30f32.to_radians();
        w.add_slope(Vec3::ZERO, angle).unwrap();
        let hits = w.ray_cast_piercing(&Ray::new(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z, 5.0), ContactMask::ALL, &[]);
        assert_eq!(hits.len(), 1);
        assert!((loco_core::math::slope_angle(hits[0].normal) - angle).abs() < 1e-4);
    }
}

#[cfg(test)]
mod volumes {
    use glam::{Quat, Vec3};

    use super::helpers::flat_world;
    use crate::{Bounds, Capsule, ContactMask, PhysicsWorld, Volume};

    #[test]
    fn capsule_above_floor_is_clear() {
        let w = flat_world();
        let c = Capsule::upright(Vec3::new(0.0, 0.0, 0.01), 1.8, 0.4);
        assert!(w.volume_cast(&Volume::Capsule(c), ContactMask::ALL, &[]).is_empty());
    }

    #[test]
    fn capsule_through_floor_overlaps() {
        let w = flat_world();
        let c = Capsule::upright(Vec3::new(0.0, 0.0, -0.05), 1.8, 0.4);
        assert_eq!(w.volume_cast(&Volume::Capsule(c), ContactMask::ALL, &[]).len(), 1);
    }

    #[test]
    fn resting_just_above_box_is_clear() {
        let mut w = crate::SimpleWorld::new();
        w.add_box(Vec3::new(0.0, 0.0, 0.5), Vec3::splat(0.5), Quat::IDENTITY).unwrap();
        let c = Capsule::upright(Vec3::new(0.0, 0.0, 1.001), 1.8, 0.4);
        assert!(w.volume_cast(&Volume::Capsule(c), ContactMask::ALL, &[]).is_empty());
        let c = c.translated(Vec3::new(0.0, 0.0, -0.01));
        assert_eq!(w.volume_cast(&Volume::Capsule(c), ContactMask::ALL, &[]).len(), 1);
    }

    #[test]
    fn capsule_against_rotated_box() {
        let mut w = crate::SimpleWorld::new();
        let rot = Quat::from_rotation_z(45f32.to_radians());
        w.add_box(Vec3::new(0.0, 0.0, 1.0), Vec3::splat(1.0), rot).unwrap();
        // Corner of the rotated box reaches √2 along X.
        let near = Capsule::upright(Vec3::new(1.6, 0.0, 0.0), 1.8, 0.3);
        let far = Capsule::upright(Vec3::new(1.8, 0.0, 0.0), 1.8, 0.3);
        assert_eq!(w.volume_cast(&Volume::Capsule(near), ContactMask::ALL, &[]).len(), 1);
        assert!(w.volume_cast(&Volume::Capsule(far), ContactMask::ALL, &[]).is_empty());
    }

    #[test]
    fn bounds_query() {
        let mut w = flat_world();
        let b = w.add_box(Vec3::new(5.0, 0.0, 1.0), Vec3::splat(0.5), Quat::IDENTITY).unwrap();
        let hits = w.volume_cast(
            &Volume::Bounds(Bounds::from_center(Vec3::new(5.0, 0.0, 2.0), Vec3::splat(0.6))),
            ContactMask::ALL,
            &[],
        );
        assert_eq!(hits, vec![b]);
    }

}

#[cfg(test)]
mod bodies {
    use glam::{Quat, Vec3};

    use super::helpers::{add_character, flat_world};
    use crate::{BodyDesc, Capability, PhysicsError, PhysicsWorld, Shape, SimpleWorld};

    #[test]
    fn free_fall_under_gravity() {
        let mut w = SimpleWorld::new();
        let b = w.insert_body(BodyDesc::dynamic(Shape::Cuboid { half_extents: Vec3::splat(0.5) }, Vec3::new(0.0, 0.0, 10.0), 1.0)).unwrap();
        for _ in 0..10 {
            w.step(0.1);
        }
        let s = w.body(b).unwrap();
        assert!((s.linear_velocity.z + 9.81).abs() < 1e-3);
        assert!(s.position.z < 10.0 - 4.0);
    }

    #[test]
    fn impulse_changes_velocity_and_wakes() {
        let mut w = SimpleWorld::new().with_gravity(Vec3::ZERO);
        let b = w.insert_body(BodyDesc::dynamic(Shape::Cuboid { half_extents: Vec3::splat(0.5) }, Vec3::ZERO, 2.0)).unwrap();
        w.body_mut(b).unwrap().sleep();
        w.body_mut(b).unwrap().add_impulse(Vec3::new(4.0, 0.0, 0.0));
        assert!(!w.body(b).unwrap().sleeping);
        w.step(0.5);
        let s = w.body(b).unwrap();
        assert!((s.linear_velocity.x - 2.0).abs() < 1e-5);
        assert!((s.position.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn sleeping_body_stays_put() {
        let mut w = SimpleWorld::new();
        let b = w.insert_body(BodyDesc::dynamic(Shape::Cuboid { half_extents: Vec3::splat(0.5) }, Vec3::new(0.0, 0.0, 3.0), 1.0)).unwrap();
        w.body_mut(b).unwrap().sleep();
        w.step(0.1);
        assert_eq!(w.body(b).unwrap().position, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn damping_slows_body() {
        let mut w = SimpleWorld::new().with_gravity(Vec3::ZERO);
        let b = w.insert_body(
            BodyDesc::dynamic(Shape::Cuboid { half_extents: Vec3::splat(0.5) }, Vec3::ZERO, 1.0)
                .with_velocity(Vec3::new(1.0, 0.0, 0.0)),
        ).unwrap();
        w.body_mut(b).unwrap().linear_damping = 1.0;
        w.step(1.0);
        assert!((w.body(b).unwrap().linear_velocity.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn wall_blocks_horizontal_motion_only() {
        let mut w = flat_world();
        w.add_box(Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.1, 2.0, 2.0), Quat::IDENTITY).unwrap();
        let c = add_character(&mut w, Vec3::new(0.4, 0.0, 1.0));
        w.body_mut(c).unwrap().linear_velocity = Vec3::new(5.0, 0.0, 0.0);
        w.step(0.1);
        let s = w.body(c).unwrap();
        assert!((s.position.x - 0.4).abs() < 1e-6);
        assert!(s.position.z < 1.0);
        assert_eq!(s.linear_velocity.x, 0.0);
    }

    #[test]
    fn kinematic_ignores_gravity() {
        let mut w = SimpleWorld::new();
        let b = w.insert_body(
            BodyDesc::kinematic(Shape::Cuboid { half_extents: Vec3::splat(1.0) }, Vec3::ZERO)
                .with_velocity(Vec3::new(0.0, 2.0, 0.0)),
        ).unwrap();
        w.step(0.5);
        assert_eq!(w.body(b).unwrap().position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn removed_body_no_longer_resolves() {
        let mut w = flat_world();
        let b = w.add_box(Vec3::new(0.0, 0.0, 1.0), Vec3::splat(0.5), Quat::IDENTITY).unwrap();
        assert!(w.remove_body(b).is_ok());
        assert!(w.body(b).is_none());
        assert!(matches!(w.remove_body(b), Err(PhysicsError::BodyNotFound(_))));
        assert_eq!(w.body_count(), 1);
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let mut w = SimpleWorld::new();
        let bad = BodyDesc::fixed(Shape::Capsule { a: Vec3::ZERO, b: Vec3::Z, radius: 0.0 }, Vec3::ZERO);
        assert!(matches!(w.insert_body(bad), Err(PhysicsError::InvalidShape(_))));
        let bad = BodyDesc::fixed(Shape::HalfSpace { normal: Vec3::ZERO, offset: 0.0 }, Vec3::ZERO);
        assert!(w.insert_body(bad).is_err());
    }

    #[test]
    fn shape_change_can_be_disabled() {
        let mut w = SimpleWorld::new().without_capability(Capability::ShapeChange);
        let c = add_character(&mut w, Vec3::new(0.0, 0.0, 1.0));
        assert!(!w.supports(Capability::ShapeChange));
        let shape = Shape::Capsule { a: Vec3::ZERO, b: Vec3::Z, radius: 0.3 };
        assert!(matches!(w.set_shape(c, shape), Err(PhysicsError::Unsupported(Capability::ShapeChange))));
    }

    #[test]
    fn set_shape_replaces_collider() {
        let mut w = SimpleWorld::new();
        let c = add_character(&mut w, Vec3::new(0.0, 0.0, 1.0));
        let shape = Shape::Capsule { a: Vec3::ZERO, b: Vec3::Z, radius: 0.3 };
        w.set_shape(c, shape).unwrap();
        assert_eq!(w.shape(c), Some(&shape));
    }
}
