//! Unit tests for loco-core primitives.

#[cfg(test)]
mod ids {
    use crate::{BodyId, EdgeId, EntityHandle, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = BodyId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(BodyId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(BodyId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert!(EntityHandle::default().is_invalid());
    }

    #[test]
    fn handles_with_different_generations_differ() {
        let a = EntityHandle::new(3, 0);
        let b = EntityHandle::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
    }

    #[test]
    fn display() {
        assert_eq!(BodyId(7).to_string(), "BodyId(7)");
        assert_eq!(EntityHandle::new(2, 5).to_string(), "Entity(2v5)");
    }
}

#[cfg(test)]
mod math {
    use glam::Vec3;

    use crate::math::{flat_distance, flat_segment_distance, slope_angle, yaw_towards};

    #[test]
    fn flat_distance_ignores_height() {
        let d = flat_distance(Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 4.0, 100.0));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn slope_of_floor_and_wall() {
        assert!(slope_angle(Vec3::Z).abs() < 1e-5);
        assert!((slope_angle(Vec3::X) - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 0.0, 0.0);
        assert!((flat_segment_distance(Vec3::new(5.0, 2.0, 7.0), a, b) - 2.0).abs() < 1e-5);
        assert!((flat_segment_distance(Vec3::new(-3.0, 4.0, 0.0), a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn yaw_towards_vertical_is_none() {
        assert!(yaw_towards(Vec3::Z).is_none());
        let q = yaw_towards(Vec3::Y).unwrap();
        let facing = q * Vec3::X;
        assert!((facing - Vec3::Y).length() < 1e-5);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn clock_display_shows_tick_and_seconds() {
        let mut clock = SimClock::new(0.5);
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_tick, Tick(2));
        assert_eq!(clock.to_string(), "T2 (1.000s)");
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = SimClock::new(0.5);
        assert_eq!(clock.elapsed_secs(), 0.0);
        clock.advance();
        clock.advance();
        assert!((clock.elapsed_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn config_validation() {
        assert!(SimConfig::default().validate().is_ok());
        let bad = SimConfig { tick_duration_secs: 0.0, ..SimConfig::default() };
        assert!(bad.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentRng, EntityHandle};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, EntityHandle::new(0, 0));
        let mut r2 = AgentRng::new(12345, EntityHandle::new(0, 0));
        for _ in 0..100 {
            let a: f32 = r1.gen_range(-1.0..=1.0);
            let b: f32 = r2.gen_range(-1.0..=1.0);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn reused_slot_gets_new_stream() {
        let mut r0 = AgentRng::new(1, EntityHandle::new(4, 0));
        let mut r1 = AgentRng::new(1, EntityHandle::new(4, 1));
        let a: u64 = r0.gen_range(0..u64::MAX);
        let b: u64 = r1.gen_range(0..u64::MAX);
        assert_ne!(a, b);
    }
}
