//! Integration tests for loco-sim.

use glam::{Quat, Vec3};

use loco_core::{SimConfig, Tick};
use loco_nav::{NavResult, Navigator, PathRequest};
use loco_physics::SimpleWorld;

use crate::{AgentSample, Sim, SimBuilder, SimObserver, TickSummary};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Straight-line navigator: the goal is the only waypoint.
struct Direct;

impl Navigator for Direct {
    fn find_path(&self, request: &PathRequest) -> NavResult<Vec<Vec3>> {
        Ok(vec![request.to])
    }
}

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        tick_duration_secs:    1.0 / 60.0,
        total_ticks,
        seed:                  42,
        output_interval_ticks: 1,
    }
}

fn arena(world: SimpleWorld) -> Sim<SimpleWorld, Direct> {
    SimBuilder::new(test_config(600), world, Direct).build().unwrap()
}

fn flat_arena() -> Sim<SimpleWorld, Direct> {
    let mut w = SimpleWorld::new();
    w.add_ground_plane(0.0).unwrap();
    arena(w)
}

#[derive(Default)]
struct Recorder {
    summaries: Vec<TickSummary>,
    snapshots: Vec<(Tick, Vec<AgentSample>)>,
    ended:     Option<Tick>,
}

impl SimObserver for Recorder {
    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        self.summaries.push(*summary);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[AgentSample]) {
        self.snapshots.push((tick, agents.to_vec()));
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.ended = Some(final_tick);
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::SimError;

    #[test]
    fn builds_with_defaults() {
        let sim = flat_arena();
        assert_eq!(sim.characters().count(), 0);
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
    }

    #[test]
    fn zero_timestep_is_rejected() {
        let config = SimConfig { tick_duration_secs: 0.0, ..test_config(10) };
        let result = SimBuilder::new(config, SimpleWorld::new(), Direct).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}

// ── Run loop and observers ────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;
    use crate::{CharacterSpawn, NoopObserver};

    #[test]
    fn run_stops_at_end_tick() {
        let mut w = SimpleWorld::new();
        w.add_ground_plane(0.0).unwrap();
        let config = SimConfig { output_interval_ticks: 5, ..test_config(10) };
        let mut sim = SimBuilder::new(config, w, Direct).build().unwrap();
        sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();

        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(sim.clock.current_tick, Tick(10));
        assert_eq!(rec.summaries.len(), 10);
        assert_eq!(rec.snapshots.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec![Tick(0), Tick(5)]);
        assert_eq!(rec.ended, Some(Tick(10)));
        assert!(rec.summaries.iter().all(|s| s.characters == 1));
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let mut sim = flat_arena();
        sim.run_ticks(3, &mut NoopObserver).unwrap();
        sim.run_ticks(2, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(5));
    }

    #[test]
    fn idle_character_settles_and_sleeps() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();

        let mut rec = Recorder::default();
        sim.run_ticks(30, &mut rec).unwrap();

        let last = rec.summaries.last().unwrap();
        assert_eq!(last.grounded, 1);
        assert_eq!(last.sleeping, 1);
        let sample = &rec.snapshots.last().unwrap().1[0];
        assert_eq!(sample.entity, bot);
        assert!(sample.on_ground);
        assert!(sim.feet(bot).unwrap().z.abs() < 0.03);
    }
}

// ── Spawning and commands ─────────────────────────────────────────────────────

#[cfg(test)]
mod entity_tests {
    use super::*;
    use loco_motion::{CapsuleShape, CharacterConfig};
    use loco_physics::{BodyDesc, ContactMask, PhysicsWorld, Shape};
    use loco_task::Task;

    use crate::{CharacterSpawn, NoopObserver, SimError};

    #[test]
    fn character_body_floats_above_feet() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::new(1.0, 2.0, 0.0))).unwrap();

        let p = sim.position(bot).unwrap();
        assert!((p - Vec3::new(1.0, 2.0, 1.15)).length() < 1e-5);
        assert!(sim.feet(bot).unwrap().distance(Vec3::new(1.0, 2.0, 0.0)) < 1e-5);

        let body = sim.entities.body(bot).unwrap();
        assert_eq!(sim.physics.body(body).unwrap().group, ContactMask::CHARACTER);
    }

    #[test]
    fn invalid_capsule_spawns_without_body() {
        let mut sim = flat_arena();
        let config = CharacterConfig {
            standing: CapsuleShape { radius: 0.0, ..CapsuleShape::STANDING },
            ..CharacterConfig::default()
        };
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO).with_config(config)).unwrap();

        assert!(sim.character(bot).unwrap().is_degraded());
        assert_eq!(sim.entities.body(bot), None);
        assert_eq!(sim.position(bot), None);

        sim.do_task(bot, Task::move_to(Vec3::new(5.0, 0.0, 0.0), 1.0), false).unwrap();
        sim.run_ticks(10, &mut NoopObserver).unwrap();
        assert!(!sim.character(bot).unwrap().tasks.current().is_idle());
    }

    #[test]
    fn props_are_not_characters() {
        let mut sim = flat_arena();
        let crate_box = sim
            .spawn_prop(BodyDesc::fixed(Shape::Cuboid { half_extents: Vec3::splat(0.5) }, Vec3::new(3.0, 0.0, 0.5)))
            .unwrap();

        assert!(sim.character(crate_box).is_none());
        assert_eq!(sim.characters().count(), 0);
        assert!(matches!(
            sim.do_task(crate_box, Task::Idle, false),
            Err(SimError::NotACharacter(_))
        ));
    }

    #[test]
    fn stale_handle_no_longer_resolves() {
        let mut sim = flat_arena();
        let old = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.delete_entity(old).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        let new = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert!(sim.character(old).is_none());
        assert!(matches!(sim.do_task(old, Task::Idle, false), Err(SimError::EntityNotFound(_))));
        assert!(matches!(sim.delete_entity(old), Err(SimError::EntityNotFound(_))));
    }

    #[test]
    fn deleted_body_leaves_the_world() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        let body = sim.entities.body(bot).unwrap();
        sim.delete_entity(bot).unwrap();
        assert!(sim.physics.body(body).is_some());

        let mut rec = Recorder::default();
        sim.run_ticks(1, &mut rec).unwrap();
        assert!(sim.physics.body(body).is_none());
        assert_eq!(rec.summaries[0].deleted, 1);
    }

    #[test]
    fn jump_request_reaches_controller() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.run_ticks(5, &mut NoopObserver).unwrap();
        sim.request_jump(bot).unwrap();
        sim.run_ticks(10, &mut NoopObserver).unwrap();
        assert!(sim.feet(bot).unwrap().z > 0.3);
    }

    #[test]
    fn crouch_moves_body_down() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.run_ticks(5, &mut NoopObserver).unwrap();
        let standing = sim.position(bot).unwrap().z;

        assert!(sim.set_crouch(bot, true).unwrap());
        assert!(sim.position(bot).unwrap().z < standing);
        assert!(sim.character(bot).unwrap().controller.is_crouched());
        assert!(sim.feet(bot).unwrap().z.abs() < 0.05);
    }
}

// ── Tasks driving locomotion ──────────────────────────────────────────────────

#[cfg(test)]
mod task_tests {
    use super::*;
    use loco_physics::PhysicsWorld;
    use loco_task::{FireRange, SimpleWeapon, Task, TaskKind};

    use crate::{CharacterSpawn, NoopObserver};

    #[test]
    fn move_task_walks_to_target_and_finishes() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(8.0, 0.0, 0.0), 1.0), false).unwrap();

        sim.run_ticks(180, &mut NoopObserver).unwrap();

        let feet = sim.feet(bot).unwrap();
        assert!(feet.x > 6.5 && feet.x < 9.5, "feet {feet}");
        assert!(feet.y.abs() < 0.1);
        assert!(sim.character(bot).unwrap().tasks.current().is_idle());
    }

    #[test]
    fn queued_moves_run_in_order() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(4.0, 0.0, 0.0), 1.0), false).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(4.0, 4.0, 0.0), 1.0), true).unwrap();
        assert_eq!(sim.character(bot).unwrap().tasks.queue().len(), 1);

        sim.run_ticks(300, &mut NoopObserver).unwrap();

        let feet = sim.feet(bot).unwrap();
        assert!(feet.distance(Vec3::new(4.0, 4.0, 0.0)) < 2.5, "feet {feet}");
        let tasks = &sim.character(bot).unwrap().tasks;
        assert!(tasks.current().is_idle());
        assert!(tasks.queue().is_empty());
    }

    #[test]
    fn move_task_climbs_a_step() {
        let mut w = SimpleWorld::new();
        w.add_ground_plane(0.0).unwrap();
        w.add_box(Vec3::new(3.5, 0.0, 0.15), Vec3::new(3.0, 2.0, 0.15), Quat::IDENTITY).unwrap();
        let mut sim = arena(w);
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(5.0, 0.0, 0.3), 1.0), false).unwrap();

        sim.run_ticks(120, &mut NoopObserver).unwrap();

        let feet = sim.feet(bot).unwrap();
        assert!(feet.x > 3.5, "feet {feet}");
        assert!((feet.z - 0.3).abs() < 0.05, "feet {feet}");
        assert!(sim.character(bot).unwrap().tasks.current().is_idle());
    }

    #[test]
    fn follow_tracks_a_moving_character() {
        let mut sim = flat_arena();
        let leader = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        let follower = sim.spawn_character(CharacterSpawn::at(Vec3::new(-3.0, 0.0, 0.0))).unwrap();
        sim.do_task(leader, Task::move_to(Vec3::new(10.0, 0.0, 0.0), 1.0), false).unwrap();
        sim.do_task(follower, Task::follow(leader, 2.0), false).unwrap();

        sim.run_ticks(30, &mut NoopObserver).unwrap();
        let f = sim.feet(follower).unwrap();
        assert!(f.x > -3.0, "follower stayed at {f}");
        let follower_task = sim.character(follower).unwrap().tasks.current().kind();
        assert_eq!(follower_task, TaskKind::Move);
    }

    #[test]
    fn attack_holds_range_and_fires() {
        let mut sim = flat_arena();
        let weapon = SimpleWeapon::hitscan(FireRange::new(0.0, 20.0), 0.5);
        let shooter = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO).with_weapon(weapon)).unwrap();
        let target = sim.spawn_character(CharacterSpawn::at(Vec3::new(8.0, 0.0, 0.0))).unwrap();
        sim.do_task(shooter, Task::attack(target), false).unwrap();

        let mut rec = Recorder::default();
        sim.run_ticks(60, &mut rec).unwrap();

        let shots: usize = rec.summaries.iter().map(|s| s.shots).sum();
        assert_eq!(shots, 2);
        assert!(sim.feet(shooter).unwrap().length() < 0.1);
        assert_eq!(sim.character(shooter).unwrap().tasks.current().kind(), TaskKind::Attack);
    }

    #[test]
    fn attack_closes_distance_when_too_far() {
        let mut sim = flat_arena();
        let shooter = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        let target = sim.spawn_character(CharacterSpawn::at(Vec3::new(30.0, 0.0, 0.0))).unwrap();
        sim.do_task(shooter, Task::attack(target), false).unwrap();

        sim.run_ticks(60, &mut NoopObserver).unwrap();
        assert!(sim.feet(shooter).unwrap().x > 2.0);
    }

    #[test]
    fn deleting_attack_target_advances_queue() {
        let mut sim = flat_arena();
        let shooter = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        let target = sim.spawn_character(CharacterSpawn::at(Vec3::new(8.0, 0.0, 0.0))).unwrap();
        sim.do_task(shooter, Task::attack(target), false).unwrap();
        sim.do_task(shooter, Task::move_to(Vec3::new(0.0, 5.0, 0.0), 1.0), true).unwrap();
        sim.run_ticks(5, &mut NoopObserver).unwrap();

        sim.delete_entity(target).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        assert!(!sim.entities.is_alive(target));
        let tasks = &sim.character(shooter).unwrap().tasks;
        assert_eq!(tasks.current().kind(), TaskKind::Move);
        assert!(tasks.queue().is_empty());
    }

    #[test]
    fn queued_tasks_on_deleted_entity_are_forgotten() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        let other = sim.spawn_character(CharacterSpawn::at(Vec3::new(6.0, 0.0, 0.0))).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(20.0, 0.0, 0.0), 1.0), false).unwrap();
        sim.do_task(bot, Task::attack(other), true).unwrap();
        sim.do_task(bot, Task::follow(other, 2.0), true).unwrap();
        assert_eq!(sim.character(bot).unwrap().tasks.queue().len(), 2);

        sim.delete_entity(other).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        let tasks = &sim.character(bot).unwrap().tasks;
        assert_eq!(tasks.current().kind(), TaskKind::Move);
        assert!(tasks.queue().is_empty());
    }

    #[test]
    fn animation_lock_freezes_steering() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.character_mut(bot).unwrap().animation_locked = true;
        sim.do_task(bot, Task::move_to(Vec3::new(8.0, 0.0, 0.0), 1.0), false).unwrap();

        sim.run_ticks(30, &mut NoopObserver).unwrap();
        assert!(sim.feet(bot).unwrap().x.abs() < 0.05);

        sim.character_mut(bot).unwrap().animation_locked = false;
        sim.run_ticks(30, &mut NoopObserver).unwrap();
        assert!(sim.feet(bot).unwrap().x > 0.5);
        let body = sim.entities.body(bot).unwrap();
        assert!(!sim.physics.body(body).unwrap().sleeping);
    }
}

// ── Rendering, persistence, determinism ───────────────────────────────────────

#[cfg(test)]
mod state_tests {
    use super::*;
    use loco_task::{Task, TaskError, TaskKind, TaskRegistry};

    use crate::{CharacterSnapshot, CharacterSpawn, NoopObserver, SimError};

    #[test]
    fn render_pose_interpolates_last_tick() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(8.0, 0.0, 0.0), 1.0), false).unwrap();
        sim.run_ticks(20, &mut NoopObserver).unwrap();
        let before = sim.position(bot).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        let after = sim.position(bot).unwrap();
        assert!(after.x > before.x);

        let (start, _) = sim.render_pose(bot, 0.0).unwrap();
        let (mid, _) = sim.render_pose(bot, 0.5).unwrap();
        let (end, _) = sim.render_pose(bot, 1.0).unwrap();
        assert_eq!(start, before);
        assert!(end.distance(after) < 1e-5);
        assert!(mid.distance(before.lerp(after, 0.5)) < 1e-5);
        assert_eq!(sim.render_pose(bot, 3.0).map(|p| p.0), Some(end));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(8.0, 0.0, 0.0), 1.0), false).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(8.0, 8.0, 0.0), 1.0), true).unwrap();
        sim.run_ticks(20, &mut NoopObserver).unwrap();

        let snap = sim.save_character(bot).unwrap();
        let json = snap.to_json().unwrap();
        let back = CharacterSnapshot::from_json(&json).unwrap();
        assert_eq!(back, snap);
        assert_eq!(back.current_task.kind, "move");
        assert_eq!(back.queued_tasks.len(), 1);
    }

    #[test]
    fn load_restores_body_and_tasks() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(8.0, 0.0, 0.0), 1.0), false).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(8.0, 8.0, 0.0), 1.0), true).unwrap();
        sim.run_ticks(20, &mut NoopObserver).unwrap();
        let snap = sim.save_character(bot).unwrap();

        let copy = sim.spawn_character(CharacterSpawn::at(Vec3::new(0.0, -5.0, 0.0))).unwrap();
        sim.load_character(copy, &snap, &TaskRegistry::builtin()).unwrap();

        assert_eq!(sim.position(copy), Some(snap.position));
        let tasks = &sim.character(copy).unwrap().tasks;
        assert_eq!(*tasks.current(), Task::move_to(Vec3::new(8.0, 0.0, 0.0), 1.0));
        assert_eq!(tasks.queue().len(), 1);
        assert_eq!(sim.render_pose(copy, 0.0).map(|p| p.0), Some(snap.position));
    }

    #[test]
    fn unknown_task_kind_aborts_load() {
        let mut sim = flat_arena();
        let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
        sim.do_task(bot, Task::move_to(Vec3::new(8.0, 0.0, 0.0), 1.0), false).unwrap();
        let mut snap = sim.save_character(bot).unwrap();
        snap.queued_tasks.push(loco_task::TaskRecord { kind: "dance".into(), ..snap.current_task.clone() });
        snap.position = Vec3::new(50.0, 0.0, 1.15);

        let result = sim.load_character(bot, &snap, &TaskRegistry::builtin());
        assert!(matches!(result, Err(SimError::Task(TaskError::UnknownKind(k))) if k == "dance"));

        // Nothing was applied.
        assert!(sim.position(bot).unwrap().x < 1.0);
        assert_eq!(sim.character(bot).unwrap().tasks.current().kind(), TaskKind::Move);
    }

    #[test]
    fn same_seed_same_run() {
        fn play() -> Vec<Vec3> {
            let mut sim = flat_arena();
            let a = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO)).unwrap();
            let b = sim.spawn_character(CharacterSpawn::at(Vec3::new(20.0, 3.0, 0.0))).unwrap();
            sim.do_task(a, Task::attack(b), false).unwrap();
            sim.do_task(b, Task::move_to(Vec3::new(-5.0, -5.0, 0.0), 1.0), false).unwrap();
            sim.run_ticks(90, &mut NoopObserver).unwrap();
            sim.characters().filter_map(|h| sim.position(h)).collect()
        }
        assert_eq!(play(), play());
    }
}
