//! The `Sim` struct and its tick loop.

use glam::{Quat, Vec3};

use loco_agent::EntityStore;
use loco_core::{AgentRng, BodyId, EntityHandle, SimClock, SimConfig, Tick};
use loco_motion::LocomotionController;
use loco_nav::Navigator;
use loco_physics::{BodyDesc, Capability, ContactMask, PhysicsError, PhysicsWorld};
use loco_task::{EntityView, Task, TaskContext, TaskMachine, TaskRecord, TaskRegistry};

use crate::{
    AgentSample, Character, CharacterSnapshot, CharacterSpawn, Pose, SimError, SimObserver, SimResult,
    TickSummary,
};

// ── Entity view ───────────────────────────────────────────────────────────────

/// What one character's tasks may see of everything else.
///
/// The character being ticked is taken out of `characters` while the view
/// exists, so it reads as a plain body to itself.
struct SimView<'a, W: PhysicsWorld> {
    entities:   &'a EntityStore,
    physics:    &'a W,
    characters: &'a [Option<Character>],
}

impl<W: PhysicsWorld> SimView<'_, W> {
    fn position(&self, entity: EntityHandle) -> Option<(usize, Vec3)> {
        let slot = self.entities.resolve(entity)?;
        let body = self.entities.body[slot]?;
        Some((slot, self.physics.body(body)?.position))
    }
}

impl<W: PhysicsWorld> EntityView for SimView<'_, W> {
    fn ground_position(&self, entity: EntityHandle) -> Option<Vec3> {
        let (slot, position) = self.position(entity)?;
        let lift = self
            .characters
            .get(slot)
            .and_then(Option::as_ref)
            .map_or(0.0, |c| c.controller.shape().position_to_floor);
        Some(position - Vec3::Z * lift)
    }

    fn aim_point(&self, entity: EntityHandle) -> Option<Vec3> {
        self.position(entity).map(|(_, p)| p)
    }

    fn velocity(&self, entity: EntityHandle) -> Option<Vec3> {
        let body = self.entities.body(entity)?;
        Some(self.physics.body(body)?.linear_velocity)
    }

    fn body(&self, entity: EntityHandle) -> Option<BodyId> {
        self.entities.body(entity)
    }

    fn is_alive(&self, entity: EntityHandle) -> bool {
        self.entities.is_alive(entity)
    }

    fn is_marked(&self, entity: EntityHandle) -> bool {
        self.entities.is_marked(entity)
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<W, N>` owns the physics world, the navigator and every entity, and
/// drives a fixed-timestep loop.  Each tick runs these phases in order:
///
/// 1. **Purge**: tasks whose target entity no longer resolves are dropped.
/// 2. **Tasks**: weapon cooldowns advance, then each character's task
///    machine runs and its steering is handed to the locomotion controller.
/// 3. **Locomotion**: every controller probes, climbs and pushes its body.
/// 4. **Physics**: the world integrates one step.
/// 5. **Poses**: previous/current transforms are recorded for rendering.
/// 6. **Flush**: entities marked for deletion lose their bodies and their
///    slots; other characters forget tasks aimed at them.
///
/// Characters are processed in ascending slot order, so a given seed and
/// spawn sequence always reproduces the same run.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<W: PhysicsWorld, N: Navigator> {
    /// Global configuration (total ticks, seed, tick duration, …).
    pub config: SimConfig,

    /// Simulation clock: tracks the current tick and maps to wall time.
    pub clock: SimClock,

    /// Generational entity slots, with a [`Pose`] component per slot.
    pub entities: EntityStore,

    pub physics: W,

    pub navigator: N,

    /// Indexed by entity slot.  `None` for props and free slots.
    characters: Vec<Option<Character>>,
}

impl<W: PhysicsWorld, N: Navigator> Sim<W, N> {
    pub(crate) fn from_parts(config: SimConfig, entities: EntityStore, physics: W, navigator: N) -> Self {
        Self {
            clock: config.make_clock(),
            config,
            entities,
            physics,
            navigator,
            characters: Vec::new(),
        }
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let summary = self.process_tick(now)?;
        observer.on_tick_end(now, &summary);
        if self.config.output_interval_ticks > 0 && now.0.is_multiple_of(self.config.output_interval_ticks) {
            observer.on_snapshot(now, &self.samples());
        }
        self.clock.advance();
        Ok(())
    }

    // ── Entities ──────────────────────────────────────────────────────────

    /// Spawn a character standing at `spawn.feet`.
    ///
    /// A character whose capsule configuration is invalid still gets an
    /// entity and a task machine, but no body; it never moves.
    pub fn spawn_character(&mut self, spawn: CharacterSpawn) -> SimResult<EntityHandle> {
        let controller = LocomotionController::new(spawn.config);
        let position = spawn.feet + Vec3::Z * controller.shape().position_to_floor;

        let body = if controller.is_degraded() {
            None
        } else {
            let desc = BodyDesc::dynamic(controller.shape().body_shape(), position, controller.config.mass)
                .with_rotation(spawn.rotation)
                .with_group(ContactMask::CHARACTER);
            Some(self.physics.insert_body(desc)?)
        };

        let handle = self.entities.spawn(body);
        if let Some(pose) = self.entities.get_mut::<Pose>(handle) {
            *pose = Pose::at(position, spawn.rotation);
        }

        let slot = handle.index();
        if self.characters.len() <= slot {
            self.characters.resize_with(slot + 1, || None);
        }
        self.characters[slot] = Some(Character {
            controller,
            tasks: TaskMachine::new(spawn.path, spawn.attack),
            weapons: spawn.weapons,
            rng: AgentRng::new(self.config.seed, handle),
            animation_locked: false,
        });
        log::debug!("spawned character {handle:?} body={body:?}");
        Ok(handle)
    }

    /// Spawn a non-character entity owning the body described by `desc`.
    pub fn spawn_prop(&mut self, desc: BodyDesc) -> SimResult<EntityHandle> {
        let (position, rotation) = (desc.position, desc.rotation);
        let body = self.physics.insert_body(desc)?;
        let handle = self.entities.spawn(Some(body));
        if let Some(pose) = self.entities.get_mut::<Pose>(handle) {
            *pose = Pose::at(position, rotation);
        }
        Ok(handle)
    }

    /// Mark `entity` for deletion.  It keeps resolving until the end of the
    /// current (or next) tick.
    pub fn delete_entity(&mut self, entity: EntityHandle) -> SimResult<()> {
        if self.entities.mark_for_deletion(entity) {
            Ok(())
        } else {
            Err(SimError::EntityNotFound(entity))
        }
    }

    pub fn character(&self, entity: EntityHandle) -> Option<&Character> {
        let slot = self.entities.resolve(entity)?;
        self.characters.get(slot)?.as_ref()
    }

    pub fn character_mut(&mut self, entity: EntityHandle) -> Option<&mut Character> {
        let slot = self.entities.resolve(entity)?;
        self.characters.get_mut(slot)?.as_mut()
    }

    /// Live character handles in ascending slot order.
    pub fn characters(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.entities
            .handles()
            .filter(|h| self.characters.get(h.index()).is_some_and(Option::is_some))
    }

    /// Current body position, or `None` for a deleted or bodiless entity.
    pub fn position(&self, entity: EntityHandle) -> Option<Vec3> {
        let body = self.entities.body(entity)?;
        Some(self.physics.body(body)?.position)
    }

    /// Where a character's feet are.
    pub fn feet(&self, entity: EntityHandle) -> Option<Vec3> {
        let character = self.character(entity)?;
        Some(character.controller.shape().feet(self.position(entity)?))
    }

    /// Transform for rendering `alpha` of the way through the last tick.
    pub fn render_pose(&self, entity: EntityHandle, alpha: f32) -> Option<(Vec3, Quat)> {
        self.entities.get::<Pose>(entity).map(|p| p.interpolate(alpha))
    }

    // ── Commands ──────────────────────────────────────────────────────────

    pub fn do_task(&mut self, entity: EntityHandle, task: Task, enqueue: bool) -> SimResult<()> {
        self.require_character(entity)?.tasks.do_task(task, enqueue);
        Ok(())
    }

    pub fn request_jump(&mut self, entity: EntityHandle) -> SimResult<()> {
        self.require_character(entity)?.controller.request_jump();
        Ok(())
    }

    /// Returns `false` when the stance change is refused (locked, blocked
    /// or no body).
    pub fn set_crouch(&mut self, entity: EntityHandle, crouch: bool) -> SimResult<bool> {
        let character = character_in(&self.entities, &mut self.characters, entity)?;
        let Some(body) = self.entities.body(entity) else {
            return Ok(false);
        };
        Ok(character.controller.set_crouch(crouch, body, &mut self.physics)?)
    }

    fn require_character(&mut self, entity: EntityHandle) -> SimResult<&mut Character> {
        character_in(&self.entities, &mut self.characters, entity)
    }

    // ── Persistence ───────────────────────────────────────────────────────

    pub fn save_character(&self, entity: EntityHandle) -> SimResult<CharacterSnapshot> {
        let slot = self.entities.resolve(entity).ok_or(SimError::EntityNotFound(entity))?;
        let character = self
            .characters
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or(SimError::NotACharacter(entity))?;
        let state = self.entities.body[slot].and_then(|b| self.physics.body(b));
        let (position, rotation, linear_velocity) = match state {
            Some(s) => (s.position, s.rotation, s.linear_velocity),
            None => (Vec3::ZERO, Quat::IDENTITY, Vec3::ZERO),
        };
        Ok(CharacterSnapshot {
            position,
            rotation,
            linear_velocity,
            locomotion: character.controller.snapshot(),
            current_task: TaskRecord::of(character.tasks.current()),
            queued_tasks: character.tasks.queue().iter().map(TaskRecord::of).collect(),
        })
    }

    /// Overwrite a spawned character with saved state.
    ///
    /// Every task record is rebuilt through `registry` before anything is
    /// touched; an unknown task kind aborts the load and leaves the
    /// character unchanged.
    pub fn load_character(
        &mut self,
        entity:   EntityHandle,
        snapshot: &CharacterSnapshot,
        registry: &TaskRegistry,
    ) -> SimResult<()> {
        let current = registry.restore(&snapshot.current_task)?;
        let queued = registry.restore_all(&snapshot.queued_tasks)?;

        let body = self.entities.body(entity);
        let character = self.require_character(entity)?;
        character.controller.restore(&snapshot.locomotion);
        character.tasks.restore(current, queued);
        let shape = character.controller.shape().body_shape();

        if let Some(body) = body {
            if self.physics.supports(Capability::ShapeChange) {
                self.physics.set_shape(body, shape)?;
            }
            let state = self.physics.body_mut(body).ok_or(PhysicsError::BodyNotFound(body))?;
            state.position = snapshot.position;
            state.rotation = snapshot.rotation;
            state.linear_velocity = snapshot.linear_velocity;
            state.wake();
        }
        if let Some(pose) = self.entities.get_mut::<Pose>(entity) {
            *pose = Pose::at(snapshot.position, snapshot.rotation);
        }
        log::debug!("loaded character {entity:?}");
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> SimResult<TickSummary> {
        let dt = self.clock.tick_duration_secs;
        let handles: Vec<EntityHandle> = self.characters().collect();
        let mut summary = TickSummary { characters: handles.len(), ..TickSummary::default() };

        // ── Phase 1: purge tasks aimed at vanished entities ───────────────
        for &handle in &handles {
            self.with_character(handle, |character, view, _| {
                character.tasks.purge(view);
            });
        }

        // ── Phase 2: tasks → steering ─────────────────────────────────────
        for &handle in &handles {
            let Some(body) = self.entities.body(handle) else {
                continue;
            };
            let shots = self.with_character(handle, |character, view, navigator| {
                let Some(state) = view.physics.body(body) else {
                    return 0;
                };
                for weapon in character.weapons.iter_mut() {
                    weapon.tick(dt);
                }

                let feet = character.controller.shape().feet(state.position);
                let mut ctx = TaskContext {
                    agent: handle,
                    body: Some(body),
                    feet,
                    eye: feet + Vec3::Z * character.tasks.attack.eye_height,
                    dt,
                    on_ground: character.controller.is_on_ground(),
                    since_ground_contact: character.controller.elapsed_since_ground_contact(),
                    animation_locked: character.animation_locked,
                    physics: view.physics,
                    navigator,
                    entities: view,
                    rng: &mut character.rng,
                };
                let steering = character.tasks.tick(&mut ctx, &mut character.weapons);

                character.controller.set_move_vector(steering.move_vector);
                if let Some(face) = steering.face {
                    character.controller.turn_to(face);
                }
                character.tasks.shots_fired()
            });
            summary.shots += shots.unwrap_or(0);
        }

        // ── Phase 3: locomotion ───────────────────────────────────────────
        for &handle in &handles {
            let (Some(Some(character)), Some(body)) =
                (self.characters.get_mut(handle.index()), self.entities.body(handle))
            else {
                continue;
            };
            character.controller.tick(body, &mut self.physics, dt)?;
        }

        // ── Phase 4: physics ──────────────────────────────────────────────
        self.physics.step(dt);

        // ── Phase 5: poses and counts ─────────────────────────────────────
        let live: Vec<EntityHandle> = self.entities.handles().collect();
        for handle in live {
            let Some(state) = self.entities.body(handle).and_then(|b| self.physics.body(b)) else {
                continue;
            };
            let (position, rotation, sleeping) = (state.position, state.rotation, state.sleeping);
            if let Some(pose) = self.entities.get_mut::<Pose>(handle) {
                pose.record(position, rotation);
            }
            if let Some(character) = self.character(handle) {
                summary.grounded += usize::from(character.controller.is_on_ground());
                summary.sleeping += usize::from(sleeping);
            }
        }

        // ── Phase 6: flush deletions ──────────────────────────────────────
        let removed = self.entities.flush_deletions();
        summary.deleted = removed.len();
        for (handle, body) in removed {
            if let Some(body) = body {
                self.physics.remove_body(body)?;
            }
            if let Some(slot) = self.characters.get_mut(handle.index()) {
                *slot = None;
            }
            for character in self.characters.iter_mut().flatten() {
                character.tasks.forget(handle);
            }
            log::debug!("{now}: deleted {handle:?}");
        }

        Ok(summary)
    }

    /// Run `f` on one character with a view of everything else.
    fn with_character<R>(
        &mut self,
        entity: EntityHandle,
        f: impl FnOnce(&mut Character, &SimView<'_, W>, &N) -> R,
    ) -> Option<R> {
        let slot = self.entities.resolve(entity)?;
        let mut character = self.characters.get_mut(slot)?.take()?;
        let view = SimView { entities: &self.entities, physics: &self.physics, characters: &self.characters };
        let out = f(&mut character, &view, &self.navigator);
        self.characters[slot] = Some(character);
        Some(out)
    }

    /// One sample per live character, ascending slot order.
    pub fn samples(&self) -> Vec<AgentSample> {
        self.characters()
            .filter_map(|entity| {
                let character = self.character(entity)?;
                let state = self.entities.body(entity).and_then(|b| self.physics.body(b));
                Some(AgentSample {
                    entity,
                    position: state.map_or(Vec3::ZERO, |s| s.position),
                    velocity: state.map_or(Vec3::ZERO, |s| s.linear_velocity),
                    on_ground: character.controller.is_on_ground(),
                    ground_distance: character.controller.ground_distance(),
                    sleeping: state.is_some_and(|s| s.sleeping),
                    crouched: character.controller.is_crouched(),
                    task: character.tasks.current().kind(),
                    queued: character.tasks.queue().len(),
                })
            })
            .collect()
    }
}

fn character_in<'a>(
    entities:   &EntityStore,
    characters: &'a mut [Option<Character>],
    entity:     EntityHandle,
) -> SimResult<&'a mut Character> {
    let slot = entities.resolve(entity).ok_or(SimError::EntityNotFound(entity))?;
    characters.get_mut(slot).and_then(Option::as_mut).ok_or(SimError::NotACharacter(entity))
}
