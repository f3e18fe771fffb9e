//! Fluent builder for constructing a [`Sim`].

use loco_agent::EntityStoreBuilder;
use loco_core::SimConfig;
use loco_nav::Navigator;
use loco_physics::PhysicsWorld;

use crate::{Pose, Sim, SimResult};

/// Fluent builder for [`Sim<W, N>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, tick duration, …
/// - `W: PhysicsWorld`: the physics backend (e.g. [`loco_physics::SimpleWorld`])
/// - `N: Navigator`: the path source (e.g. [`loco_nav::WaypointGraph`])
///
/// # Optional inputs (have defaults)
///
/// | Method                      | Default                 |
/// |-----------------------------|-------------------------|
/// | `.capacity(n)`              | 64 pre-reserved slots   |
/// | `.register_component::<T>()`| only [`Pose`]           |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, SimpleWorld::new(), graph)
///     .capacity(256)
///     .build()?;
/// let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO))?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<W: PhysicsWorld, N: Navigator> {
    config:    SimConfig,
    physics:   W,
    navigator: N,
    entities:  EntityStoreBuilder,
}

impl<W: PhysicsWorld, N: Navigator> SimBuilder<W, N> {
    pub fn new(config: SimConfig, physics: W, navigator: N) -> Self {
        Self {
            config,
            physics,
            navigator,
            entities: EntityStoreBuilder::new(64).register_component::<Pose>(),
        }
    }

    /// Pre-reserve entity slots.  Components registered so far are kept.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.entities = self.entities.with_capacity(capacity);
        self
    }

    /// Attach an application-defined component to every entity.
    pub fn register_component<T: Default + 'static>(mut self) -> Self {
        self.entities = self.entities.register_component::<T>();
        self
    }

    /// Validate the configuration and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<W, N>> {
        self.config.validate()?;
        Ok(Sim::from_parts(self.config, self.entities.build(), self.physics, self.navigator))
    }
}
