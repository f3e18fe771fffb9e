//! `loco-sim`: fixed-timestep orchestrator for the loco character framework.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Purge         tasks aimed at entities that no longer resolve are dropped.
//!   ② Tasks         weapons cool down; TaskMachine::tick runs per character
//!                   and its Steering is handed to the controller.
//!   ③ Locomotion    LocomotionController::tick probes, climbs and pushes.
//!   ④ Physics       PhysicsWorld::step integrates bodies.
//!   ⑤ Poses         previous/current transforms recorded for rendering.
//!   ⑥ Flush         marked entities lose bodies and slots; survivors
//!                   forget tasks aimed at them.
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`sim`]       | `Sim<W, N>` and its tick loop                            |
//! | [`builder`]   | `SimBuilder`                                             |
//! | [`character`] | `Character`, `CharacterSpawn`, `Pose`                    |
//! | [`snapshot`]  | `CharacterSnapshot` save/load (JSON)                     |
//! | [`observer`]  | `SimObserver`, `AgentSample`, `TickSummary`              |
//! | [`error`]     | `SimError`, `SimResult<T>`                               |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use glam::Vec3;
//! use loco_core::SimConfig;
//! use loco_nav::WaypointGraph;
//! use loco_physics::SimpleWorld;
//! use loco_sim::{CharacterSpawn, NoopObserver, SimBuilder};
//! use loco_task::Task;
//!
//! let mut world = SimpleWorld::new();
//! world.add_ground_plane(0.0)?;
//! let mut sim = SimBuilder::new(SimConfig::default(), world, WaypointGraph::empty()).build()?;
//! let bot = sim.spawn_character(CharacterSpawn::at(Vec3::ZERO))?;
//! sim.do_task(bot, Task::move_to(Vec3::new(5.0, 0.0, 0.0), 1.0), false)?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod character;
pub mod error;
pub mod observer;
pub mod sim;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use character::{Character, CharacterSpawn, Pose};
pub use error::{SimError, SimResult};
pub use observer::{AgentSample, NoopObserver, SimObserver, TickSummary};
pub use sim::Sim;
pub use snapshot::CharacterSnapshot;
