//! `loco-task`: task-driven agent behaviour.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`task`]     | `Task` (Idle / Move / Attack), `MoveTarget`, `TaskKind`        |
//! | [`machine`]  | `TaskMachine`: current task + FIFO queue, `Steering` output   |
//! | [`attack`]   | line of sight, fire-control prediction, `AttackConfig`         |
//! | [`weapon`]   | `Weapon` trait, `FireMode`, `SimpleWeapon`                     |
//! | [`context`]  | `TaskContext<'a>` per-tick inputs, `EntityView` trait          |
//! | [`registry`] | `TaskRecord`, `TaskRegistry`: tag → constructor for loading   |
//! | [`error`]    | `TaskError`, `TaskResult<T>`                                   |
//!
//! # Per-tick flow
//!
//! The simulation builds a [`TaskContext`] for each agent, calls
//! [`TaskMachine::tick`] and hands the returned [`Steering`] to the
//! locomotion controller.  Tasks never touch physics bodies directly; they
//! only read through the context and fire weapons.

pub mod attack;
pub mod context;
pub mod error;
pub mod machine;
pub mod registry;
pub mod task;
pub mod weapon;


pub use attack::{fire_weapons, line_of_sight, predict_aim, AttackConfig, FireSolution};
pub use context::{EntityView, TaskContext};
pub use error::{TaskError, TaskResult};
pub use machine::{Steering, TaskMachine};
pub use registry::{TaskRecord, TaskRegistry};
pub use task::{MoveTarget, Task, TaskKind, DEFAULT_REACH};
pub use weapon::{FireMode, FireModeSpec, FireRange, Shot, SimpleWeapon, Weapon};
