//! `loco-motion`: physically grounded character locomotion.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`config`]     | `CapsuleShape`, `CharacterConfig`, damping, backend quirks  |
//! | [`sweep`]      | `Sweep`: stepped capsule overlap search with refinement    |
//! | [`probe`]      | `probe_ground`, `GroundContact`: sweep + ray fan           |
//! | [`climb`]      | `climb_height`: step-up resolver                           |
//! | [`timers`]     | `LocomotionTimers` and the jump/crouch/grace constants      |
//! | [`controller`] | `LocomotionController`: the per-tick integrator            |
//! | [`error`]      | `MotionError`, `MotionResult`                               |
//!
//! # Geometry
//!
//! World-up is +Z.  A character position sits `position_to_floor` above its
//! feet.  Probe and resolver queries use the full-height capsule; the
//! physics collider floats `walk_up_height` above the feet, so low ledges are
//! handled by the climb resolver rather than by collision.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Configuration, timers and snapshots become (de)serialisable. |

pub mod climb;
pub mod config;
pub mod controller;
pub mod error;
pub mod probe;
pub mod sweep;
pub mod timers;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use climb::climb_height;
pub use config::{BackendQuirks, CapsuleShape, CharacterConfig, DampingConfig};
pub use controller::{LocomotionController, LocomotionSnapshot};
pub use error::{MotionError, MotionResult};
pub use probe::{probe_ground, GroundContact, AIRBORNE_DISTANCE};
pub use sweep::{Sweep, SweepResult};
pub use timers::LocomotionTimers;
