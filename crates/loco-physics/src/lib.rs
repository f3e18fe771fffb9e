//! `loco-physics`: the physics collaborator seen by the locomotion layer.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`query`]    | `Capsule`, `Bounds`, `Volume`, `Ray`, `RayHit`, `ContactMask`, `Capability` |
//! | [`body`]     | `BodyKind`, `Shape`, `BodyDesc`, `BodyState`                  |
//! | [`world`]    | `PhysicsWorld` trait                                          |
//! | [`simple`]   | `SimpleWorld` reference backend (rstar broadphase)            |
//! | [`error`]    | `PhysicsError`, `PhysicsResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on shapes and query types. |

pub mod body;
pub mod error;
mod geometry;
pub mod query;
pub mod simple;
pub mod world;

#[cfg(test)]
mod tests;

pub use body::{BodyDesc, BodyKind, BodyState, Shape};
pub use error::{PhysicsError, PhysicsResult};
pub use query::{Bounds, Capability, Capsule, ContactMask, Ray, RayHit, Volume};
pub use simple::{DEFAULT_GRAVITY, SimpleWorld};
pub use world::PhysicsWorld;
