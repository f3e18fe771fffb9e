//! `loco-core`: foundational types for the `loco` character framework.
//!
//! This crate is a dependency of every other `loco-*` crate.  It intentionally
//! has no `loco-*` dependencies and minimal external ones (`glam`, `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `BodyId`, `NodeId`, `EdgeId`, `EntityHandle`          |
//! | [`math`]        | world-up axis, planar distances, slope angles         |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `AgentRng` (per-agent, seeded from the handle)        |
//! | [`error`]       | `LocoError`, `LocoResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `loco-sim` snapshots.                          |

pub mod error;
pub mod ids;
pub mod math;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{LocoError, LocoResult};
pub use ids::{BodyId, EdgeId, EntityHandle, NodeId};
pub use rng::AgentRng;
pub use time::{SimClock, SimConfig, Tick};
