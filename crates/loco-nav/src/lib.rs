//! `loco-nav`: navigation contract and per-agent path following.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`request`]  | `PathRequest`, the `Navigator` trait, polyline resampling   |
//! | [`graph`]    | `WaypointGraph` (CSR + R-tree) and its Dijkstra navigator   |
//! | [`follower`] | `PathFollower`: replan throttling, deviation, advancement   |
//! | [`error`]    | `NavError`, `NavResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `PathConfig` and `PathState` become (de)serialisable.      |

pub mod error;
pub mod follower;
pub mod graph;
pub mod request;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{NavError, NavResult};
pub use follower::{FollowerStats, PathConfig, PathFollower, PathState};
pub use graph::{WaypointGraph, WaypointGraphBuilder};
pub use request::{resample, Navigator, PathRequest};
