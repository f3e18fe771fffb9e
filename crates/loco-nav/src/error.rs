//! Navigation error type.

use glam::Vec3;
use thiserror::Error;

use loco_core::NodeId;

/// Errors produced by `loco-nav`.
///
/// The path follower treats every variant as an ordinary failed request and
/// backs off; none of them abort the simulation.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("no waypoint node within pick extents of {0}")]
    NoNodeNear(Vec3),

    #[error("search exceeded {0} expanded nodes")]
    SearchLimit(usize),

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),
}

pub type NavResult<T> = Result<T, NavError>;
