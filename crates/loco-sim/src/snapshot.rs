//! Save/restore of character state.
//!
//! A [`CharacterSnapshot`] carries the body transform and velocity, the
//! locomotion timers and crouch state, and the task queue as
//! [`TaskRecord`]s.  It round-trips through JSON with `serde_json`.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use loco_motion::LocomotionSnapshot;
use loco_task::TaskRecord;

use crate::SimResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub position:        Vec3,
    pub rotation:        Quat,
    pub linear_velocity: Vec3,
    pub locomotion:      LocomotionSnapshot,
    pub current_task:    TaskRecord,
    pub queued_tasks:    Vec<TaskRecord>,
}

impl CharacterSnapshot {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
