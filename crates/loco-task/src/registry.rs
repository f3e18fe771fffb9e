//! Persistence of tasks through kind tags.
//!
//! A [`TaskRecord`] is the flat, serialisable form of a [`Task`].  Loading
//! maps the record's tag back to a constructor registered in a
//! [`TaskRegistry`]; an unknown tag is corrupt data and fails the load.

use std::collections::HashMap;

use glam::Vec3;

use loco_core::EntityHandle;

use crate::task::{MoveTarget, Task, TaskKind};
use crate::{TaskError, TaskResult};

/// Flat persisted form of a task.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskRecord {
    pub kind:           String,
    pub position:       Option<Vec3>,
    pub target:         Option<EntityHandle>,
    pub reach_distance: Option<f32>,
}

impl TaskRecord {
    pub fn of(task: &Task) -> Self {
        let mut record = TaskRecord {
            kind:           task.kind().tag().to_owned(),
            position:       None,
            target:         None,
            reach_distance: None,
        };
        match *task {
            Task::Idle => {}
            Task::Move { target, reach_distance } => {
                record.set_target(target);
                record.reach_distance = Some(reach_distance);
            }
            Task::Attack { target } => record.set_target(target),
        }
        record
    }

    fn set_target(&mut self, target: MoveTarget) {
        match target {
            MoveTarget::Position(p) => self.position = Some(p),
            MoveTarget::Entity(e) => self.target = Some(e),
        }
    }

    /// The entity if one was saved, else the position.
    fn restore_target(&self) -> TaskResult<MoveTarget> {
        match (self.position, self.target) {
            (_, Some(e)) => Ok(MoveTarget::Entity(e)),
            (Some(p), None) => Ok(MoveTarget::Position(p)),
            (None, None) => Err(self.missing("position or target")),
        }
    }

    fn missing(&self, field: &'static str) -> TaskError {
        TaskError::MissingField { kind: self.kind.clone(), field }
    }
}

pub type TaskConstructor = fn(&TaskRecord) -> TaskResult<Task>;

/// Tag → constructor table.
pub struct TaskRegistry {
    constructors: HashMap<&'static str, TaskConstructor>,
}

impl TaskRegistry {
    /// A registry with no kinds at all.
    pub fn empty() -> Self {
        Self { constructors: HashMap::new() }
    }

    /// A registry knowing `idle`, `move` and `attack`.
    pub fn builtin() -> Self {
        let mut r = Self::empty();
        r.register(TaskKind::Idle.tag(), |_| Ok(Task::Idle));
        r.register(TaskKind::Move.tag(), restore_move);
        r.register(TaskKind::Attack.tag(), |rec| Ok(Task::Attack { target: rec.restore_target()? }));
        r
    }

    /// Register (or replace) the constructor for `tag`.
    pub fn register(&mut self, tag: &'static str, constructor: TaskConstructor) {
        self.constructors.insert(tag, constructor);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    pub fn restore(&self, record: &TaskRecord) -> TaskResult<Task> {
        let constructor = self
            .constructors
            .get(record.kind.as_str())
            .ok_or_else(|| TaskError::UnknownKind(record.kind.clone()))?;
        constructor(record)
    }

    /// Restore a whole list, failing on the first bad record.
    pub fn restore_all(&self, records: &[TaskRecord]) -> TaskResult<Vec<Task>> {
        records.iter().map(|r| self.restore(r)).collect()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn restore_move(record: &TaskRecord) -> TaskResult<Task> {
    let reach_distance = record.reach_distance.ok_or_else(|| record.missing("reach_distance"))?;
    Ok(Task::Move { target: record.restore_target()?, reach_distance })
}
