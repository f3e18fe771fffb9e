//! The per-agent task state machine.
//!
//! # Queue discipline
//!
//! ```text
//!   do_task(t, enqueue = false) ──► queue cleared, t begins now
//!   do_task(t, enqueue = true)  ──► idle with empty queue: t begins now
//!                                   otherwise:            t appended
//!   current finished            ──► next queued task begins, or Idle
//! ```
//!
//! Idle never finishes; work reaches an idle machine through `do_task` or
//! `restore`.  Beginning any task clears the path follower; beginning Idle
//! also zeroes the steering.

use std::collections::VecDeque;

use glam::Vec3;

use loco_core::math::{flat_direction, flat_distance};
use loco_core::{BodyId, EntityHandle};
use loco_nav::{PathConfig, PathFollower};

use crate::attack::{fire_weapons, line_of_sight, AttackConfig, FireSolution};
use crate::context::TaskContext;
use crate::task::{MoveTarget, Task};
use crate::weapon::Weapon;
use crate::EntityView;

/// A Move task is only driven while grounded or airborne for less than this.
pub const RECENT_GROUND_SECS: f32 = 0.5;
/// Vertical tolerance for a Move task to count as arrived.
pub const ARRIVAL_Z_BAND: f32 = 1.5;

/// Movement commands produced by the current task.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Steering {
    /// Horizontal direction, length at most 1.  Persists across ticks.
    pub move_vector: Vec3,
    /// Direction to face, set only on ticks that want to turn.
    pub face:        Option<Vec3>,
}

#[derive(Clone, Debug)]
pub struct TaskMachine {
    pub attack: AttackConfig,

    follower: PathFollower,
    current:  Task,
    queue:    VecDeque<Task>,
    steering: Steering,
    /// Shots fired during the last tick.
    shots:    usize,
}

impl TaskMachine {
    pub fn new(path: PathConfig, attack: AttackConfig) -> Self {
        Self {
            attack,
            follower: PathFollower::new(path),
            current:  Task::Idle,
            queue:    VecDeque::new(),
            steering: Steering::default(),
            shots:    0,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn current(&self) -> &Task {
        &self.current
    }

    /// Pending tasks in execution order.
    pub fn queue(&self) -> &VecDeque<Task> {
        &self.queue
    }

    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    pub fn steering(&self) -> Steering {
        self.steering
    }

    /// How many weapons fired during the most recent [`tick`](Self::tick).
    pub fn shots_fired(&self) -> usize {
        self.shots
    }

    // ── Queue discipline ──────────────────────────────────────────────────

    pub fn do_task(&mut self, task: Task, enqueue: bool) {
        if !enqueue {
            self.queue.clear();
            self.begin(task);
        } else if self.queue.is_empty() && self.current.is_idle() {
            self.begin(task);
        } else {
            log::debug!("queued {} behind {}", task.kind(), self.current.kind());
            self.queue.push_back(task);
        }
    }

    /// Abandon the current task for the next queued one (or Idle).
    pub fn do_next_task(&mut self) {
        let next = self.queue.pop_front().unwrap_or_default();
        self.begin(next);
    }

    /// Replace the whole machine state, e.g. after loading a save.  An idle
    /// current task gives way to the head of the queue.
    pub fn restore(&mut self, current: Task, queue: impl IntoIterator<Item = Task>) {
        self.queue = queue.into_iter().collect();
        let first = if current.is_idle() { self.queue.pop_front().unwrap_or_default() } else { current };
        self.begin(first);
    }

    /// Drop every task that refers to `entity`.  Advances immediately if the
    /// current task is one of them.
    pub fn forget(&mut self, entity: EntityHandle) {
        self.queue.retain(|t| t.target_entity() != Some(entity));
        if self.current.target_entity() == Some(entity) {
            log::debug!("{} target {entity:?} deleted", self.current.kind());
            self.do_next_task();
        }
    }

    /// Drop every task whose target no longer resolves.  Returns how many
    /// were removed, the current task included.
    pub fn purge(&mut self, entities: &dyn EntityView) -> usize {
        let before = self.queue.len();
        self.queue.retain(|t| t.target_entity().is_none_or(|e| entities.is_alive(e)));
        let mut removed = before - self.queue.len();
        if self.current.target_entity().is_some_and(|e| !entities.is_alive(e)) {
            log::debug!("{} target no longer exists", self.current.kind());
            self.do_next_task();
            removed += 1;
        }
        removed
    }

    fn begin(&mut self, task: Task) {
        log::debug!("task {} -> {}", self.current.kind(), task.kind());
        self.follower.clear();
        if task.is_idle() {
            self.steering = Steering::default();
        }
        self.current = task;
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Run the current task for one tick, then advance the queue if it
    /// finished.  Returns the steering to hand to locomotion.
    pub fn tick(&mut self, ctx: &mut TaskContext<'_>, weapons: &mut [Box<dyn Weapon>]) -> Steering {
        self.steering.face = None;
        self.shots = 0;
        match self.current {
            Task::Idle => {}
            Task::Move { target, reach_distance } => match move_goal(target, ctx.entities) {
                Some(goal) => self.drive(ctx, goal, reach_distance),
                None => self.steering.move_vector = Vec3::ZERO,
            },
            Task::Attack { target } => self.tick_attack(ctx, target, weapons),
        }

        if self.is_finished(ctx) {
            self.do_next_task();
        }
        self.steering
    }

    /// Completion test for the current task.
    pub fn is_finished(&self, ctx: &TaskContext<'_>) -> bool {
        match self.current {
            Task::Idle => false,
            Task::Move { target, reach_distance } => move_goal(target, ctx.entities).is_some_and(|goal| {
                flat_distance(ctx.feet, goal) < reach_distance && (ctx.feet.z - goal.z).abs() < ARRIVAL_Z_BAND
            }),
            Task::Attack { target: MoveTarget::Entity(e) } => ctx.entities.is_marked(e),
            Task::Attack { target: MoveTarget::Position(_) } => false,
        }
    }

    /// Follow the path toward `goal`, steering at the next waypoint.
    fn drive(&mut self, ctx: &TaskContext<'_>, goal: Vec3, reach: f32) {
        let grounded = ctx.on_ground || ctx.since_ground_contact < RECENT_GROUND_SECS;
        if !grounded || ctx.animation_locked {
            return;
        }
        match self.follower.update(ctx.feet, goal, reach, ctx.dt, ctx.navigator) {
            Some(waypoint) => {
                self.steering.move_vector = flat_direction(ctx.feet, waypoint);
                self.steering.face = Some(waypoint - ctx.feet);
            }
            None => self.steering.move_vector = Vec3::ZERO,
        }
    }

    fn tick_attack(&mut self, ctx: &mut TaskContext<'_>, target: MoveTarget, weapons: &mut [Box<dyn Weapon>]) {
        let Some(AttackTarget { goal, aim_point, velocity, body: target_body }) = attack_target(target, ctx.entities)
        else {
            self.steering.move_vector = Vec3::ZERO;
            return;
        };
        let visible = line_of_sight(ctx.physics, ctx.eye, aim_point, ctx.body, target_body, self.attack.sight_mask);
        let distance = flat_distance(ctx.feet, goal);

        if visible && distance <= self.attack.optimal_max {
            self.steering.face = Some(aim_point - ctx.eye);
            self.steering.move_vector = if distance < self.attack.optimal_min {
                -flat_direction(ctx.feet, goal)
            } else {
                Vec3::ZERO
            };
        } else {
            // Without sight, close in past the hold band.
            let reach = if visible { self.attack.optimal_max } else { self.attack.optimal_min };
            self.drive(ctx, goal, reach);
        }

        let solution = FireSolution { aim_point, velocity, body: target_body };
        self.shots = fire_weapons(weapons, ctx.physics, ctx.eye, ctx.body, &solution, &self.attack, ctx.rng);
    }
}

/// Resolved state of what an Attack task engages this tick.
struct AttackTarget {
    /// Ground point to approach.
    goal:      Vec3,
    aim_point: Vec3,
    velocity:  Vec3,
    body:      Option<BodyId>,
}

fn attack_target(target: MoveTarget, entities: &dyn EntityView) -> Option<AttackTarget> {
    match target {
        MoveTarget::Position(p) => Some(AttackTarget { goal: p, aim_point: p, velocity: Vec3::ZERO, body: None }),
        MoveTarget::Entity(e) => Some(AttackTarget {
            goal:      entities.ground_position(e)?,
            aim_point: entities.aim_point(e)?,
            velocity:  entities.velocity(e).unwrap_or_default(),
            body:      entities.body(e),
        }),
    }
}

fn move_goal(target: MoveTarget, entities: &dyn EntityView) -> Option<Vec3> {
    match target {
        MoveTarget::Position(p) => Some(p),
        MoveTarget::Entity(e) => entities.ground_position(e),
    }
}
