//! Simulation observer trait for progress reporting and data collection.

use glam::Vec3;

use loco_core::{EntityHandle, Tick};
use loco_task::TaskKind;

/// One character's state at the end of a tick, as handed to observers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentSample {
    pub entity:          EntityHandle,
    pub position:        Vec3,
    pub velocity:        Vec3,
    pub on_ground:       bool,
    pub ground_distance: f32,
    pub sleeping:        bool,
    pub crouched:        bool,
    pub task:            TaskKind,
    pub queued:          usize,
}

/// Aggregate counts for one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub characters: usize,
    pub grounded:   usize,
    pub sleeping:   usize,
    /// Weapon shots fired during the tick.
    pub shots:      usize,
    /// Entities flushed at the end of the tick.
    pub deleted:    usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} of {} grounded", summary.grounded, summary.characters);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick, after deletions are flushed.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with every live character in ascending slot order.
    fn on_snapshot(&mut self, _tick: Tick, _agents: &[AgentSample]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
