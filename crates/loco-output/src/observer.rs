//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use loco_core::{SimConfig, Tick};
use loco_sim::{AgentSample, SimObserver, TickSummary};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes character samples and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:             W,
    tick_duration_secs: f64,
    last_error:         Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` to convert
    /// ticks to simulated seconds.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            tick_duration_secs: f64::from(config.tick_duration_secs),
            last_error:         None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn time_secs(&self, tick: Tick) -> f64 {
        tick.0 as f64 * self.tick_duration_secs
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            log::warn!("output write failed: {e}");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick:       tick.0,
            time_secs:  self.time_secs(tick),
            characters: summary.characters as u32,
            grounded:   summary.grounded as u32,
            sleeping:   summary.sleeping as u32,
            shots:      summary.shots as u32,
            deleted:    summary.deleted as u32,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[AgentSample]) {
        let time_secs = self.time_secs(tick);
        let rows: Vec<AgentSnapshotRow> = agents
            .iter()
            .map(|a| AgentSnapshotRow {
                entity: a.entity.index,
                generation: a.entity.generation,
                tick: tick.0,
                time_secs,
                position: a.position.to_array(),
                velocity: a.velocity.to_array(),
                on_ground: a.on_ground,
                ground_distance: a.ground_distance,
                sleeping: a.sleeping,
                crouched: a.crouched,
                task: a.task.tag(),
                queued: a.queued as u32,
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
