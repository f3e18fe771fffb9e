//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

const SNAPSHOT_HEADER: [&str; 16] = [
    "entity", "generation", "tick", "time_secs", "x", "y", "z", "vx", "vy", "vz",
    "on_ground", "ground_distance", "sleeping", "crouched", "task", "queued",
];

const SUMMARY_HEADER: [&str; 7] = ["tick", "time_secs", "characters", "grounded", "sleeping", "shots", "deleted"];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        Ok(Self { snapshots, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            let [x, y, z] = row.position;
            let [vx, vy, vz] = row.velocity;
            self.snapshots.write_record(&[
                row.entity.to_string(),
                row.generation.to_string(),
                row.tick.to_string(),
                row.time_secs.to_string(),
                x.to_string(),
                y.to_string(),
                z.to_string(),
                vx.to_string(),
                vy.to_string(),
                vz.to_string(),
                (row.on_ground as u8).to_string(),
                row.ground_distance.to_string(),
                (row.sleeping as u8).to_string(),
                (row.crouched as u8).to_string(),
                row.task.to_owned(),
                row.queued.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.time_secs.to_string(),
            row.characters.to_string(),
            row.grounded.to_string(),
            row.sleeping.to_string(),
            row.shots.to_string(),
            row.deleted.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
