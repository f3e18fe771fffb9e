//! Plain data row types written by output backends.

/// One character's state at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub entity:          u32,
    pub generation:      u32,
    pub tick:            u64,
    pub time_secs:       f64,
    /// Body position (capsule center, not feet).
    pub position:        [f32; 3],
    pub velocity:        [f32; 3],
    pub on_ground:       bool,
    /// Position-to-ground distance; `inf` when nothing was probed.
    pub ground_distance: f32,
    pub sleeping:        bool,
    pub crouched:        bool,
    /// Task kind tag (`idle`, `move`, `attack`).
    pub task:            &'static str,
    pub queued:          u32,
}

/// Summary counts for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:       u64,
    pub time_secs:  f64,
    pub characters: u32,
    pub grounded:   u32,
    pub sleeping:   u32,
    pub shots:      u32,
    pub deleted:    u32,
}
