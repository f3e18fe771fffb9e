//! Deterministic per-agent RNG.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (slot_index * MIXING_CONSTANT) XOR generation
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive slot indices uniformly across the seed space.
//! Folding in the generation means an entity that reuses a freed slot does not
//! replay the previous occupant's random stream.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::EntityHandle;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Owned by the agent's character record; used for weapon aim spread and any
/// other per-agent stochastic choice so runs stay reproducible.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an entity handle.
    pub fn new(global_seed: u64, entity: EntityHandle) -> Self {
        let seed = global_seed
            ^ (entity.index as u64).wrapping_mul(MIXING_CONSTANT)
            ^ entity.generation as u64;
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
