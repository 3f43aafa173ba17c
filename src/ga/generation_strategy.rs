//! Generation history retention.

use super::chromosome::Chromosome;
use super::population::Generation;
use std::collections::VecDeque;

/// Policy deciding how many ended generations a population keeps.
///
/// Consulted by [`Population`](super::Population) each time a generation
/// ends. Keeping history costs memory proportional to
/// `retained generations × population size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GenerationStrategy {
    /// Keep only the last `n` generations (at least one).
    Performance(usize),

    /// Keep every generation. Memory grows without bound.
    Tracking,
}

impl Default for GenerationStrategy {
    fn default() -> Self {
        GenerationStrategy::Performance(10)
    }
}

impl GenerationStrategy {
    /// Prunes `history` after a new generation was pushed to its back.
    pub fn register_new_generation<C: Chromosome>(&self, history: &mut VecDeque<Generation<C>>) {
        if let GenerationStrategy::Performance(n) = *self {
            let keep = n.max(1);
            while history.len() > keep {
                history.pop_front();
            }
        }
    }

    /// Name under which this strategy is registered.
    pub fn name(&self) -> &'static str {
        match self {
            GenerationStrategy::Performance(_) => "Performance",
            GenerationStrategy::Tracking => "Tracking",
        }
    }
}
