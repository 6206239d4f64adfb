use serde::{Deserialize, Serialize};

/// Counters collected by one run of the contagion pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContagionStats {
    /// Agents inserted into the spatial hash.
    pub agents: usize,
    /// Pairs that passed the radius test.
    pub candidates: usize,
    /// Pairs whose random roll succeeded.
    pub rolls_won: usize,
    /// Proposals applied after per-target reduction.
    pub applied: usize,
    /// Agents forced back to neutral by decay.
    pub reset_to_neutral: usize,
}

impl ContagionStats {
    pub fn merge(&mut self, other: &ContagionStats) {
        self.agents += other.agents;
        self.candidates += other.candidates;
        self.rolls_won += other.rolls_won;
        self.applied += other.applied;
        self.reset_to_neutral += other.reset_to_neutral;
    }
}
