//! Per-agent and per-run metrics.
//!
//! [`AgentReport`] is filled in by the round loop as it runs; the runner
//! collects one per agent into a [`SimulationReport`]. All durations are
//! in microseconds.

use grove_core::{Role, RoundSnapshot};

/// Timing and progress for one agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentReport {
    /// The agent's role.
    pub role: Role,
    /// Rounds completed (all three barriers passed).
    pub rounds: u64,
    /// Total time spent inside `arrive_and_wait()`, in microseconds.
    pub barrier_wait_us: u64,
    /// Total time spent in the compute phase, in microseconds.
    pub compute_us: u64,
}

impl AgentReport {
    /// An empty report for `role`.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            rounds: 0,
            barrier_wait_us: 0,
            compute_us: 0,
        }
    }
}

/// Outcome of a completed run.
#[derive(Clone, Debug)]
pub struct SimulationReport {
    /// Rounds executed. Every agent completed exactly this many.
    pub rounds: u64,
    /// One report per agent, in start order.
    pub agents: Vec<AgentReport>,
    /// World state after the last round.
    pub final_snapshot: RoundSnapshot,
    /// Wall-clock time from spawning the first agent to joining the last,
    /// in microseconds.
    pub elapsed_us: u64,
}

impl SimulationReport {
    /// The report for `role`, if such an agent ran.
    pub fn agent(&self, role: Role) -> Option<&AgentReport> {
        self.agents.iter().find(|a| a.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_report_is_zeroed() {
        let r = AgentReport::new(Role::Prey);
        assert_eq!(r.role, Role::Prey);
        assert_eq!(r.rounds, 0);
        assert_eq!(r.barrier_wait_us, 0);
        assert_eq!(r.compute_us, 0);
    }
}
