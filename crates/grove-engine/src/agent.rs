//! The [`RoundAgent`] trait and the generic round loop.
//!
//! Every role runs the same loop; only the three phase hooks differ.
//!
//! ```text
//! loop {
//!     snapshot = world.snapshot()          // top of round
//!     if snapshot.clock >= end: break      // same value for every agent
//!     agent.compute(&snapshot)             // compute phase
//!     barrier                              // compute-done
//!     agent.commit()                       // commit phase
//!     barrier                              // assign-done
//!     agent.observe(round, &committed)     // observe phase
//!     barrier                              // print-done
//! }
//! ```
//!
//! The clock and weather are only written in the clock agent's observe
//! phase, before it reaches print-done. Nobody can leave print-done
//! until the clock agent arrives there, so the next round's compute
//! phase always sees the advanced clock, and every agent evaluates the
//! termination check against the same value.

use std::time::Instant;

use grove_core::{BarrierError, CommittedPopulations, Role, RoundId, RoundSnapshot};
use grove_sync::{PoisonOnUnwind, RoundBarrier};

use crate::metrics::AgentReport;
use crate::world::World;

/// One participant in the round protocol.
///
/// Implementations hold the writer handle for the entity they own and
/// stash their proposed value between [`compute`](RoundAgent::compute)
/// and [`commit`](RoundAgent::commit).
pub trait RoundAgent: Send {
    /// The role this agent plays.
    fn role(&self) -> Role;

    /// Compute phase: derive the next value from `snapshot`.
    ///
    /// Must not write to the world.
    fn compute(&mut self, snapshot: &RoundSnapshot);

    /// Commit phase: write the value proposed by the last `compute`.
    fn commit(&mut self);

    /// Observe phase: inspect this round's committed values.
    ///
    /// The clock agent also advances the calendar and weather here.
    fn observe(&mut self, round: RoundId, committed: &CommittedPopulations) {
        let _ = (round, committed);
    }

    /// Called once after the final round, before the thread exits.
    fn finish(&mut self) {}
}

fn timed_wait(
    barrier: &dyn RoundBarrier,
    report: &mut AgentReport,
) -> Result<(), BarrierError> {
    let start = Instant::now();
    let result = barrier.arrive_and_wait();
    report.barrier_wait_us += start.elapsed().as_micros() as u64;
    result.map(|_| ())
}

/// Run `agent` through rounds until the clock reaches `end_year`.
///
/// If the agent panics, the barrier is poisoned so the other agents
/// stop waiting for it.
///
/// # Errors
///
/// Returns [`BarrierError::Poisoned`] if another participant failed.
pub fn run_rounds(
    agent: &mut dyn RoundAgent,
    world: &World,
    barrier: &dyn RoundBarrier,
    end_year: i32,
) -> Result<AgentReport, BarrierError> {
    let _guard = PoisonOnUnwind::new(barrier);
    let role = agent.role();
    let mut report = AgentReport::new(role);
    let mut round = RoundId(0);

    loop {
        let snapshot = world.snapshot();
        if snapshot.clock.reached(end_year) {
            break;
        }

        let start = Instant::now();
        agent.compute(&snapshot);
        report.compute_us += start.elapsed().as_micros() as u64;
        timed_wait(barrier, &mut report)?;

        agent.commit();
        timed_wait(barrier, &mut report)?;

        let committed = world.committed();
        agent.observe(round, &committed);
        timed_wait(barrier, &mut report)?;

        tracing::trace!(%role, round = round.0, clock = %snapshot.clock, "round done");
        report.rounds += 1;
        round = round.next();
    }

    agent.finish();
    tracing::debug!(%role, rounds = report.rounds, "agent finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{PopulationState, SimulationClock, VegetationState, WeatherSample};
    use grove_sync::BarrierKind;

    use crate::world::ClockWriter;

    /// Advances the clock by one month per round, nothing else.
    struct Ticker {
        writer: ClockWriter,
        observed: Vec<RoundId>,
    }

    impl RoundAgent for Ticker {
        fn role(&self) -> Role {
            Role::Clock
        }
        fn compute(&mut self, _snapshot: &RoundSnapshot) {}
        fn commit(&mut self) {}
        fn observe(&mut self, round: RoundId, _committed: &CommittedPopulations) {
            self.observed.push(round);
            let next = self.writer.world().clock().advance();
            self.writer.set_clock(next);
        }
    }

    fn initial(month: u32) -> RoundSnapshot {
        RoundSnapshot {
            clock: SimulationClock::new(2024, month).unwrap(),
            weather: WeatherSample::new(1.0, 1.0),
            vegetation: VegetationState::new(1.0),
            prey: PopulationState::new(1),
            predator: PopulationState::new(1),
        }
    }

    #[test]
    fn single_agent_runs_until_end_year() {
        let (world, writers) = World::new(initial(9));
        let barrier = BarrierKind::Blocking.build(1).unwrap();
        let mut ticker = Ticker {
            writer: writers.clock,
            observed: Vec::new(),
        };
        let report = run_rounds(&mut ticker, &world, &*barrier, 2025).unwrap();
        assert_eq!(report.rounds, 3);
        assert_eq!(ticker.observed, vec![RoundId(0), RoundId(1), RoundId(2)]);
        assert_eq!(world.clock(), SimulationClock::january(2025));
    }

    #[test]
    fn already_finished_runs_zero_rounds() {
        let (world, writers) = World::new(initial(0));
        let barrier = BarrierKind::Spin.build(1).unwrap();
        let mut ticker = Ticker {
            writer: writers.clock,
            observed: Vec::new(),
        };
        let report = run_rounds(&mut ticker, &world, &*barrier, 2024).unwrap();
        assert_eq!(report.rounds, 0);
        assert!(ticker.observed.is_empty());
    }

    #[test]
    fn poisoned_barrier_stops_the_loop() {
        let (world, writers) = World::new(initial(0));
        let barrier = BarrierKind::Blocking.build(2).unwrap();
        barrier.poison();
        let mut ticker = Ticker {
            writer: writers.clock,
            observed: Vec::new(),
        };
        match run_rounds(&mut ticker, &world, &*barrier, 2030) {
            Err(BarrierError::Poisoned { .. }) => {}
            other => panic!("expected Poisoned, got {other:?}"),
        }
    }
}
