//! Probe agents that detect phase-ordering violations.
//!
//! Each population probe commits `k + 1` to its entity in round `k`, so
//! a correct run has every entity equal to `k` during round `k`'s compute
//! phase and equal to `k + 1` during its observe phase. The clock probe
//! advances the calendar by one month per round. Any other value means
//! a read overlapped a write, and is recorded in the shared [`ProbeLog`].
//!
//! Probes sleep a random few microseconds before each phase so that
//! threads reach the barrier in varying orders.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use grove_core::{
    CommittedPopulations, PopulationState, Role, RoundId, RoundSnapshot, SimulationClock,
    VegetationState,
};
use grove_engine::{AgentParts, ClockWriter, PredatorWriter, PreyWriter, RoundAgent, VegetationWriter};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Shared list of violation messages.
#[derive(Clone, Debug, Default)]
pub struct ProbeLog(Arc<Mutex<Vec<String>>>);

impl ProbeLog {
    pub fn record(&self, message: String) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    pub fn violations(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// The writer a probe owns.
pub enum ProbeWriter {
    Vegetation(VegetationWriter),
    Prey(PreyWriter),
    Predator(PredatorWriter),
    Clock(ClockWriter),
}

impl ProbeWriter {
    fn role(&self) -> Role {
        match self {
            Self::Vegetation(_) => Role::Vegetation,
            Self::Prey(_) => Role::Prey,
            Self::Predator(_) => Role::Predator,
            Self::Clock(_) => Role::Clock,
        }
    }
}

pub struct ProbeAgent {
    writer: ProbeWriter,
    round: u32,
    expected_clock: SimulationClock,
    max_jitter_us: u64,
    rng: ChaCha8Rng,
    log: ProbeLog,
}

impl ProbeAgent {
    pub fn new(
        writer: ProbeWriter,
        start: SimulationClock,
        seed: u64,
        max_jitter_us: u64,
        log: ProbeLog,
    ) -> Self {
        Self {
            writer,
            round: 0,
            expected_clock: start,
            max_jitter_us,
            rng: ChaCha8Rng::seed_from_u64(seed),
            log,
        }
    }

    fn jitter(&mut self) {
        if self.max_jitter_us > 0 {
            let us = self.rng.random_range(0..=self.max_jitter_us);
            thread::sleep(Duration::from_micros(us));
        }
    }

    fn expect_populations(
        &self,
        phase: &str,
        vegetation: VegetationState,
        prey: PopulationState,
        predator: PopulationState,
        want: u32,
    ) {
        let role = self.writer.role();
        let round = self.round;
        if vegetation.height() != want as f32 {
            self.log.record(format!(
                "{role} round {round} {phase}: vegetation {} != {want}",
                vegetation.height()
            ));
        }
        if prey.count() != want {
            self.log.record(format!(
                "{role} round {round} {phase}: prey {} != {want}",
                prey.count()
            ));
        }
        if predator.count() != want {
            self.log.record(format!(
                "{role} round {round} {phase}: predator {} != {want}",
                predator.count()
            ));
        }
    }
}

impl RoundAgent for ProbeAgent {
    fn role(&self) -> Role {
        self.writer.role()
    }

    fn compute(&mut self, snapshot: &RoundSnapshot) {
        self.jitter();
        self.expect_populations(
            "compute",
            snapshot.vegetation,
            snapshot.prey,
            snapshot.predator,
            self.round,
        );
        if snapshot.clock != self.expected_clock {
            self.log.record(format!(
                "{} round {} compute: clock {} != {}",
                self.writer.role(),
                self.round,
                snapshot.clock,
                self.expected_clock
            ));
        }
    }

    fn commit(&mut self) {
        self.jitter();
        let value = self.round + 1;
        match &mut self.writer {
            ProbeWriter::Vegetation(w) => w.set(VegetationState::new(value as f32)),
            ProbeWriter::Prey(w) => w.set(PopulationState::new(value)),
            ProbeWriter::Predator(w) => w.set(PopulationState::new(value)),
            ProbeWriter::Clock(_) => {}
        }
    }

    fn observe(&mut self, round: RoundId, committed: &CommittedPopulations) {
        self.jitter();
        if round.0 != u64::from(self.round) {
            self.log.record(format!(
                "{} observe: round id {round} != {}",
                self.writer.role(),
                self.round
            ));
        }
        self.expect_populations(
            "observe",
            committed.vegetation,
            committed.prey,
            committed.predator,
            self.round + 1,
        );
        if let ProbeWriter::Clock(w) = &mut self.writer {
            let next = w.world().clock().advance();
            w.set_clock(next);
        }
        self.round += 1;
        self.expected_clock = self.expected_clock.advance();
    }
}

/// One probe per role, in [`Role::ALL`] order, sharing one log.
///
/// Use with [`probe_config`](crate::probe_config) so populations start
/// at zero.
pub fn probe_agents(
    parts: AgentParts,
    seed: u64,
    max_jitter_us: u64,
) -> (Vec<Box<dyn RoundAgent>>, ProbeLog) {
    let log = ProbeLog::default();
    let writers = parts.writers;
    let start = writers.clock.world().clock();
    let probes = [
        ProbeWriter::Vegetation(writers.vegetation),
        ProbeWriter::Prey(writers.prey),
        ProbeWriter::Predator(writers.predator),
        ProbeWriter::Clock(writers.clock),
    ];
    let agents = probes
        .into_iter()
        .zip(0u64..)
        .map(|(writer, i)| {
            Box::new(ProbeAgent::new(
                writer,
                start,
                seed ^ i,
                max_jitter_us,
                log.clone(),
            )) as Box<dyn RoundAgent>
        })
        .collect();
    (agents, log)
}
