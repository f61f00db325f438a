//! The four standard agents.
//!
//! Vegetation, prey and predator each own one entity: they compute a
//! proposal from the snapshot and write it during commit. The clock
//! agent proposes nothing; it does all of its work in the observe phase.

use std::sync::Arc;

use grove_core::{
    CommittedPopulations, PopulationState, Role, RoundId, RoundSnapshot, VegetationState,
};

use crate::agent::RoundAgent;
use crate::rules::EcologyRules;
use crate::telemetry::{TelemetryRow, TelemetrySink};
use crate::weather::WeatherModel;
use crate::world::{ClockWriter, PredatorWriter, PreyWriter, VegetationWriter, WorldWriters};

/// Everything needed to build the agents of one run.
///
/// Produced by [`Ecosystem`](crate::Ecosystem) after the world has been
/// created; the weather model has already drawn the first month.
pub struct AgentParts {
    /// One writer per entity.
    pub writers: WorldWriters,
    /// Update rules shared by the population agents.
    pub rules: Arc<dyn EcologyRules>,
    /// Weather generator for the clock agent.
    pub weather: WeatherModel,
}

/// Build the standard four agents, sending telemetry to `sink`.
pub fn standard_agents(parts: AgentParts, sink: Box<dyn TelemetrySink>) -> Vec<Box<dyn RoundAgent>> {
    let AgentParts {
        writers,
        rules,
        weather,
    } = parts;
    vec![
        Box::new(VegetationAgent::new(writers.vegetation, Arc::clone(&rules))),
        Box::new(PreyAgent::new(writers.prey, Arc::clone(&rules))),
        Box::new(PredatorAgent::new(writers.predator, rules)),
        Box::new(ClockAgent::new(writers.clock, weather, sink)),
    ]
}

// ── VegetationAgent ───────────────────────────────────────────────

/// Owns the grain height.
pub struct VegetationAgent {
    writer: VegetationWriter,
    rules: Arc<dyn EcologyRules>,
    pending: Option<VegetationState>,
}

impl VegetationAgent {
    /// Create the agent.
    pub fn new(writer: VegetationWriter, rules: Arc<dyn EcologyRules>) -> Self {
        Self {
            writer,
            rules,
            pending: None,
        }
    }
}

impl RoundAgent for VegetationAgent {
    fn role(&self) -> Role {
        Role::Vegetation
    }

    fn compute(&mut self, snapshot: &RoundSnapshot) {
        self.pending = Some(self.rules.next_vegetation(snapshot));
    }

    fn commit(&mut self) {
        if let Some(next) = self.pending.take() {
            self.writer.set(next);
        }
    }
}

// ── PreyAgent ─────────────────────────────────────────────────────

/// Owns the prey (deer) population.
pub struct PreyAgent {
    writer: PreyWriter,
    rules: Arc<dyn EcologyRules>,
    pending: Option<PopulationState>,
}

impl PreyAgent {
    /// Create the agent.
    pub fn new(writer: PreyWriter, rules: Arc<dyn EcologyRules>) -> Self {
        Self {
            writer,
            rules,
            pending: None,
        }
    }
}

impl RoundAgent for PreyAgent {
    fn role(&self) -> Role {
        Role::Prey
    }

    fn compute(&mut self, snapshot: &RoundSnapshot) {
        self.pending = Some(self.rules.next_prey(snapshot));
    }

    fn commit(&mut self) {
        if let Some(next) = self.pending.take() {
            self.writer.set(next);
        }
    }
}

// ── PredatorAgent ─────────────────────────────────────────────────

/// Owns the predator (bear) population.
pub struct PredatorAgent {
    writer: PredatorWriter,
    rules: Arc<dyn EcologyRules>,
    pending: Option<PopulationState>,
}

impl PredatorAgent {
    /// Create the agent.
    pub fn new(writer: PredatorWriter, rules: Arc<dyn EcologyRules>) -> Self {
        Self {
            writer,
            rules,
            pending: None,
        }
    }
}

impl RoundAgent for PredatorAgent {
    fn role(&self) -> Role {
        Role::Predator
    }

    fn compute(&mut self, snapshot: &RoundSnapshot) {
        self.pending = Some(self.rules.next_predator(snapshot));
    }

    fn commit(&mut self) {
        if let Some(next) = self.pending.take() {
            self.writer.set(next);
        }
    }
}

// ── ClockAgent ────────────────────────────────────────────────────

/// Owns the calendar and the weather, and reports each round.
///
/// Observe phase, in order: read the committed snapshot, record the
/// telemetry row, advance the month, draw the new month's weather,
/// reseed the weather RNG.
pub struct ClockAgent {
    writer: ClockWriter,
    weather: WeatherModel,
    sink: Box<dyn TelemetrySink>,
}

impl ClockAgent {
    /// Create the agent.
    pub fn new(writer: ClockWriter, weather: WeatherModel, sink: Box<dyn TelemetrySink>) -> Self {
        Self {
            writer,
            weather,
            sink,
        }
    }
}

impl RoundAgent for ClockAgent {
    fn role(&self) -> Role {
        Role::Clock
    }

    fn compute(&mut self, _snapshot: &RoundSnapshot) {}

    fn commit(&mut self) {}

    fn observe(&mut self, round: RoundId, _committed: &CommittedPopulations) {
        // Sole writer of clock and weather, and every commit is done.
        let snapshot = self.writer.world().snapshot();
        self.sink.record(&TelemetryRow::new(round, &snapshot));

        let next = snapshot.clock.advance();
        self.writer.set_clock(next);
        let weather = self.weather.sample(next.month());
        self.writer.set_weather(weather);
        self.weather.reseed();
    }

    fn finish(&mut self) {
        self.sink.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{SimulationClock, WeatherSample};

    use crate::config::WeatherParams;
    use crate::rules::StandardRules;
    use crate::telemetry::ChannelSink;
    use crate::weather::ReseedPolicy;
    use crate::world::World;

    fn parts() -> (Arc<crate::world::World>, AgentParts) {
        let initial = RoundSnapshot {
            clock: SimulationClock::new(2024, 11).unwrap(),
            weather: WeatherSample::new(10.0, 40.0),
            vegetation: VegetationState::new(5.0),
            prey: PopulationState::new(2),
            predator: PopulationState::new(1),
        };
        let (world, writers) = World::new(initial);
        let parts = AgentParts {
            writers,
            rules: Arc::new(StandardRules::default()),
            weather: WeatherModel::new(WeatherParams::default().noiseless(), 0, ReseedPolicy::Never),
        };
        (world, parts)
    }

    #[test]
    fn standard_agents_cover_every_role_once() {
        let (_world, parts) = parts();
        let (sink, _rx) = ChannelSink::unbounded();
        let agents = standard_agents(parts, Box::new(sink));
        let roles: Vec<Role> = agents.iter().map(|a| a.role()).collect();
        assert_eq!(roles, Role::ALL);
    }

    #[test]
    fn population_agents_write_only_on_commit() {
        let (world, parts) = parts();
        let (sink, _rx) = ChannelSink::unbounded();
        let mut agents = standard_agents(parts, Box::new(sink));
        let snapshot = world.snapshot();

        for agent in agents.iter_mut().take(3) {
            agent.compute(&snapshot);
        }
        assert_eq!(world.snapshot(), snapshot, "compute must not write");

        for agent in agents.iter_mut().take(3) {
            agent.commit();
        }
        let after = world.snapshot();
        assert_eq!(after.vegetation.height(), 14.0);
        assert_eq!(after.prey.count(), 1);
        assert_eq!(after.predator.count(), 2);
        assert_eq!(after.clock, snapshot.clock);
    }

    #[test]
    fn clock_observe_reports_then_advances() {
        let (world, parts) = parts();
        let (sink, rx) = ChannelSink::unbounded();
        let mut agents = standard_agents(parts, Box::new(sink));
        let clock = agents.last_mut().unwrap();

        clock.observe(RoundId(0), &world.committed());
        let row = rx.try_recv().unwrap();
        assert_eq!(row.clock, SimulationClock::new(2024, 11).unwrap());
        assert_eq!(row.temperature, 40.0);

        let s = world.snapshot();
        assert_eq!(s.clock, SimulationClock::january(2025));
        let (p, t) = WeatherModel::seasonal(&WeatherParams::default(), 0);
        assert_eq!(s.weather.temperature(), t);
        assert_eq!(s.weather.precipitation(), p);
    }
}
