//! The [`Ecosystem`] runner: builds the world, spawns one thread per
//! agent, and joins them.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use grove_core::{BarrierError, PopulationState, Role, RoundSnapshot, VegetationState};
use grove_sync::RoundBarrier;

use crate::agent::{run_rounds, RoundAgent};
use crate::config::{ConfigError, SimConfig};
use crate::metrics::{AgentReport, SimulationReport};
use crate::roles::{standard_agents, AgentParts};
use crate::rules::StandardRules;
use crate::telemetry::TelemetrySink;
use crate::weather::WeatherModel;
use crate::world::World;

// ── RunError ──────────────────────────────────────────────────────

/// Errors from [`Ecosystem::run`].
#[derive(Debug, PartialEq)]
pub enum RunError {
    /// The configuration was rejected before any thread started.
    Config(ConfigError),
    /// The OS refused to start an agent thread. No rounds ran to
    /// completion; already-started agents were stopped and joined.
    ThreadSpawnFailed {
        /// The agent whose thread could not be started.
        role: Role,
        /// The OS error message.
        reason: String,
    },
    /// An agent thread panicked.
    AgentPanicked {
        /// The agent that panicked.
        role: Role,
    },
    /// An agent stopped because the barrier was poisoned.
    Barrier {
        /// The agent that observed the poisoned barrier.
        role: Role,
        /// The barrier error it returned.
        source: BarrierError,
    },
    /// Agents completed different numbers of rounds.
    Desynchronized {
        /// Rounds completed by the first agent.
        expected: u64,
        /// The agent that disagreed.
        role: Role,
        /// Rounds it completed.
        rounds: u64,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::ThreadSpawnFailed { role, reason } => {
                write!(f, "failed to spawn {role} agent thread: {reason}")
            }
            Self::AgentPanicked { role } => write!(f, "{role} agent panicked"),
            Self::Barrier { role, source } => write!(f, "{role} agent stopped: {source}"),
            Self::Desynchronized {
                expected,
                role,
                rounds,
            } => write!(
                f,
                "{role} agent completed {rounds} rounds, expected {expected}"
            ),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Barrier { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ── Ecosystem ─────────────────────────────────────────────────────

/// A validated, ready-to-run simulation.
///
/// Construction does everything that can fail before threads exist:
/// validation, barrier construction, the first month's weather, and
/// agent assembly. [`run`](Ecosystem::run) consumes it.
pub struct Ecosystem {
    config: SimConfig,
    world: Arc<World>,
    barrier: Arc<dyn RoundBarrier>,
    agents: Vec<Box<dyn RoundAgent>>,
}

impl Ecosystem {
    /// Build the standard four-agent ecosystem, reporting to `sink`.
    pub fn new(config: SimConfig, sink: Box<dyn TelemetrySink>) -> Result<Self, ConfigError> {
        Self::with_agents(config, |parts| standard_agents(parts, sink))
    }

    /// Build an ecosystem whose agents come from `build`.
    ///
    /// `build` receives the writer handles, the update rules and the
    /// weather model. It must return exactly `config.participants`
    /// agents.
    pub fn with_agents<F>(config: SimConfig, build: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(AgentParts) -> Vec<Box<dyn RoundAgent>>,
    {
        config.validate()?;
        let barrier = config.barrier.build(config.participants)?;

        let mut weather = WeatherModel::new(config.weather.clone(), config.seed, config.reseed);
        let first_weather = match config.initial_weather {
            Some(w) => w,
            None => weather.sample(config.start.month()),
        };
        weather.reseed();

        let initial = RoundSnapshot {
            clock: config.start,
            weather: first_weather,
            vegetation: VegetationState::new(config.initial_vegetation),
            prey: PopulationState::new(config.initial_prey),
            predator: PopulationState::new(config.initial_predator),
        };
        let (world, writers) = World::new(initial);
        let parts = AgentParts {
            writers,
            rules: Arc::new(StandardRules::new(config.rates.clone())),
            weather,
        };

        let agents = build(parts);
        if agents.len() != config.participants {
            return Err(ConfigError::ParticipantMismatch {
                participants: config.participants,
                agents: agents.len(),
            });
        }

        Ok(Self {
            config,
            world,
            barrier,
            agents,
        })
    }

    /// The shared world.
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// The configuration this ecosystem was built from.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run every agent on its own thread until the end year, then join.
    ///
    /// # Errors
    ///
    /// A panicking agent is reported as [`RunError::AgentPanicked`] in
    /// preference to the [`RunError::Barrier`] errors it causes in the
    /// other agents.
    pub fn run(self) -> Result<SimulationReport, RunError> {
        let Self {
            config,
            world,
            barrier,
            agents,
        } = self;

        tracing::info!(
            start = %config.start,
            end_year = config.end_year,
            rounds = config.expected_rounds(),
            barrier = ?config.barrier,
            "starting simulation"
        );
        let started = Instant::now();

        let mut handles: Vec<(Role, JoinHandle<Result<AgentReport, BarrierError>>)> =
            Vec::with_capacity(agents.len());
        for mut agent in agents {
            let role = agent.role();
            let thread_world = Arc::clone(&world);
            let thread_barrier = Arc::clone(&barrier);
            let end_year = config.end_year;
            let spawned = thread::Builder::new()
                .name(format!("grove-{role}"))
                .spawn(move || {
                    run_rounds(&mut *agent, &thread_world, &*thread_barrier, end_year)
                });
            match spawned {
                Ok(handle) => handles.push((role, handle)),
                Err(e) => {
                    tracing::error!(%role, error = %e, "failed to spawn agent thread");
                    // Release anyone already waiting for the missing agent.
                    barrier.poison();
                    for (_, handle) in handles {
                        let _ = handle.join();
                    }
                    return Err(RunError::ThreadSpawnFailed {
                        role,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut failure: Option<RunError> = None;
        for (role, handle) in handles {
            match handle.join() {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(source)) => {
                    tracing::warn!(%role, error = %source, "agent stopped early");
                    if failure.is_none() {
                        failure = Some(RunError::Barrier { role, source });
                    }
                }
                Err(_) => {
                    tracing::error!(%role, "agent thread panicked");
                    if !matches!(failure, Some(RunError::AgentPanicked { .. })) {
                        failure = Some(RunError::AgentPanicked { role });
                    }
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let rounds = reports.first().map_or(0, |r| r.rounds);
        if let Some(r) = reports.iter().find(|r| r.rounds != rounds) {
            return Err(RunError::Desynchronized {
                expected: rounds,
                role: r.role,
                rounds: r.rounds,
            });
        }

        let elapsed_us = started.elapsed().as_micros() as u64;
        let final_snapshot = world.snapshot();
        tracing::info!(
            rounds,
            elapsed_us,
            clock = %final_snapshot.clock,
            "simulation finished"
        );
        Ok(SimulationReport {
            rounds,
            agents: reports,
            final_snapshot,
            elapsed_us,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{CommittedPopulations, RoundId, SimulationClock};

    use crate::config::WeatherParams;
    use crate::telemetry::{ChannelSink, NullSink};
    use crate::weather::ReseedPolicy;

    fn one_year() -> SimConfig {
        SimConfig {
            end_year: 2025,
            weather: WeatherParams::default().noiseless(),
            reseed: ReseedPolicy::Never,
            ..SimConfig::default()
        }
    }

    #[test]
    fn one_year_runs_twelve_rounds() {
        let (sink, rx) = ChannelSink::unbounded();
        let eco = Ecosystem::new(one_year(), Box::new(sink)).unwrap();
        let report = eco.run().unwrap();
        assert_eq!(report.rounds, 12);
        assert_eq!(report.agents.len(), 4);
        assert!(report.agents.iter().all(|a| a.rounds == 12));
        assert_eq!(report.final_snapshot.clock, SimulationClock::january(2025));
        assert_eq!(rx.try_iter().count(), 12);
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let cfg = SimConfig {
            end_year: 2020,
            ..SimConfig::default()
        };
        match Ecosystem::new(cfg, Box::new(NullSink)) {
            Err(ConfigError::EndNotAfterStart { .. }) => {}
            Err(other) => panic!("expected EndNotAfterStart, got {other:?}"),
            Ok(_) => panic!("expected EndNotAfterStart, got Ok"),
        }
    }

    #[test]
    fn agent_count_must_match_participants() {
        let result = Ecosystem::with_agents(one_year(), |parts| {
            let mut agents = standard_agents(parts, Box::new(NullSink));
            agents.pop();
            agents
        });
        match result {
            Err(ConfigError::ParticipantMismatch {
                participants: 4,
                agents: 3,
            }) => {}
            Err(other) => panic!("expected ParticipantMismatch, got {other:?}"),
            Ok(_) => panic!("expected ParticipantMismatch, got Ok"),
        }
    }

    #[test]
    fn initial_weather_override_is_used() {
        let cfg = SimConfig {
            initial_weather: Some(grove_core::WeatherSample::new(10.0, 40.0)),
            ..one_year()
        };
        let eco = Ecosystem::new(cfg, Box::new(NullSink)).unwrap();
        let s = eco.world().snapshot();
        assert_eq!(s.weather.temperature(), 40.0);
        assert_eq!(s.weather.precipitation(), 10.0);
        assert_eq!(eco.config().end_year, 2025);
    }

    /// Panics during compute of the given round; otherwise does nothing.
    struct Faulty {
        at: RoundId,
        seen: RoundId,
    }

    impl RoundAgent for Faulty {
        fn role(&self) -> Role {
            Role::Predator
        }
        fn compute(&mut self, _snapshot: &RoundSnapshot) {
            if self.seen == self.at {
                panic!("injected fault");
            }
        }
        fn commit(&mut self) {}
        fn observe(&mut self, round: RoundId, _committed: &CommittedPopulations) {
            self.seen = round.next();
        }
    }

    #[test]
    fn panicking_agent_is_reported() {
        let eco = Ecosystem::with_agents(one_year(), |parts| {
            let mut agents = standard_agents(parts, Box::new(NullSink));
            agents[2] = Box::new(Faulty {
                at: RoundId(3),
                seen: RoundId(0),
            });
            agents
        })
        .unwrap();
        match eco.run() {
            Err(RunError::AgentPanicked {
                role: Role::Predator,
            }) => {}
            other => panic!("expected AgentPanicked, got {other:?}"),
        }
    }

    #[test]
    fn error_display_and_source() {
        let e = RunError::Barrier {
            role: Role::Clock,
            source: BarrierError::Poisoned { generation: 7 },
        };
        assert!(e.to_string().starts_with("clock agent stopped"));
        assert!(e.source().is_some());
        let e = RunError::ThreadSpawnFailed {
            role: Role::Prey,
            reason: "out of threads".into(),
        };
        assert!(e.to_string().contains("prey"));
        assert!(e.source().is_none());
        let e = RunError::from(ConfigError::from(BarrierError::NoParticipants));
        assert!(matches!(e, RunError::Config(_)));
    }
}
