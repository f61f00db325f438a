//! Reusable configurations and agents.
//!
//! - [`quiet_config`]: noiseless weather, no reseeding. Fully deterministic.
//! - [`fixed_weather_config`]: ideal first-round weather for golden tests.
//! - [`probe_config`]: zeroed populations for [`probe_agents`](crate::probe_agents).
//! - [`FailingAgent`]: panics in a chosen round.

use grove_core::{CommittedPopulations, Role, RoundId, RoundSnapshot, SimulationClock, WeatherSample};
use grove_engine::{ReseedPolicy, RoundAgent, SimConfig, WeatherParams};

/// Default populations, January 2024 to January `end_year`, noiseless weather.
pub fn quiet_config(end_year: i32) -> SimConfig {
    SimConfig {
        start: SimulationClock::january(2024),
        end_year,
        weather: WeatherParams::default().noiseless(),
        reseed: ReseedPolicy::Never,
        ..SimConfig::default()
    }
}

/// One quiet year whose first round sees 10 inches of rain at 40 degrees,
/// the peak of the grain growth curve.
pub fn fixed_weather_config() -> SimConfig {
    SimConfig {
        initial_weather: Some(WeatherSample::new(10.0, 40.0)),
        ..quiet_config(2025)
    }
}

/// Quiet config with every population starting at zero.
pub fn probe_config(end_year: i32) -> SimConfig {
    SimConfig {
        initial_vegetation: 0.0,
        initial_prey: 0,
        initial_predator: 0,
        ..quiet_config(end_year)
    }
}

/// Does nothing until compute of round `at`, then panics.
pub struct FailingAgent {
    role: Role,
    at: RoundId,
    next: RoundId,
}

impl FailingAgent {
    pub fn new(role: Role, at: RoundId) -> Self {
        Self {
            role,
            at,
            next: RoundId(0),
        }
    }
}

impl RoundAgent for FailingAgent {
    fn role(&self) -> Role {
        self.role
    }

    fn compute(&mut self, _snapshot: &RoundSnapshot) {
        if self.next == self.at {
            panic!("{} agent failed in round {}", self.role, self.at);
        }
    }

    fn commit(&mut self) {}

    fn observe(&mut self, round: RoundId, _committed: &CommittedPopulations) {
        self.next = round.next();
    }
}
