//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] holds every startup constant: calendar bounds, initial
//! populations, ecology rates, the weather model, and the barrier
//! strategy. [`validate()`](SimConfig::validate) checks all structural
//! invariants before any agent thread is spawned.

use std::error::Error;
use std::fmt;

use grove_core::{BarrierError, Role, SimulationClock, WeatherSample};
use grove_sync::BarrierKind;

use crate::weather::ReseedPolicy;

// ── EcologyRates ───────────────────────────────────────────────────

/// Growth and consumption rates for one simulated month.
#[derive(Clone, Debug, PartialEq)]
pub struct EcologyRates {
    /// Grain growth under ideal temperature and precipitation, in inches. Default: 12.0.
    pub grain_growth: f32,
    /// Grain eaten by one prey animal, in inches. Default: 1.0.
    pub prey_eats_grain: f32,
    /// Prey animals eaten by one predator. Default: 2.
    pub predator_eats_prey: u32,
    /// Grain eaten (or trampled) by one predator, in inches. Default: 1.0.
    pub predator_eats_grain: f32,
    /// Temperature at which grain grows fastest. Default: 40.0.
    pub mid_temperature: f32,
    /// Precipitation at which grain grows fastest. Default: 10.0.
    pub mid_precipitation: f32,
    /// Width of the growth bell curve around the midpoints. Default: 10.0.
    pub growth_spread: f32,
}

impl Default for EcologyRates {
    fn default() -> Self {
        Self {
            grain_growth: 12.0,
            prey_eats_grain: 1.0,
            predator_eats_prey: 2,
            predator_eats_grain: 1.0,
            mid_temperature: 40.0,
            mid_precipitation: 10.0,
            growth_spread: 10.0,
        }
    }
}

// ── WeatherParams ──────────────────────────────────────────────────

/// Seasonal weather model: a sinusoid per quantity plus uniform noise.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherParams {
    /// Mean monthly precipitation. Default: 7.0.
    pub avg_precipitation: f32,
    /// Seasonal swing of precipitation (plus or minus). Default: 6.0.
    pub amp_precipitation: f32,
    /// Half-width of uniform precipitation noise. Default: 2.0.
    pub precipitation_noise: f32,
    /// Mean monthly temperature. Default: 60.0.
    pub avg_temperature: f32,
    /// Seasonal swing of temperature (plus or minus). Default: 20.0.
    pub amp_temperature: f32,
    /// Half-width of uniform temperature noise. Default: 10.0.
    pub temperature_noise: f32,
}

impl Default for WeatherParams {
    fn default() -> Self {
        Self {
            avg_precipitation: 7.0,
            amp_precipitation: 6.0,
            precipitation_noise: 2.0,
            avg_temperature: 60.0,
            amp_temperature: 20.0,
            temperature_noise: 10.0,
        }
    }
}

impl WeatherParams {
    /// The same seasonal curve with all noise removed.
    pub fn noiseless(self) -> Self {
        Self {
            precipitation_noise: 0.0,
            temperature_noise: 0.0,
            ..self
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`] or while assembling
/// an [`Ecosystem`](crate::Ecosystem).
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Barrier construction failed.
    Barrier(BarrierError),
    /// The barrier participant count does not match the number of agents.
    ParticipantMismatch {
        /// Participants the barrier was configured for.
        participants: usize,
        /// Agents that would actually run.
        agents: usize,
    },
    /// The end year does not lie after the start year.
    EndNotAfterStart {
        /// Configured start of the calendar.
        start: SimulationClock,
        /// Configured end year.
        end_year: i32,
    },
    /// An initial value is negative or not finite.
    InvalidInitialValue {
        /// Which value.
        name: &'static str,
        /// The offending value.
        value: f32,
    },
    /// An ecology rate is negative or not finite.
    InvalidRate {
        /// Which rate.
        name: &'static str,
        /// The offending value.
        value: f32,
    },
    /// A weather parameter is invalid.
    InvalidWeather {
        /// Description of which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Barrier(e) => write!(f, "barrier: {e}"),
            Self::ParticipantMismatch {
                participants,
                agents,
            } => write!(
                f,
                "barrier expects {participants} participants but {agents} agents would run"
            ),
            Self::EndNotAfterStart { start, end_year } => {
                write!(f, "end year {end_year} is not after start {start}")
            }
            Self::InvalidInitialValue { name, value } => {
                write!(f, "initial {name} must be finite and >= 0, got {value}")
            }
            Self::InvalidRate { name, value } => {
                write!(f, "rate {name} must be finite and >= 0, got {value}")
            }
            Self::InvalidWeather { reason } => write!(f, "invalid weather params: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Barrier(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BarrierError> for ConfigError {
    fn from(e: BarrierError) -> Self {
        Self::Barrier(e)
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for one simulation run.
///
/// `Default` reproduces the reference scenario: January 2024 through
/// December 2029, five inches of grain, two deer, one bear.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// First simulated month.
    pub start: SimulationClock,
    /// The run stops at the top of the first round in January of this year.
    pub end_year: i32,
    /// Initial grain height.
    pub initial_vegetation: f32,
    /// Initial prey count.
    pub initial_prey: u32,
    /// Initial predator count.
    pub initial_predator: u32,
    /// Fixed weather for the first round. `None` samples the weather
    /// model for the start month.
    pub initial_weather: Option<WeatherSample>,
    /// Growth and consumption rates.
    pub rates: EcologyRates,
    /// Seasonal weather model.
    pub weather: WeatherParams,
    /// Seed for the weather RNG.
    pub seed: u64,
    /// How the clock agent reseeds the weather RNG each round.
    pub reseed: ReseedPolicy,
    /// Barrier participant count. Must equal the number of roles.
    pub participants: usize,
    /// Barrier waiting strategy.
    pub barrier: BarrierKind,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start: SimulationClock::january(2024),
            end_year: 2030,
            initial_vegetation: 5.0,
            initial_prey: 2,
            initial_predator: 1,
            initial_weather: None,
            rates: EcologyRates::default(),
            weather: WeatherParams::default(),
            seed: 0,
            reseed: ReseedPolicy::PerRound,
            participants: Role::ALL.len(),
            barrier: BarrierKind::Blocking,
        }
    }
}

fn check_non_negative(
    name: &'static str,
    value: f32,
    err: fn(&'static str, f32) -> ConfigError,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(err(name, value))
    }
}

fn invalid_rate(name: &'static str, value: f32) -> ConfigError {
    ConfigError::InvalidRate { name, value }
}

impl SimConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Barrier participants: positive, and one per role.
        if self.participants == 0 {
            return Err(BarrierError::NoParticipants.into());
        }
        if self.participants != Role::ALL.len() {
            return Err(ConfigError::ParticipantMismatch {
                participants: self.participants,
                agents: Role::ALL.len(),
            });
        }
        // 2. At least one round must run.
        if self.end_year <= self.start.year() {
            return Err(ConfigError::EndNotAfterStart {
                start: self.start,
                end_year: self.end_year,
            });
        }
        // 3. Initial state.
        check_non_negative("vegetation", self.initial_vegetation, |name, value| {
            ConfigError::InvalidInitialValue { name, value }
        })?;
        if let Some(w) = self.initial_weather {
            if !w.temperature().is_finite() || !w.precipitation().is_finite() {
                return Err(ConfigError::InvalidWeather {
                    reason: "initial weather must be finite".to_string(),
                });
            }
        }
        // 4. Rates.
        let r = &self.rates;
        check_non_negative("grain_growth", r.grain_growth, invalid_rate)?;
        check_non_negative("prey_eats_grain", r.prey_eats_grain, invalid_rate)?;
        check_non_negative("predator_eats_grain", r.predator_eats_grain, invalid_rate)?;
        if !r.mid_temperature.is_finite() {
            return Err(invalid_rate("mid_temperature", r.mid_temperature));
        }
        if !r.mid_precipitation.is_finite() {
            return Err(invalid_rate("mid_precipitation", r.mid_precipitation));
        }
        if !r.growth_spread.is_finite() || r.growth_spread <= 0.0 {
            return Err(invalid_rate("growth_spread", r.growth_spread));
        }
        // 5. Weather.
        let w = &self.weather;
        for (name, value) in [
            ("avg_precipitation", w.avg_precipitation),
            ("amp_precipitation", w.amp_precipitation),
            ("avg_temperature", w.avg_temperature),
            ("amp_temperature", w.amp_temperature),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidWeather {
                    reason: format!("{name} must be finite, got {value}"),
                });
            }
        }
        for (name, value) in [
            ("precipitation_noise", w.precipitation_noise),
            ("temperature_noise", w.temperature_noise),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeather {
                    reason: format!("{name} must be finite and >= 0, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Number of rounds this configuration will run.
    pub fn expected_rounds(&self) -> u64 {
        self.start.months_until(self.end_year)
    }
}
