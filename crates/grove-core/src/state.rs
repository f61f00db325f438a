//! Entity value types and the per-round snapshot.
//!
//! Every type here is a small `Copy` value. Invariants (month range,
//! non-negative precipitation, height and counts) are enforced by the
//! constructors, so any value an agent holds is already valid. Values
//! that would fall below zero are floored rather than rejected.

use std::fmt;

/// Number of months in a simulated year.
pub const MONTHS_PER_YEAR: u32 = 12;

// ── SimulationClock ─────────────────────────────────────────────

/// Simulated calendar position: a year and a zero-based month.
///
/// Ordering is chronological.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimulationClock {
    year: i32,
    month: u32,
}

impl SimulationClock {
    /// Create a clock at `year`/`month`. Returns `None` if `month > 11`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (month < MONTHS_PER_YEAR).then_some(Self { year, month })
    }

    /// January of `year`.
    pub fn january(year: i32) -> Self {
        Self { year, month: 0 }
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month in `0..=11`.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The next month. December wraps to January of the following year.
    pub fn advance(self) -> Self {
        if self.month + 1 >= MONTHS_PER_YEAR {
            Self {
                year: self.year + 1,
                month: 0,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whether the calendar has reached `end_year` (January or later).
    pub fn reached(&self, end_year: i32) -> bool {
        self.year >= end_year
    }

    /// Number of months from `self` until January of `end_year`.
    ///
    /// Zero if the clock is already at or past that point.
    pub fn months_until(&self, end_year: i32) -> u64 {
        let here = i64::from(self.year) * i64::from(MONTHS_PER_YEAR) + i64::from(self.month);
        let end = i64::from(end_year) * i64::from(MONTHS_PER_YEAR);
        u64::try_from(end - here).unwrap_or(0)
    }
}

impl fmt::Display for SimulationClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month + 1)
    }
}

// ── WeatherSample ───────────────────────────────────────────────

/// Monthly weather: precipitation (inches) and temperature (°F).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherSample {
    precipitation: f32,
    temperature: f32,
}

impl WeatherSample {
    /// Create a sample. Negative (or NaN) precipitation is floored to 0.
    pub fn new(precipitation: f32, temperature: f32) -> Self {
        Self {
            precipitation: precipitation.max(0.0),
            temperature,
        }
    }

    /// Precipitation for the month, always `>= 0`.
    pub fn precipitation(&self) -> f32 {
        self.precipitation
    }

    /// Mean temperature for the month.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

// ── VegetationState ─────────────────────────────────────────────

/// Height of the grain crop, in inches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VegetationState {
    height: f32,
}

impl VegetationState {
    /// Create a state. Negative (or NaN) heights are floored to 0.
    pub fn new(height: f32) -> Self {
        Self {
            height: height.max(0.0),
        }
    }

    /// Current height, always `>= 0`.
    pub fn height(&self) -> f32 {
        self.height
    }
}

// ── PopulationState ─────────────────────────────────────────────

/// Head count of one species.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopulationState {
    count: u32,
}

impl PopulationState {
    /// Create a population of `count` individuals.
    pub fn new(count: u32) -> Self {
        Self { count }
    }

    /// Create a population from a signed intermediate value, flooring
    /// negatives to 0 and saturating at `u32::MAX`.
    pub fn from_signed(value: i64) -> Self {
        Self {
            count: u32::try_from(value.max(0)).unwrap_or(u32::MAX),
        }
    }

    /// Current head count.
    pub fn count(&self) -> u32 {
        self.count
    }
}

// ── Snapshots ───────────────────────────────────────────────────

/// The values every agent's compute phase sees for one round.
///
/// Read in one pass from the shared world at the top of a round. The
/// barrier protocol guarantees no field is being written while it is
/// taken, so all five fields belong to the same round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundSnapshot {
    /// Calendar position for this round.
    pub clock: SimulationClock,
    /// Weather for this round's month.
    pub weather: WeatherSample,
    /// Vegetation height committed by the previous round.
    pub vegetation: VegetationState,
    /// Prey count committed by the previous round.
    pub prey: PopulationState,
    /// Predator count committed by the previous round.
    pub predator: PopulationState,
}

/// The commit-phase entities, as visible during the observe phase.
///
/// Excludes the clock and weather: those may be rewritten by the clock
/// agent while the other agents observe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CommittedPopulations {
    /// Vegetation height committed this round.
    pub vegetation: VegetationState,
    /// Prey count committed this round.
    pub prey: PopulationState,
    /// Predator count committed this round.
    pub predator: PopulationState,
}

impl From<&RoundSnapshot> for CommittedPopulations {
    fn from(s: &RoundSnapshot) -> Self {
        Self {
            vegetation: s.vegetation,
            prey: s.prey,
            predator: s.predator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clock_rejects_month_out_of_range() {
        assert!(SimulationClock::new(2024, 11).is_some());
        assert!(SimulationClock::new(2024, 12).is_none());
    }

    #[test]
    fn clock_wraps_december_into_next_year() {
        let dec = SimulationClock::new(2024, 11).unwrap();
        let jan = dec.advance();
        assert_eq!((jan.year(), jan.month()), (2025, 0));

        let jun = SimulationClock::new(2024, 5).unwrap().advance();
        assert_eq!((jun.year(), jun.month()), (2024, 6));
    }

    #[test]
    fn clock_months_until_end() {
        let start = SimulationClock::new(2024, 0).unwrap();
        assert_eq!(start.months_until(2030), 72);
        let late = SimulationClock::new(2024, 9).unwrap();
        assert_eq!(late.months_until(2025), 3);
        assert_eq!(late.months_until(2024), 0);
        assert_eq!(late.months_until(2000), 0);
    }

    #[test]
    fn clock_display_is_one_based() {
        assert_eq!(SimulationClock::new(2024, 0).unwrap().to_string(), "2024-01");
    }

    #[test]
    fn weather_floors_precipitation() {
        let w = WeatherSample::new(-3.5, 55.0);
        assert_eq!(w.precipitation(), 0.0);
        assert_eq!(w.temperature(), 55.0);
        assert_eq!(WeatherSample::new(f32::NAN, 0.0).precipitation(), 0.0);
    }

    #[test]
    fn vegetation_floors_height() {
        assert_eq!(VegetationState::new(-0.1).height(), 0.0);
        assert_eq!(VegetationState::new(4.5).height(), 4.5);
    }

    #[test]
    fn population_from_signed_clamps() {
        assert_eq!(PopulationState::from_signed(-4).count(), 0);
        assert_eq!(PopulationState::from_signed(9).count(), 9);
        assert_eq!(PopulationState::from_signed(i64::MAX).count(), u32::MAX);
    }

    proptest! {
        #[test]
        fn clock_advance_is_monotonic(year in 1900i32..2200, month in 0u32..12, steps in 0usize..60) {
            let mut clock = SimulationClock::new(year, month).unwrap();
            for _ in 0..steps {
                let next = clock.advance();
                prop_assert!(next > clock);
                prop_assert!(next.month() < MONTHS_PER_YEAR);
                clock = next;
            }
        }
    }
}
