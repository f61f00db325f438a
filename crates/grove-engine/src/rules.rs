//! Per-role update rules.
//!
//! Each rule maps the current round's snapshot to a proposed next value
//! for one entity. Results are floored at zero; going negative is
//! expected under heavy grazing or predation and is not an error.
//!
//! Rules are pluggable via [`EcologyRules`]. The round protocol never
//! depends on the arithmetic inside them.

use grove_core::{PopulationState, RoundSnapshot, VegetationState};

use crate::config::EcologyRates;

/// Next-value rules for the three population entities.
pub trait EcologyRules: Send + Sync {
    /// Next vegetation height.
    fn next_vegetation(&self, snapshot: &RoundSnapshot) -> VegetationState;
    /// Next prey count.
    fn next_prey(&self, snapshot: &RoundSnapshot) -> PopulationState;
    /// Next predator count.
    fn next_predator(&self, snapshot: &RoundSnapshot) -> PopulationState;
}

/// Gaussian bell: 1.0 at `mid`, falling off with width `spread`.
pub fn growth_factor(value: f32, mid: f32, spread: f32) -> f32 {
    let z = (value - mid) / spread;
    (-(z * z)).exp()
}

/// Move `current` one step toward `capacity`.
fn step_toward(current: i64, capacity: i64) -> i64 {
    match current.cmp(&capacity) {
        std::cmp::Ordering::Less => current + 1,
        std::cmp::Ordering::Greater => current - 1,
        std::cmp::Ordering::Equal => current,
    }
}

/// Grain, deer and bear rules.
///
/// - Vegetation grows by `grain_growth` scaled by how close temperature
///   and precipitation are to their midpoints, minus what prey and
///   predators eat.
/// - Prey lose `predator_eats_prey` per predator, then move one step
///   toward a carrying capacity equal to the whole-inch grain height.
/// - Predators move one step toward a carrying capacity equal to the
///   prey count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StandardRules {
    rates: EcologyRates,
}

impl StandardRules {
    /// Rules using `rates`.
    pub fn new(rates: EcologyRates) -> Self {
        Self { rates }
    }

    /// The configured rates.
    pub fn rates(&self) -> &EcologyRates {
        &self.rates
    }
}

impl EcologyRules for StandardRules {
    fn next_vegetation(&self, s: &RoundSnapshot) -> VegetationState {
        let r = &self.rates;
        let temp_factor = growth_factor(s.weather.temperature(), r.mid_temperature, r.growth_spread);
        let precip_factor = growth_factor(
            s.weather.precipitation(),
            r.mid_precipitation,
            r.growth_spread,
        );
        let mut height = s.vegetation.height();
        height += temp_factor * precip_factor * r.grain_growth;
        height -= s.prey.count() as f32 * r.prey_eats_grain;
        height -= s.predator.count() as f32 * r.predator_eats_grain;
        VegetationState::new(height)
    }

    fn next_prey(&self, s: &RoundSnapshot) -> PopulationState {
        let eaten = i64::from(s.predator.count()) * i64::from(self.rates.predator_eats_prey);
        let after_predation = i64::from(s.prey.count()) - eaten;
        let capacity = s.vegetation.height().trunc() as i64;
        PopulationState::from_signed(step_toward(after_predation, capacity))
    }

    fn next_predator(&self, s: &RoundSnapshot) -> PopulationState {
        let capacity = i64::from(s.prey.count());
        PopulationState::from_signed(step_toward(i64::from(s.predator.count()), capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{SimulationClock, WeatherSample};
    use proptest::prelude::*;

    fn snapshot(height: f32, prey: u32, predator: u32, precip: f32, temp: f32) -> RoundSnapshot {
        RoundSnapshot {
            clock: SimulationClock::january(2024),
            weather: WeatherSample::new(precip, temp),
            vegetation: VegetationState::new(height),
            prey: PopulationState::new(prey),
            predator: PopulationState::new(predator),
        }
    }

    #[test]
    fn growth_factor_peaks_at_midpoint() {
        assert_eq!(growth_factor(40.0, 40.0, 10.0), 1.0);
        let off = growth_factor(50.0, 40.0, 10.0);
        assert!((off - (-1.0f32).exp()).abs() < 1e-6);
        assert_eq!(growth_factor(30.0, 40.0, 10.0), off);
    }

    #[test]
    fn ideal_weather_reference_round() {
        let rules = StandardRules::default();
        let s = snapshot(5.0, 2, 1, 10.0, 40.0);
        // 5 + 12 - 2*1 - 1*1
        assert_eq!(rules.next_vegetation(&s).height(), 14.0);
        // 2 - 1*2 = 0, capacity 5: +1
        assert_eq!(rules.next_prey(&s).count(), 1);
        // 1, capacity 2: +1
        assert_eq!(rules.next_predator(&s).count(), 2);
    }

    #[test]
    fn prey_move_down_toward_capacity() {
        let rules = StandardRules::default();
        let s = snapshot(3.9, 10, 0, 10.0, 40.0);
        // capacity trunc(3.9) = 3
        assert_eq!(rules.next_prey(&s).count(), 9);
        let steady = snapshot(4.0, 4, 0, 10.0, 40.0);
        assert_eq!(rules.next_prey(&steady).count(), 4);
    }

    #[test]
    fn predators_follow_prey() {
        let rules = StandardRules::default();
        assert_eq!(rules.next_predator(&snapshot(0.0, 0, 3, 0.0, 0.0)).count(), 2);
        assert_eq!(rules.next_predator(&snapshot(0.0, 3, 3, 0.0, 0.0)).count(), 3);
        assert_eq!(rules.next_predator(&snapshot(0.0, 0, 0, 0.0, 0.0)).count(), 0);
    }

    #[test]
    fn heavy_predation_clamps_prey_at_zero() {
        let rules = StandardRules::default();
        let s = snapshot(20.0, 1, 5, 10.0, 40.0);
        assert_eq!(rules.next_prey(&s).count(), 0);
    }

    #[test]
    fn overgrazing_clamps_height_at_zero() {
        let rules = StandardRules::default();
        let s = snapshot(1.0, 50, 5, 0.0, 100.0);
        assert_eq!(rules.next_vegetation(&s).height(), 0.0);
    }

    proptest! {
        #[test]
        fn rules_never_go_negative(
            height in 0.0f32..100.0,
            prey in 0u32..200,
            predator in 0u32..200,
            precip in 0.0f32..30.0,
            temp in -20.0f32..120.0,
        ) {
            let rules = StandardRules::default();
            let s = snapshot(height, prey, predator, precip, temp);
            let v = rules.next_vegetation(&s).height();
            prop_assert!(v >= 0.0);
            prop_assert!(v <= height + rules.rates().grain_growth + 1e-3);
            // Counts move by at most one step after predation.
            let p = rules.next_predator(&s).count();
            prop_assert!(p.abs_diff(predator) <= 1);
        }
    }
}
