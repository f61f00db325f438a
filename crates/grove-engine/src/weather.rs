//! Seasonal weather generator.
//!
//! Each month's weather is a sinusoid over the year plus bounded uniform
//! noise from a ChaCha8 RNG:
//!
//! - `angle = (30 * month + 15)°`
//! - `temperature = avg_t - amp_t * cos(angle) + U(-noise_t, noise_t)`
//! - `precipitation = max(0, avg_p + amp_p * sin(angle) + U(-noise_p, noise_p))`
//!
//! The RNG is reseeded after every sample according to a
//! [`ReseedPolicy`]. Only the clock agent owns a [`WeatherModel`], and it
//! samples and reseeds only during the observe phase.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use grove_core::WeatherSample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::WeatherParams;

/// Seconds between the Unix epoch and 2000-01-01T00:00:00Z.
const Y2K_UNIX_SECS: u64 = 946_684_800;

/// How the weather RNG is reseeded after each sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReseedPolicy {
    /// Keep drawing from the initial stream.
    Never,
    /// Derive a fresh seed from the base seed and a reseed counter.
    /// Fully reproducible.
    #[default]
    PerRound,
    /// Seed from wall-clock milliseconds since 2000-01-01. Not reproducible.
    WallClock,
}

/// Milliseconds since 2000-01-01, truncated to 32 bits.
pub fn wall_clock_seed() -> u64 {
    let since_unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO);
    let since_y2k = since_unix.saturating_sub(Duration::from_secs(Y2K_UNIX_SECS));
    since_y2k.as_millis() as u64 & u64::from(u32::MAX)
}

/// SplitMix64 finalizer, used to spread successive reseed counters.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seeded weather generator owned by the clock agent.
#[derive(Debug)]
pub struct WeatherModel {
    params: WeatherParams,
    policy: ReseedPolicy,
    base_seed: u64,
    reseeds: u64,
    rng: ChaCha8Rng,
}

impl WeatherModel {
    /// Create a model seeded with `seed`.
    pub fn new(params: WeatherParams, seed: u64, policy: ReseedPolicy) -> Self {
        Self {
            params,
            policy,
            base_seed: seed,
            reseeds: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Noise-free `(precipitation, temperature)` for `month`.
    ///
    /// Precipitation is not clamped here.
    pub fn seasonal(params: &WeatherParams, month: u32) -> (f32, f32) {
        let angle = (30.0 * month as f32 + 15.0).to_radians();
        let temperature = params.avg_temperature - params.amp_temperature * angle.cos();
        let precipitation = params.avg_precipitation + params.amp_precipitation * angle.sin();
        (precipitation, temperature)
    }

    /// Draw the weather for `month`.
    pub fn sample(&mut self, month: u32) -> WeatherSample {
        let (precipitation, temperature) = Self::seasonal(&self.params, month);
        let t_noise = self.noise(self.params.temperature_noise);
        let p_noise = self.noise(self.params.precipitation_noise);
        WeatherSample::new(precipitation + p_noise, temperature + t_noise)
    }

    fn noise(&mut self, half_width: f32) -> f32 {
        if half_width > 0.0 {
            self.rng.random_range(-half_width..=half_width)
        } else {
            0.0
        }
    }

    /// Reseed the RNG according to the configured policy.
    pub fn reseed(&mut self) {
        let seed = match self.policy {
            ReseedPolicy::Never => return,
            ReseedPolicy::PerRound => {
                self.reseeds += 1;
                mix(self.base_seed ^ self.reseeds)
            }
            ReseedPolicy::WallClock => wall_clock_seed(),
        };
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// The configured reseed policy.
    pub fn policy(&self) -> ReseedPolicy {
        self.policy
    }
}
