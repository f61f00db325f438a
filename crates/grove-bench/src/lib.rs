//! Benchmark profiles and utilities for the Grove simulation.
//!
//! - [`reference_profile`]: the default six-year scenario with noisy,
//!   reproducible weather.
//! - [`long_profile`]: the same scenario over an arbitrary number of years.
//! - [`barrier_cycles`]: drive a bare barrier through many generations.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;
use std::thread;

use grove_core::{BarrierError, SimulationClock};
use grove_engine::{ReseedPolicy, SimConfig};
use grove_sync::{BarrierKind, RoundBarrier};

/// The default scenario: January 2024 to January 2030, 72 rounds.
pub fn reference_profile(seed: u64, barrier: BarrierKind) -> SimConfig {
    SimConfig {
        seed,
        reseed: ReseedPolicy::PerRound,
        barrier,
        ..SimConfig::default()
    }
}

/// The default scenario stretched over `years` years.
pub fn long_profile(years: i32, seed: u64, barrier: BarrierKind) -> SimConfig {
    SimConfig {
        start: SimulationClock::january(2024),
        end_year: 2024 + years.max(1),
        ..reference_profile(seed, barrier)
    }
}

/// Run `participants` threads through `cycles` barrier generations.
///
/// The calling thread is one of the participants. Returns the total
/// number of releases, which equals `cycles` on success.
pub fn barrier_cycles(
    kind: BarrierKind,
    participants: usize,
    cycles: u64,
) -> Result<u64, BarrierError> {
    let barrier: Arc<dyn RoundBarrier> = kind.build(participants)?;
    let helpers: Vec<_> = (1..participants)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || wait_cycles(&*barrier, cycles))
        })
        .collect();

    let mut result = wait_cycles(&*barrier, cycles);
    if result.is_err() {
        barrier.poison();
    }
    for helper in helpers {
        let joined = helper.join().unwrap_or_else(|_| {
            barrier.poison();
            Err(BarrierError::Poisoned { generation: 0 })
        });
        result = match (result, joined) {
            (Ok(a), Ok(b)) => Ok(a + b),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
    }
    result
}

/// Wait `cycles` times, counting the generations this caller released.
fn wait_cycles(barrier: &dyn RoundBarrier, cycles: u64) -> Result<u64, BarrierError> {
    let mut releases = 0;
    for _ in 0..cycles {
        if barrier.arrive_and_wait()?.is_releaser {
            releases += 1;
        }
    }
    Ok(releases)
}
