//! Grove: a lockstep predator–prey–vegetation simulation.
//!
//! Four agents (grain, deer, bears, and the calendar) run on their own
//! threads and advance one simulated month per round, separated into
//! compute, commit and observe phases by a reusable round barrier. This
//! is the facade crate that re-exports the public API of the Grove
//! sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use grove::prelude::*;
//!
//! let config = SimConfig {
//!     end_year: 2025,
//!     seed: 7,
//!     ..SimConfig::default()
//! };
//! let (sink, rows) = ChannelSink::unbounded();
//! let report = Ecosystem::new(config, Box::new(sink))
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! assert_eq!(report.rounds, 12);
//! assert_eq!(rows.try_iter().count(), 12);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `grove-core` | Entity values, calendar, round IDs, roles, barrier errors |
//! | [`sync`] | `grove-sync` | Round barrier trait, blocking and spinning barriers |
//! | [`engine`] | `grove-engine` | World state, agents, rules, weather, telemetry, runner |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`grove-core`).
pub use grove_core as types;

/// Round barriers (`grove-sync`).
///
/// [`sync::BlockingBarrier`] is the default; [`sync::SpinBarrier`]
/// trades CPU for wake-up latency.
pub use grove_sync as sync;

/// The simulation engine (`grove-engine`).
///
/// [`engine::Ecosystem`] builds and runs a simulation;
/// [`engine::RoundAgent`] is the extension point for custom agents.
pub use grove_engine as engine;

/// Common imports for typical Grove usage.
pub mod prelude {
    // Core types
    pub use grove_core::{
        PopulationState, Role, RoundId, RoundSnapshot, SimulationClock, VegetationState,
        WeatherSample,
    };

    // Barriers
    pub use grove_sync::{BarrierError, BarrierKind, RoundBarrier};

    // Engine
    pub use grove_engine::{
        ChannelSink, ConfigError, Ecosystem, NullSink, ReseedPolicy, RoundAgent, RunError,
        SimConfig, SimulationReport, TelemetryRow, TelemetrySink, TracingSink, WriterSink,
    };
}
