//! Core entity types and errors for the Grove lockstep ecosystem.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value types every agent reads during a round (clock, weather,
//! vegetation, populations), the identifiers used to label rounds and
//! roles, and the barrier error type shared by the sync and engine crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod state;

pub use error::BarrierError;
pub use id::{RoundId, Role};
pub use state::{
    CommittedPopulations, PopulationState, RoundSnapshot, SimulationClock, VegetationState,
    WeatherSample, MONTHS_PER_YEAR,
};
