//! Test fixtures and probe agents for Grove development.
//!
//! [`fixtures`] holds deterministic configurations and fault-injecting
//! agents; [`probe`] holds agents that check, every phase of every
//! round, that they only ever see fully-committed state.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod probe;

pub use fixtures::{fixed_weather_config, probe_config, quiet_config, FailingAgent};
pub use probe::{probe_agents, ProbeAgent, ProbeLog, ProbeWriter};
