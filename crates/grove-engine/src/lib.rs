//! Lockstep round engine running the Grove ecosystem agents.
//!
//! Four agents (vegetation, prey, predator, clock) each run on their
//! own thread and advance one simulated month per round. Every round
//! has three phases separated by a shared [`RoundBarrier`](grove_sync::RoundBarrier):
//!
//! ```text
//!   compute ──barrier── commit ──barrier── observe ──barrier──▶ next round
//!   read snapshot       write own entity   report; clock advances
//! ```
//!
//! No agent can read a partially-updated world, and no agent can run
//! more than one phase ahead of any other.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod config;
pub mod metrics;
pub mod roles;
pub mod rules;
pub mod runner;
pub mod telemetry;
pub mod weather;
pub mod world;

pub use agent::{run_rounds, RoundAgent};
pub use config::{ConfigError, EcologyRates, SimConfig, WeatherParams};
pub use metrics::{AgentReport, SimulationReport};
pub use roles::{standard_agents, AgentParts, ClockAgent, PredatorAgent, PreyAgent, VegetationAgent};
pub use rules::{EcologyRules, StandardRules};
pub use runner::{Ecosystem, RunError};
pub use telemetry::{ChannelSink, NullSink, TelemetryRow, TelemetrySink, TracingSink, WriterSink};
pub use weather::{wall_clock_seed, ReseedPolicy, WeatherModel};
pub use world::{ClockWriter, PredatorWriter, PreyWriter, VegetationWriter, World, WorldWriters};
