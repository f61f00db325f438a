//! `grove`: run the reference scenario and write one telemetry line per
//! simulated month to stderr.
//!
//! Logging goes through `tracing`; set `RUST_LOG` to change the filter
//! (default `info`).
//!
//! Exit codes: 0 on success, 1 if an agent thread could not be started,
//! 2 on a configuration error, 3 if an agent failed mid-run.

use std::process::ExitCode;
use std::thread;

use grove::engine::wall_clock_seed;
use grove::prelude::*;
use tracing_subscriber::EnvFilter;

fn exit_code(err: &RunError) -> u8 {
    match err {
        RunError::ThreadSpawnFailed { .. } => 1,
        RunError::Config(_) => 2,
        RunError::AgentPanicked { .. }
        | RunError::Barrier { .. }
        | RunError::Desynchronized { .. } => 3,
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match thread::available_parallelism() {
        Ok(n) => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), parallelism = n.get(), "grove");
            if n.get() < Role::ALL.len() {
                tracing::warn!(
                    parallelism = n.get(),
                    agents = Role::ALL.len(),
                    "fewer cores than agents; agents will share cores"
                );
            }
        }
        Err(e) => tracing::warn!(error = %e, "available parallelism unknown"),
    }

    let config = SimConfig {
        seed: wall_clock_seed(),
        reseed: ReseedPolicy::WallClock,
        ..SimConfig::default()
    };

    let eco = match Ecosystem::new(config, Box::new(WriterSink::stderr())) {
        Ok(eco) => eco,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::from(2);
        }
    };

    match eco.run() {
        Ok(report) => {
            for agent in &report.agents {
                tracing::debug!(
                    role = %agent.role,
                    rounds = agent.rounds,
                    barrier_wait_us = agent.barrier_wait_us,
                    compute_us = agent.compute_us,
                    "agent report"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            ExitCode::from(exit_code(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_failure_class() {
        let spawn = RunError::ThreadSpawnFailed {
            role: Role::Clock,
            reason: "resource temporarily unavailable".into(),
        };
        let config = RunError::Config(ConfigError::from(BarrierError::NoParticipants));
        let panicked = RunError::AgentPanicked { role: Role::Prey };
        let barrier = RunError::Barrier {
            role: Role::Vegetation,
            source: BarrierError::Poisoned { generation: 3 },
        };
        assert_eq!(exit_code(&spawn), 1);
        assert_eq!(exit_code(&config), 2);
        assert_eq!(exit_code(&panicked), 3);
        assert_eq!(exit_code(&barrier), 3);
    }
}
