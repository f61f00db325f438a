//! Integration test: phase ordering and failure handling.
//!
//! Probe agents commit a value derived from the round number and check,
//! in every compute and observe phase, that they see exactly the values
//! the protocol allows. Random sleeps shuffle the arrival order at each
//! barrier.

use grove_core::{Role, RoundId};
use grove_engine::{standard_agents, ConfigError, Ecosystem, NullSink, RunError, SimConfig};
use grove_sync::BarrierKind;
use grove_test_utils::{probe_agents, probe_config, quiet_config, FailingAgent, ProbeLog};

fn run_probes(config: SimConfig, seed: u64) -> (u64, ProbeLog) {
    let mut log = None;
    let eco = Ecosystem::with_agents(config, |parts| {
        let (agents, probe_log) = probe_agents(parts, seed, 40);
        log = Some(probe_log);
        agents
    })
    .unwrap();
    let report = eco.run().unwrap();
    (report.rounds, log.unwrap())
}

#[test]
fn probes_see_only_committed_state_blocking() {
    for seed in 0..3 {
        let (rounds, log) = run_probes(probe_config(2026), seed);
        assert_eq!(rounds, 24);
        let violations = log.violations();
        assert!(violations.is_empty(), "seed {seed}: {violations:#?}");
    }
}

#[test]
fn probes_see_only_committed_state_spin() {
    let config = SimConfig {
        barrier: BarrierKind::Spin,
        ..probe_config(2026)
    };
    let (rounds, log) = run_probes(config, 7);
    assert_eq!(rounds, 24);
    let violations = log.violations();
    assert!(violations.is_empty(), "{violations:#?}");
}

#[test]
fn panicking_population_agent_stops_the_run() {
    let eco = Ecosystem::with_agents(quiet_config(2030), |parts| {
        let mut agents = standard_agents(parts, Box::new(NullSink));
        agents[1] = Box::new(FailingAgent::new(Role::Prey, RoundId(5)));
        agents
    })
    .unwrap();
    match eco.run() {
        Err(RunError::AgentPanicked { role: Role::Prey }) => {}
        other => panic!("expected AgentPanicked, got {other:?}"),
    }
}

#[test]
fn panicking_clock_agent_stops_the_run() {
    let eco = Ecosystem::with_agents(quiet_config(2030), |parts| {
        let mut agents = standard_agents(parts, Box::new(NullSink));
        agents[3] = Box::new(FailingAgent::new(Role::Clock, RoundId(0)));
        agents
    })
    .unwrap();
    match eco.run() {
        Err(RunError::AgentPanicked { role: Role::Clock }) => {}
        other => panic!("expected AgentPanicked, got {other:?}"),
    }
}

#[test]
fn extra_agent_is_rejected() {
    let result = Ecosystem::with_agents(quiet_config(2025), |parts| {
        let mut agents = standard_agents(parts, Box::new(NullSink));
        agents.push(Box::new(FailingAgent::new(Role::Prey, RoundId(0))));
        agents
    });
    match result {
        Err(ConfigError::ParticipantMismatch {
            participants: 4,
            agents: 5,
        }) => {}
        Err(other) => panic!("expected ParticipantMismatch, got {other:?}"),
        Ok(_) => panic!("expected ParticipantMismatch, got Ok"),
    }
}
