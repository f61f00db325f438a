//! Strongly-typed identifiers for rounds and agent roles.

use std::fmt;

/// Zero-based index of a synchronized round.
///
/// One round is one simulated month: a full compute, commit, observe
/// cycle across every agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundId(pub u64);

impl RoundId {
    /// The round after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RoundId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// The four agent roles taking part in every round.
///
/// Each role owns exactly one slice of the world: vegetation height,
/// prey count, predator count, or the clock together with the weather.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Grows and depletes the vegetation height.
    Vegetation,
    /// Owns the prey (deer) population.
    Prey,
    /// Owns the predator (bear) population.
    Predator,
    /// Owns the calendar and the weather; emits telemetry.
    Clock,
}

impl Role {
    /// Every role, in the order agents are started.
    pub const ALL: [Role; 4] = [Role::Vegetation, Role::Prey, Role::Predator, Role::Clock];

    /// Short lowercase name, used for thread names and log fields.
    pub fn name(self) -> &'static str {
        match self {
            Self::Vegetation => "vegetation",
            Self::Prey => "prey",
            Self::Predator => "predator",
            Self::Clock => "clock",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
