//! Error types shared across the Grove workspace.

use std::error::Error;
use std::fmt;

/// Errors reported by a round barrier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BarrierError {
    /// The barrier was initialized with zero participants.
    NoParticipants,
    /// A participant failed while others were waiting; the barrier
    /// will never release again.
    Poisoned {
        /// Generation that was in progress when the barrier was poisoned.
        generation: u64,
    },
}

impl fmt::Display for BarrierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoParticipants => write!(f, "barrier requires at least one participant"),
            Self::Poisoned { generation } => {
                write!(f, "barrier poisoned during generation {generation}")
            }
        }
    }
}

impl Error for BarrierError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            BarrierError::NoParticipants.to_string(),
            "barrier requires at least one participant"
        );
        let msg = BarrierError::Poisoned { generation: 7 }.to_string();
        assert!(msg.contains("generation 7"));
    }
}
