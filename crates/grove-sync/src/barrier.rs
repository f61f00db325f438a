//! The [`RoundBarrier`] trait and strategy selection.

use std::sync::Arc;
use std::thread;

use grove_core::BarrierError;

use crate::blocking::BlockingBarrier;
use crate::spin::SpinBarrier;

/// Outcome of one successful [`RoundBarrier::arrive_and_wait()`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrierWaitResult {
    /// The cycle this participant arrived in. Starts at 0 and increases
    /// by one per release, so every participant's k-th successful call
    /// reports generation `k - 1`.
    pub generation: u64,
    /// Whether this participant's arrival completed the cycle. Exactly
    /// one participant per generation is the releaser.
    pub is_releaser: bool,
}

/// A reusable rendezvous point for a fixed set of participants.
///
/// Implementations must be safe to call from `participants()` threads
/// concurrently and must guarantee that no participant's return from
/// generation `k + 1` happens before every participant has returned
/// from generation `k`.
///
/// Everything a participant wrote before arriving is visible to every
/// other participant after it returns from the same generation.
pub trait RoundBarrier: Send + Sync {
    /// Number of participants fixed at construction.
    fn participants(&self) -> usize;

    /// Block until all participants have arrived in the current cycle.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::Poisoned`] if the barrier was poisoned
    /// before this cycle was released.
    fn arrive_and_wait(&self) -> Result<BarrierWaitResult, BarrierError>;

    /// Mark the barrier as permanently broken and wake every waiter.
    ///
    /// Used when a participant can no longer arrive (it panicked or was
    /// never started); the remaining participants then get an error
    /// instead of waiting forever.
    fn poison(&self);

    /// Whether [`poison()`](RoundBarrier::poison) has been called.
    fn is_poisoned(&self) -> bool;
}

/// Waiting strategy for a [`RoundBarrier`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BarrierKind {
    /// Park waiting threads on a condition variable.
    #[default]
    Blocking,
    /// Busy-wait on atomics.
    Spin,
}

impl BarrierKind {
    /// Build a barrier of this kind for `participants` participants.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::NoParticipants`] if `participants == 0`.
    pub fn build(self, participants: usize) -> Result<Arc<dyn RoundBarrier>, BarrierError> {
        Ok(match self {
            Self::Blocking => Arc::new(BlockingBarrier::new(participants)?),
            Self::Spin => Arc::new(SpinBarrier::new(participants)?),
        })
    }
}

/// Poisons a barrier if the owning thread unwinds.
///
/// Hold one for the lifetime of a participant's loop. On a normal exit
/// the guard does nothing.
pub struct PoisonOnUnwind<'a> {
    barrier: &'a dyn RoundBarrier,
}

impl<'a> PoisonOnUnwind<'a> {
    /// Arm a guard over `barrier`.
    pub fn new(barrier: &'a dyn RoundBarrier) -> Self {
        Self { barrier }
    }
}

impl Drop for PoisonOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::warn!("participant panicked; poisoning barrier");
            self.barrier.poison();
        }
    }
}
