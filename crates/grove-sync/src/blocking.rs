//! Condition-variable round barrier.
//!
//! All counters live under one `Mutex`. Waiters park on `released`;
//! the releaser parks on `departed` until the drain completes. While
//! draining, the entry gate is closed: a participant that loops back
//! early waits on `released` until the releaser reopens it.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use grove_core::BarrierError;

use crate::barrier::{BarrierWaitResult, RoundBarrier};

#[derive(Debug, Default)]
struct State {
    arrived: usize,
    departed: usize,
    generation: u64,
    draining: bool,
    poisoned: bool,
}

/// A [`RoundBarrier`] that parks waiting threads.
#[derive(Debug)]
pub struct BlockingBarrier {
    participants: usize,
    state: Mutex<State>,
    released: Condvar,
    departed: Condvar,
}

// Compile-time assertion: BlockingBarrier must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<BlockingBarrier>();
};

impl BlockingBarrier {
    /// Create a barrier for `participants` participants.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::NoParticipants`] if `participants == 0`.
    pub fn new(participants: usize) -> Result<Self, BarrierError> {
        if participants == 0 {
            return Err(BarrierError::NoParticipants);
        }
        Ok(Self {
            participants,
            state: Mutex::new(State::default()),
            released: Condvar::new(),
            departed: Condvar::new(),
        })
    }

    // The guarded state is plain counters, so a panic elsewhere while
    // holding the lock cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_released<'a>(&self, guard: MutexGuard<'a, State>) -> MutexGuard<'a, State> {
        self.released
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl RoundBarrier for BlockingBarrier {
    fn participants(&self) -> usize {
        self.participants
    }

    fn arrive_and_wait(&self) -> Result<BarrierWaitResult, BarrierError> {
        let mut state = self.lock();

        // Entry gate: the previous cycle is still draining.
        while state.draining && !state.poisoned {
            state = self.wait_released(state);
        }
        if state.poisoned {
            return Err(BarrierError::Poisoned {
                generation: state.generation,
            });
        }

        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.participants {
            state.arrived = 0;
            state.generation += 1;
            state.draining = true;
            self.released.notify_all();

            // Every released participant is already inside this call, so
            // the drain completes even if the barrier is poisoned meanwhile.
            while state.departed < self.participants - 1 {
                state = self
                    .departed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            state.departed = 0;
            state.draining = false;
            self.released.notify_all();

            return Ok(BarrierWaitResult {
                generation,
                is_releaser: true,
            });
        }

        while state.generation == generation && !state.poisoned {
            state = self.wait_released(state);
        }
        if state.generation == generation {
            // Poisoned before this cycle was released.
            return Err(BarrierError::Poisoned { generation });
        }

        state.departed += 1;
        if state.departed == self.participants - 1 {
            self.departed.notify_one();
        }
        Ok(BarrierWaitResult {
            generation,
            is_releaser: false,
        })
    }

    fn poison(&self) {
        let mut state = self.lock();
        state.poisoned = true;
        self.released.notify_all();
        self.departed.notify_all();
    }

    fn is_poisoned(&self) -> bool {
        self.lock().poisoned
    }
}
