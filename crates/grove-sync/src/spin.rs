//! Busy-waiting round barrier.
//!
//! The arrival counter is only modified while holding `gate`. The
//! releaser keeps holding `gate` until every other participant has
//! bumped `departed`, so nobody can start the next cycle's arrival
//! count while the current release is still being observed.
//!
//! Ordering: the releaser publishes the release with a `Release` store
//! of `arrived = 0`; waiters spin on an `Acquire` load of it. Each
//! departure is a `Release` increment matched by the releaser's
//! `Acquire` loads during the drain.

use std::hint;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use grove_core::BarrierError;

use crate::barrier::{BarrierWaitResult, RoundBarrier};

/// Spins between `yield_now` calls. Keeps oversubscribed hosts moving.
const SPINS_PER_YIELD: u32 = 128;

fn relax(spins: &mut u32) {
    *spins += 1;
    if *spins % SPINS_PER_YIELD == 0 {
        thread::yield_now();
    } else {
        hint::spin_loop();
    }
}

/// A [`RoundBarrier`] that spins instead of parking.
///
/// Intended for small, fixed participant counts where every participant
/// runs on its own core. With more participants than cores, prefer
/// [`BlockingBarrier`](crate::BlockingBarrier).
#[derive(Debug)]
pub struct SpinBarrier {
    participants: usize,
    gate: Mutex<()>,
    arrived: AtomicUsize,
    departed: AtomicUsize,
    generation: AtomicU64,
    poisoned: AtomicBool,
}

// Compile-time assertion: SpinBarrier must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SpinBarrier>();
};

impl SpinBarrier {
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
            gate: Mutex::new(()),
            arrived: AtomicUsize::new(0),
            departed: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            poisoned: AtomicBool::new(false),
        })
    }
}

impl RoundBarrier for SpinBarrier {
    fn participants(&self) -> usize {
        self.participants
    }

    fn arrive_and_wait(&self) -> Result<BarrierWaitResult, BarrierError> {
        let guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.load(Ordering::Relaxed);
        if self.poisoned.load(Ordering::Acquire) {
            return Err(BarrierError::Poisoned { generation });
        }

        let arrived = self.arrived.load(Ordering::Relaxed) + 1;
        if arrived == self.participants {
            self.departed.store(0, Ordering::Relaxed);
            self.generation.store(generation + 1, Ordering::Relaxed);
            self.arrived.store(0, Ordering::Release);

            // A waiter that saw the poison flag before the release never
            // departs; the barrier is unusable after poisoning anyway.
            let mut spins = 0;
            while self.departed.load(Ordering::Acquire) != self.participants - 1
                && !self.poisoned.load(Ordering::Acquire)
            {
                relax(&mut spins);
            }
            drop(guard);
            return Ok(BarrierWaitResult {
                generation,
                is_releaser: true,
            });
        }
        self.arrived.store(arrived, Ordering::Relaxed);
        drop(guard);

        // `arrived` stays at 0 from the release until the drain ends,
        // because the releaser holds `gate` throughout.
        let mut spins = 0;
        while self.arrived.load(Ordering::Acquire) != 0 {
            if self.poisoned.load(Ordering::Acquire) {
                return Err(BarrierError::Poisoned { generation });
            }
            relax(&mut spins);
        }

        self.departed.fetch_add(1, Ordering::Release);
        Ok(BarrierWaitResult {
            generation,
            is_releaser: false,
        })
    }

    fn poison(&self) {
        self.poisoned.store(true, Ordering::Release);
    }

    fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn single_participant_never_spins() {
        let b = SpinBarrier::new(1).unwrap();
        for g in 0..5 {
            let r = b.arrive_and_wait().unwrap();
            assert_eq!(r.generation, g);
            assert!(r.is_releaser);
        }
    }

    #[test]
    fn counters_reset_after_each_cycle() {
        let b = Arc::new(SpinBarrier::new(3).unwrap());
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let b = Arc::clone(&b);
                thread::spawn(move || {
                    for _ in 0..100 {
                        b.arrive_and_wait().unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(b.arrived.load(Ordering::Acquire), 0);
        assert_eq!(b.generation.load(Ordering::Acquire), 100);
    }

    #[test]
    fn poisoned_barrier_rejects_new_arrivals() {
        let b = SpinBarrier::new(1).unwrap();
        assert!(b.arrive_and_wait().is_ok());
        b.poison();
        assert!(b.is_poisoned());
        match b.arrive_and_wait() {
            Err(BarrierError::Poisoned { generation: 1 }) => {}
            other => panic!("expected Poisoned(1), got {other:?}"),
        }
    }

    #[test]
    fn poison_releases_spinning_waiter() {
        let b = Arc::new(SpinBarrier::new(2).unwrap());
        let waiter = {
            let b = Arc::clone(&b);
            thread::spawn(move || b.arrive_and_wait())
        };
        thread::sleep(Duration::from_millis(20));
        b.poison();
        match waiter.join().unwrap() {
            Err(BarrierError::Poisoned { generation: 0 }) => {}
            other => panic!("expected Poisoned(0), got {other:?}"),
        }
    }
}
