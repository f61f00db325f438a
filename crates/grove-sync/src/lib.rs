//! Reusable round barriers for lockstep agent coordination.
//!
//! A [`RoundBarrier`] is a rendezvous point for a fixed number of
//! participants. Each call to [`arrive_and_wait()`](RoundBarrier::arrive_and_wait)
//! blocks until every participant has arrived, then releases all of them
//! and resets for the next cycle.
//!
//! Both implementations use a two-counter handshake: the participant
//! whose arrival completes the cycle (the *releaser*) resets the arrival
//! counter and then waits until every other participant has registered
//! its departure before anyone may enter the next cycle. Without the
//! drain, a fast participant could loop back in and bump the arrival
//! count before a slow one has noticed the release.
//!
//! - [`BlockingBarrier`]: `Mutex` + `Condvar`. The default.
//! - [`SpinBarrier`]: atomics and busy-waiting. Lower wake-up latency
//!   when every participant has its own core.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod barrier;
pub mod blocking;
pub mod spin;

pub use barrier::{BarrierKind, BarrierWaitResult, PoisonOnUnwind, RoundBarrier};
pub use blocking::BlockingBarrier;
pub use grove_core::BarrierError;
pub use spin::SpinBarrier;
