//! Per-round telemetry rows and the sinks that receive them.
//!
//! The clock agent builds one [`TelemetryRow`] per round during its
//! observe phase, after every commit has landed and before it advances
//! the calendar. The row is therefore a self-consistent view of a
//! single round.

use std::fmt;
use std::io::{self, Write};

use crossbeam_channel::{Receiver, Sender};
use grove_core::{RoundId, RoundSnapshot, SimulationClock};

/// One line of simulation output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetryRow {
    /// Round that produced this row.
    pub round: RoundId,
    /// Calendar position of the round (before advancing).
    pub clock: SimulationClock,
    /// Precipitation the round was computed with.
    pub precipitation: f32,
    /// Temperature the round was computed with.
    pub temperature: f32,
    /// Vegetation height committed this round.
    pub vegetation_height: f32,
    /// Prey count committed this round.
    pub prey: u32,
    /// Predator count committed this round.
    pub predator: u32,
}

impl TelemetryRow {
    /// Build a row from a fully-committed snapshot.
    pub fn new(round: RoundId, snapshot: &RoundSnapshot) -> Self {
        Self {
            round,
            clock: snapshot.clock,
            precipitation: snapshot.weather.precipitation(),
            temperature: snapshot.weather.temperature(),
            vegetation_height: snapshot.vegetation.height(),
            prey: snapshot.prey.count(),
            predator: snapshot.predator.count(),
        }
    }
}

/// `month-year , precip , temp , height , prey , predator`, one-based month.
impl fmt::Display for TelemetryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:2}-{:2} , {:6.0} , {:6.0} , {:6.0} , {:6} , {:2}",
            self.clock.month() + 1,
            self.clock.year(),
            self.precipitation,
            self.temperature,
            self.vegetation_height,
            self.prey,
            self.predator,
        )
    }
}

/// Receives telemetry rows from the clock agent.
///
/// Called once per round from the clock agent's thread, in round order.
pub trait TelemetrySink: Send {
    /// Record one row.
    fn record(&mut self, row: &TelemetryRow);

    /// Called once after the final round.
    fn finish(&mut self) {}
}

/// Writes each row as a text line to any [`Write`].
pub struct WriterSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl WriterSink<io::Stderr> {
    /// A sink writing to standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> TelemetrySink for WriterSink<W> {
    fn record(&mut self, row: &TelemetryRow) {
        // Best-effort: a closed stream must not stall the round protocol.
        if let Err(e) = writeln!(self.out, "{row}") {
            tracing::debug!(error = %e, "telemetry write failed");
        }
    }

    fn finish(&mut self) {
        let _ = self.out.flush();
    }
}

/// Emits each row as a structured `tracing` event.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&mut self, row: &TelemetryRow) {
        tracing::info!(
            target: "grove::telemetry",
            round = row.round.0,
            year = row.clock.year(),
            month = row.clock.month() + 1,
            precipitation = row.precipitation,
            temperature = row.temperature,
            vegetation = row.vegetation_height,
            prey = row.prey,
            predator = row.predator,
            "round complete"
        );
    }
}

/// Forwards rows over a crossbeam channel.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<TelemetryRow>,
}

impl ChannelSink {
    /// Create a sink and the receiver that collects its rows.
    pub fn unbounded() -> (Self, Receiver<TelemetryRow>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl TelemetrySink for ChannelSink {
    fn record(&mut self, row: &TelemetryRow) {
        // Best-effort reply: the receiver may have been dropped.
        let _ = self.tx.send(*row);
    }
}

/// Discards every row.
#[derive(Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&mut self, _row: &TelemetryRow) {}
}
