//! Shared world state and the single-writer handles that mutate it.
//!
//! [`World`] stores every entity in its own atomic cell. Accesses use
//! `Relaxed` ordering: the round barrier is the only synchronization
//! point, and it orders every write before every read in a later phase.
//!
//! Each entity has exactly one writer. [`World::new`] hands out one
//! writer handle per entity, and the handles are neither `Clone` nor
//! constructible elsewhere, so the single-writer rule is enforced by
//! ownership rather than by locks.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;

use grove_core::{
    CommittedPopulations, PopulationState, RoundSnapshot, SimulationClock, VegetationState,
    WeatherSample,
};

/// An `f32` stored as its bit pattern.
#[derive(Debug)]
struct F32Cell(AtomicU32);

impl F32Cell {
    fn new(v: f32) -> Self {
        Self(AtomicU32::new(v.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, v: f32) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }
}

/// The mutable simulation state shared by all agents.
#[derive(Debug)]
pub struct World {
    year: AtomicI32,
    month: AtomicU32,
    precipitation: F32Cell,
    temperature: F32Cell,
    vegetation: F32Cell,
    prey: AtomicU32,
    predator: AtomicU32,
}

// Compile-time assertion: World must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<World>();
};

impl World {
    /// Create a world holding `initial`, plus the only writer for each entity.
    pub fn new(initial: RoundSnapshot) -> (Arc<World>, WorldWriters) {
        let world = Arc::new(World {
            year: AtomicI32::new(initial.clock.year()),
            month: AtomicU32::new(initial.clock.month()),
            precipitation: F32Cell::new(initial.weather.precipitation()),
            temperature: F32Cell::new(initial.weather.temperature()),
            vegetation: F32Cell::new(initial.vegetation.height()),
            prey: AtomicU32::new(initial.prey.count()),
            predator: AtomicU32::new(initial.predator.count()),
        });
        let writers = WorldWriters {
            vegetation: VegetationWriter {
                world: Arc::clone(&world),
            },
            prey: PreyWriter {
                world: Arc::clone(&world),
            },
            predator: PredatorWriter {
                world: Arc::clone(&world),
            },
            clock: ClockWriter {
                world: Arc::clone(&world),
            },
        };
        (world, writers)
    }

    /// Current calendar position.
    pub fn clock(&self) -> SimulationClock {
        let year = self.year.load(Ordering::Relaxed);
        let month = self.month.load(Ordering::Relaxed);
        // Only ClockWriter stores the month, always from a valid clock.
        SimulationClock::new(year, month).unwrap_or_else(|| SimulationClock::january(year))
    }

    /// Read every entity.
    ///
    /// Call only in a phase where no entity is being written: the compute
    /// phase, or the clock agent's own observe phase.
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            clock: self.clock(),
            weather: WeatherSample::new(self.precipitation.load(), self.temperature.load()),
            vegetation: VegetationState::new(self.vegetation.load()),
            prey: PopulationState::new(self.prey.load(Ordering::Relaxed)),
            predator: PopulationState::new(self.predator.load(Ordering::Relaxed)),
        }
    }

    /// Read the entities written during the commit phase.
    ///
    /// Safe to call from any agent during the observe phase.
    pub fn committed(&self) -> CommittedPopulations {
        CommittedPopulations {
            vegetation: VegetationState::new(self.vegetation.load()),
            prey: PopulationState::new(self.prey.load(Ordering::Relaxed)),
            predator: PopulationState::new(self.predator.load(Ordering::Relaxed)),
        }
    }
}

/// One writer per entity, returned by [`World::new`].
#[derive(Debug)]
pub struct WorldWriters {
    /// Sole writer of the vegetation height.
    pub vegetation: VegetationWriter,
    /// Sole writer of the prey count.
    pub prey: PreyWriter,
    /// Sole writer of the predator count.
    pub predator: PredatorWriter,
    /// Sole writer of the clock and the weather.
    pub clock: ClockWriter,
}

/// Exclusive write access to the vegetation height.
#[derive(Debug)]
pub struct VegetationWriter {
    world: Arc<World>,
}

impl VegetationWriter {
    /// Commit a new height.
    pub fn set(&mut self, state: VegetationState) {
        self.world.vegetation.store(state.height());
    }

    /// The world this writer belongs to.
    pub fn world(&self) -> &World {
        &self.world
    }
}

/// Exclusive write access to the prey count.
#[derive(Debug)]
pub struct PreyWriter {
    world: Arc<World>,
}

impl PreyWriter {
    /// Commit a new prey count.
    pub fn set(&mut self, state: PopulationState) {
        self.world.prey.store(state.count(), Ordering::Relaxed);
    }

    /// The world this writer belongs to.
    pub fn world(&self) -> &World {
        &self.world
    }
}

/// Exclusive write access to the predator count.
#[derive(Debug)]
pub struct PredatorWriter {
    world: Arc<World>,
}

impl PredatorWriter {
    /// Commit a new predator count.
    pub fn set(&mut self, state: PopulationState) {
        self.world.predator.store(state.count(), Ordering::Relaxed);
    }

    /// The world this writer belongs to.
    pub fn world(&self) -> &World {
        &self.world
    }
}

/// Exclusive write access to the clock and the weather.
#[derive(Debug)]
pub struct ClockWriter {
    world: Arc<World>,
}

impl ClockWriter {
    /// Move the calendar to `clock`.
    pub fn set_clock(&mut self, clock: SimulationClock) {
        self.world.year.store(clock.year(), Ordering::Relaxed);
        self.world.month.store(clock.month(), Ordering::Relaxed);
    }

    /// Replace the current weather.
    pub fn set_weather(&mut self, weather: WeatherSample) {
        self.world.precipitation.store(weather.precipitation());
        self.world.temperature.store(weather.temperature());
    }

    /// The world this writer belongs to.
    pub fn world(&self) -> &World {
        &self.world
    }
}
