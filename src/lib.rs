//! # neurodrive
//!
//! Lane-driving simulator where a population of sensor-equipped cars learns
//! to weave through traffic by hill-climbing neuroevolution.
//!
//! ## How it learns
//!
//! Each car carries a tiny feedforward network with hard-threshold neurons.
//! There is no gradient anywhere: when every car in a generation has crashed
//! or stalled, the furthest-traveled brain is kept verbatim for one elite
//! car and blended toward fresh random draws for the rest.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use neurodrive::{Config, World};
//!
//! let config = Config::default();
//! let mut world = World::new_with_seed(config, 42);
//!
//! world.run(10_000);
//!
//! println!("generations: {}", world.generation);
//! println!("best y: {:.1}", world.best_car().y);
//! ```
//!
//! ## Persistence
//!
//! ```rust,no_run
//! use neurodrive::snapshot::BrainStore;
//! use neurodrive::{Config, World};
//!
//! let store = BrainStore::new("best_brain.json");
//! let mut world = match store.load().ok().flatten() {
//!     Some(snapshot) => World::new_with_brain(Config::default(), 42, snapshot).unwrap(),
//!     None => World::new_with_seed(Config::default(), 42),
//! };
//! world.run(10_000);
//! if let Some(best) = world.best_snapshot() {
//!     store.save(&best).unwrap();
//! }
//! ```

pub mod car;
pub mod config;
pub mod controls;
pub mod geometry;
pub mod neural;
pub mod population;
pub mod road;
pub mod sensor;
pub mod snapshot;
pub mod stats;
pub mod world;

// Re-export main types
pub use car::Car;
pub use config::Config;
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(ticks: u64, cohort: usize) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    config.car.cohort_size = cohort;

    let mut world = World::new_with_seed(config, 42);

    let start = Instant::now();
    world.run(ticks);
    let elapsed = start.elapsed();

    BenchmarkResult {
        ticks,
        cohort,
        generations: world.generation,
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64(),
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub cohort: usize,
    pub generations: u32,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Cohort: {}", self.cohort)?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        Ok(())
    }
}
