//! Simulation driver: owns the cohort, the traffic and the generation loop.

use crate::car::Car;
use crate::config::Config;
use crate::geometry::Point;
use crate::neural::NeuralNetwork;
use crate::population::{check_stuck, generate_cohort, pick_best};
use crate::road::Road;
use crate::snapshot::{NetworkSnapshot, SnapshotError};
use crate::stats::{Stats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// The simulation world.
///
/// One tick runs a fixed phase order: stall bookkeeping, generation
/// turnover when every car is damaged, traffic advance, cohort advance,
/// best-car selection. Obstacle positions are frozen before any cohort car
/// moves, so cars never observe each other mid-tick.
pub struct World {
    // Population
    pub cars: Vec<Car>,
    pub traffic: Vec<Car>,

    // Environment
    pub road: Road,

    // State
    pub time: u64,
    pub generation: u32,
    pub best_index: usize,

    // Configuration
    pub config: Config,

    // Statistics
    pub stats: Stats,
    pub stats_history: StatsHistory,

    // Brain every new generation is reseeded from (the previous best)
    seed_brain: Option<NeuralNetwork>,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let road = Road::new(config.road.center_x, config.road.width, config.road.lane_count);

        let spawn_x = road.lane_center(config.car.spawn_lane);
        let cars = generate_cohort(&config, spawn_x, &mut rng);
        let traffic = Self::spawn_traffic(&config, &road);

        let mut world = Self {
            cars,
            traffic,
            road,
            time: 0,
            generation: 0,
            best_index: 0,
            stats: Stats::new(),
            stats_history: StatsHistory::new(config.logging.stats_interval),
            seed_brain: None,
            config,
            rng,
            seed,
        };
        world.update_stats();
        world
    }

    /// Create a world whose cohort is seeded from a persisted brain: car 0
    /// drives the snapshot verbatim, every other car a mutated copy.
    ///
    /// Fails when the snapshot's shapes contradict the configured topology.
    pub fn new_with_brain(
        config: Config,
        seed: u64,
        snapshot: NetworkSnapshot,
    ) -> Result<Self, SnapshotError> {
        let brain = snapshot.into_network(&config.topology())?;
        let mut world = Self::new_with_seed(config, seed);
        world.seed_brain = Some(brain);
        world.reseed_cohort();
        Ok(world)
    }

    fn spawn_traffic(config: &Config, road: &Road) -> Vec<Car> {
        (0..config.traffic.count)
            .map(|i| {
                let lane = i % config.road.lane_count;
                Car::traffic(
                    road.lane_center(lane),
                    config.traffic.start_y - config.traffic.spacing * i as f64,
                    config.car.width,
                    config.car.height,
                    config.traffic.max_speed,
                )
            })
            .collect()
    }

    /// Main simulation tick
    pub fn step(&mut self) {
        // Phase 1: stall bookkeeping
        let timeout = self.config.evolution.stuck_timeout;
        for car in &mut self.cars {
            check_stuck(car, &self.traffic, timeout);
        }

        // Phase 2: generation turnover once the whole cohort is out
        if self.all_damaged() {
            self.next_generation();
        }

        // Phase 3: advance traffic (borders only; traffic ignores traffic)
        let borders = *self.road.borders();
        for car in &mut self.traffic {
            car.update(&borders, &[]);
        }

        // Phase 4: advance the cohort against this tick's frozen obstacle
        // footprints. Cars only touch their own state, so the order is
        // immaterial and the pass parallelizes cleanly.
        let obstacles: Vec<[Point; 4]> = self.traffic.iter().map(|t| t.polygon).collect();
        self.cars
            .par_iter_mut()
            .for_each(|car| car.update(&borders, &obstacles));

        // Phase 5: best-car selection and statistics
        self.best_index = pick_best(&self.cars);
        self.time += 1;
        self.update_stats();
    }

    /// Persist-worthy snapshot of the current best car's brain.
    pub fn best_snapshot(&self) -> Option<NetworkSnapshot> {
        self.best_car()
            .pilot
            .as_ref()
            .map(|pilot| NetworkSnapshot::from_network(&pilot.brain))
    }

    pub fn best_car(&self) -> &Car {
        &self.cars[self.best_index]
    }

    /// True when every cohort car is damaged (crash or stall).
    pub fn all_damaged(&self) -> bool {
        self.cars.iter().all(|c| c.damaged)
    }

    /// True when the best car has passed every traffic car.
    pub fn course_cleared(&self) -> bool {
        self.best_car().max_passes >= self.traffic.len()
    }

    /// End the generation: keep the best brain as next generation's seed,
    /// rebuild cohort and traffic.
    fn next_generation(&mut self) {
        self.best_index = pick_best(&self.cars);
        if let Some(pilot) = self.best_car().pilot.as_ref() {
            self.seed_brain = Some(pilot.brain.clone());
        }

        log::info!(
            "generation {} over: best reached y {:.1} with {}/{} passed",
            self.generation,
            self.best_car().y,
            self.best_car().max_passes,
            self.traffic.len()
        );
        if self.course_cleared() {
            log::info!("generation {} cleared the whole course", self.generation);
        }

        self.generation += 1;

        let spawn_x = self.road.lane_center(self.config.car.spawn_lane);
        self.cars = generate_cohort(&self.config, spawn_x, &mut self.rng);
        self.reseed_cohort();
        self.traffic = Self::spawn_traffic(&self.config, &self.road);
        self.best_index = 0;
    }

    /// Overwrite every cohort brain from the seed brain; car 0 keeps it
    /// verbatim so learning never regresses below the best seen so far.
    fn reseed_cohort(&mut self) {
        let Some(seed_brain) = self.seed_brain.clone() else {
            return;
        };
        let amount = self.config.evolution.mutation_amount;

        for (i, car) in self.cars.iter_mut().enumerate() {
            if let Some(pilot) = car.pilot.as_mut() {
                let mut brain = seed_brain.clone();
                if i != 0 {
                    brain.mutate(amount, &mut self.rng);
                }
                pilot.brain = brain;
            }
        }
    }

    fn update_stats(&mut self) {
        self.stats.time = self.time;
        self.stats.generation = self.generation;
        self.stats.update(&self.cars, self.best_index, self.traffic.len());

        if self.time % self.config.logging.stats_interval == 0 {
            self.stats_history.record(self.stats.clone());
        }
    }

    /// Run simulation for specified number of ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Run until `generations` generations have completed, with a tick cap
    /// as a safety net.
    pub fn run_generations(&mut self, generations: u32, max_ticks: u64) {
        let target = self.generation + generations;
        for _ in 0..max_ticks {
            if self.generation >= target {
                break;
            }
            self.step();
        }
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.car.cohort_size = 20;
        config.traffic.count = 5;
        config
    }

    #[test]
    fn test_world_creation() {
        let config = test_config();
        let world = World::new_with_seed(config.clone(), 1);

        assert_eq!(world.cars.len(), config.car.cohort_size);
        assert_eq!(world.traffic.len(), config.traffic.count);
        assert_eq!(world.time, 0);
        assert_eq!(world.generation, 0);
    }

    #[test]
    fn test_traffic_layout() {
        let config = test_config();
        let world = World::new_with_seed(config.clone(), 1);

        for (i, car) in world.traffic.iter().enumerate() {
            let expected_y = config.traffic.start_y - config.traffic.spacing * i as f64;
            assert_eq!(car.y, expected_y);
            assert_eq!(
                car.x,
                world.road.lane_center(i % config.road.lane_count)
            );
        }
    }

    #[test]
    fn test_step_advances_time_and_traffic() {
        let config = test_config();
        let mut world = World::new_with_seed(config, 2);

        let traffic_y0: Vec<f64> = world.traffic.iter().map(|t| t.y).collect();
        world.run(10);

        assert_eq!(world.time, 10);
        for (car, y0) in world.traffic.iter().zip(traffic_y0) {
            assert!(car.y < y0, "traffic rolls forward");
        }
    }

    #[test]
    fn test_reproducibility_bit_for_bit() {
        let config = test_config();
        let mut a = World::new_with_seed(config.clone(), 42);
        let mut b = World::new_with_seed(config, 42);

        a.run(300);
        b.run(300);

        assert_eq!(a.generation, b.generation);
        for (ca, cb) in a.cars.iter().zip(&b.cars) {
            assert_eq!(ca.x, cb.x);
            assert_eq!(ca.y, cb.y);
            assert_eq!(ca.damaged, cb.damaged);
        }
    }

    #[test]
    fn test_generation_turnover_on_total_damage() {
        let config = test_config();
        let mut world = World::new_with_seed(config, 3);

        for car in &mut world.cars {
            car.damaged = true;
        }
        world.step();

        assert_eq!(world.generation, 1);
        assert!(world.seed_brain.is_some());
        // Fresh cohort is alive again.
        assert!(world.cars.iter().any(|c| !c.damaged));
    }

    #[test]
    fn test_reseeded_cohort_keeps_best_verbatim() {
        let config = test_config();
        let mut world = World::new_with_seed(config, 4);

        let best_brain = world.cars[world.best_index]
            .pilot
            .as_ref()
            .unwrap()
            .brain
            .clone();
        for car in &mut world.cars {
            car.damaged = true;
        }
        world.step();

        let elite = &world.cars[0].pilot.as_ref().unwrap().brain;
        for (a, b) in best_brain.levels.iter().zip(&elite.levels) {
            assert_eq!(a.weights, b.weights);
            assert_eq!(a.biases, b.biases);
        }

        // And at least one sibling differs.
        let sibling = &world.cars[1].pilot.as_ref().unwrap().brain;
        let differs = best_brain
            .levels
            .iter()
            .zip(&sibling.levels)
            .any(|(a, b)| a.weights != b.weights);
        assert!(differs);
    }

    #[test]
    fn test_seeding_from_snapshot() {
        let config = test_config();
        let donor = World::new_with_seed(config.clone(), 5);
        let snapshot = donor.best_snapshot().unwrap();

        let world = World::new_with_brain(config, 6, snapshot.clone()).unwrap();

        let elite = &world.cars[0].pilot.as_ref().unwrap().brain;
        let expected = snapshot.into_network(&world.config.topology()).unwrap();
        for (a, b) in expected.levels.iter().zip(&elite.levels) {
            assert_eq!(a.weights, b.weights);
        }
    }

    #[test]
    fn test_seeding_rejects_mismatched_snapshot() {
        let mut other = test_config();
        other.sensor.ray_count = 7;
        let donor = World::new_with_seed(other, 7);
        let snapshot = donor.best_snapshot().unwrap();

        let result = World::new_with_brain(test_config(), 8, snapshot);
        assert!(result.is_err());
    }
}
