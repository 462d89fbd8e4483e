//! Configuration for the simulator.
//!
//! YAML configuration files with sensible defaults; the defaults reproduce
//! the reference scenario (250-car cohort, 35 traffic cars, 3-lane road).

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of network outputs; they map positionally to
/// forward / left / right / reverse.
pub const CONTROL_OUTPUTS: usize = 4;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub road: RoadConfig,
    pub car: CarConfig,
    pub sensor: SensorConfig,
    pub neural: NeuralConfig,
    pub traffic: TrafficConfig,
    pub evolution: EvolutionConfig,
    pub logging: LoggingConfig,
}

/// Road layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadConfig {
    /// Center x of the road
    pub center_x: f64,
    /// Total road width
    pub width: f64,
    /// Number of lanes
    pub lane_count: usize,
}

/// Cohort car parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarConfig {
    /// Cars per generation
    pub cohort_size: usize,
    /// Footprint width
    pub width: f64,
    /// Footprint height
    pub height: f64,
    /// Forward speed cap
    pub max_speed: f64,
    /// Lane the cohort spawns in
    pub spawn_lane: usize,
    /// Spawn y-coordinate
    pub spawn_y: f64,
}

/// Ray sensor parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Rays per fan
    pub ray_count: usize,
    /// Ray length in world units
    pub ray_length: f64,
    /// Angular spread of the fan (radians)
    pub ray_spread: f64,
}

/// Network topology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralConfig {
    /// Hidden layer sizes between the sensor inputs and the four control
    /// outputs
    pub hidden_sizes: Vec<usize>,
}

/// Obstacle traffic parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    /// Number of traffic cars per generation
    pub count: usize,
    /// Traffic speed cap (slower than the cohort, so they can be passed)
    pub max_speed: f64,
    /// Vertical gap between consecutive traffic cars
    pub spacing: f64,
    /// y of the nearest traffic car at spawn
    pub start_y: f64,
}

/// Evolution / fitness parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Mutation blend amount applied to every reseeded brain
    pub mutation_amount: f64,
    /// Ticks without new progress before a car counts as stuck
    pub stuck_timeout: u32,
    /// Max random heading nudge at spawn (radians)
    pub heading_jitter: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Ticks between stats lines
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            road: RoadConfig::default(),
            car: CarConfig::default(),
            sensor: SensorConfig::default(),
            neural: NeuralConfig::default(),
            traffic: TrafficConfig::default(),
            evolution: EvolutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            center_x: 100.0,
            width: 180.0,
            lane_count: 3,
        }
    }
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            cohort_size: 250,
            width: 30.0,
            height: 50.0,
            max_speed: 3.0,
            spawn_lane: 1,
            spawn_y: 100.0,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ray_count: crate::sensor::DEFAULT_RAY_COUNT,
            ray_length: crate::sensor::DEFAULT_RAY_LENGTH,
            ray_spread: crate::sensor::DEFAULT_RAY_SPREAD,
        }
    }
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![6],
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            count: 35,
            max_speed: 2.0,
            spacing: 150.0,
            start_y: -100.0,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_amount: 0.25,
            stuck_timeout: 600,
            heading_jitter: 0.01,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 60,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Full network topology: sensor rays in, control flags out.
    pub fn topology(&self) -> Vec<usize> {
        let mut sizes = vec![self.sensor.ray_count];
        sizes.extend(&self.neural.hidden_sizes);
        sizes.push(CONTROL_OUTPUTS);
        sizes
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.road.lane_count == 0 {
            return Err("lane_count must be > 0".to_string());
        }
        if self.road.width <= 0.0 {
            return Err("road width must be positive".to_string());
        }
        if self.car.cohort_size == 0 {
            return Err("cohort_size must be > 0".to_string());
        }
        if self.car.max_speed <= 0.0 {
            return Err("car max_speed must be positive".to_string());
        }
        if self.sensor.ray_count == 0 {
            return Err("ray_count must be > 0".to_string());
        }
        if self.neural.hidden_sizes.iter().any(|&s| s == 0) {
            return Err("hidden layer sizes must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.evolution.mutation_amount) {
            return Err("mutation_amount must lie in [0, 1]".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_topology() {
        let config = Config::default();
        assert_eq!(config.topology(), vec![5, 6, 4]);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.car.cohort_size, loaded.car.cohort_size);
        assert_eq!(config.topology(), loaded.topology());
    }

    #[test]
    fn test_validation_rejects_bad_mutation_amount() {
        let mut config = Config::default();
        config.evolution.mutation_amount = 1.5;
        assert!(config.validate().is_err());
    }
}
