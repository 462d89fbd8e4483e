//! Statistics tracking for the simulation.

use crate::car::Car;
use serde::{Deserialize, Serialize};

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Current simulation time (ticks)
    pub time: u64,
    /// Completed generations
    pub generation: u32,
    /// Cohort size
    pub cohort: usize,
    /// Cars damaged so far this generation (collisions and stalls)
    pub damaged: usize,
    /// Cars flagged stuck by the stall timeout
    pub stuck: usize,
    /// y-coordinate of the current best car (smaller is further)
    pub best_y: f64,
    /// Obstacles passed by the current best car
    pub best_passes: usize,
    /// Total traffic cars to pass
    pub traffic: usize,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from the current cohort state.
    pub fn update(&mut self, cars: &[Car], best_index: usize, traffic_count: usize) {
        self.cohort = cars.len();
        self.damaged = cars.iter().filter(|c| c.damaged).count();
        self.stuck = cars.iter().filter(|c| c.is_stuck()).count();
        self.traffic = traffic_count;

        if let Some(best) = cars.get(best_index) {
            self.best_y = best.y;
            self.best_passes = best.max_passes;
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Gen:{:3} | Best y:{:8.1} | Passed:{:2}/{:2} | Damaged:{:3}/{:3} (stuck {:3})",
            self.time,
            self.generation,
            self.best_y,
            self.best_passes,
            self.traffic,
            self.damaged,
            self.cohort,
            self.stuck,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval (ticks)
    pub interval: u64,
}

impl StatsHistory {
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Best-car progress over time
    pub fn best_y_series(&self) -> Vec<(u64, f64)> {
        self.snapshots.iter().map(|s| (s.time, s.best_y)).collect()
    }

    /// Generation count over time
    pub fn generation_series(&self) -> Vec<(u64, u32)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.generation))
            .collect()
    }

    /// Save history to a JSON file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_update() {
        let mut cars = vec![
            Car::traffic(0.0, -300.0, 30.0, 50.0, 2.0),
            Car::traffic(0.0, -100.0, 30.0, 50.0, 2.0),
        ];
        cars[1].damaged = true;
        cars[0].max_passes = 4;

        let mut stats = Stats::new();
        stats.update(&cars, 0, 35);

        assert_eq!(stats.cohort, 2);
        assert_eq!(stats.damaged, 1);
        assert_eq!(stats.stuck, 0);
        assert_eq!(stats.best_y, -300.0);
        assert_eq!(stats.best_passes, 4);
    }

    #[test]
    fn test_stats_history_series() {
        let mut history = StatsHistory::new(10);

        for i in 0..5u64 {
            let mut stats = Stats::new();
            stats.time = i * 10;
            stats.best_y = -(i as f64) * 100.0;
            history.record(stats);
        }

        let series = history.best_y_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (0, 0.0));
        assert_eq!(series[4], (40, -400.0));
    }
}
