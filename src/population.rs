//! Cohort generation and per-generation fitness bookkeeping.

use crate::car::Car;
use crate::config::Config;
use crate::neural::NeuralNetwork;
use crate::sensor::Sensor;
use rand::Rng;

/// Build a cohort of network-driven cars at the same spawn point, each with
/// an independently randomized brain. Every heading gets a small random
/// nudge so identical brains don't shadow each other perfectly.
pub fn generate_cohort<R: Rng>(config: &Config, spawn_x: f64, rng: &mut R) -> Vec<Car> {
    let topology = config.topology();
    let jitter = config.evolution.heading_jitter;

    (0..config.car.cohort_size)
        .map(|_| {
            let sensor = Sensor::new(
                config.sensor.ray_count,
                config.sensor.ray_length,
                config.sensor.ray_spread,
            );
            let brain = NeuralNetwork::new(&topology, rng);

            let mut car = Car::network_driven(
                spawn_x,
                config.car.spawn_y,
                config.car.width,
                config.car.height,
                config.car.max_speed,
                sensor,
                brain,
            );
            car.heading += rng.gen_range(-jitter..=jitter);
            car
        })
        .collect()
}

/// Number of traffic cars whose y-coordinate the car has already passed.
/// Travel is toward decreasing y, so passed means `obstacle.y > car.y`.
pub fn progress_count(car: &Car, traffic: &[Car]) -> usize {
    traffic.iter().filter(|t| car.y < t.y).count()
}

/// Per-tick stall bookkeeping for one network-driven car.
///
/// `frame_age` counts ticks since the car last passed a *new* obstacle.
/// Once it exceeds `timeout` while unpassed traffic remains, the car is
/// marked both damaged and stuck. This is what terminates a generation
/// when a car wedges itself behind traffic without a structural collision.
pub fn check_stuck(car: &mut Car, traffic: &[Car], timeout: u32) {
    let passed_now = progress_count(car, traffic);

    let Some(pilot) = car.pilot.as_mut() else {
        return;
    };
    pilot.frame_age += 1;

    if passed_now > car.max_passes {
        pilot.frame_age = 0;
        car.max_passes = passed_now;
    }

    if pilot.frame_age > timeout && !car.damaged && car.max_passes < traffic.len() {
        car.damaged = true;
        pilot.is_stuck = true;
    }
}

/// Index of the best live car: smallest y (furthest traveled) among the
/// non-stuck cars. Cars that crashed honestly stay eligible; only stall
/// timeouts disqualify. When every car is stuck the first one wins, so
/// selection never fails.
pub fn pick_best(cars: &[Car]) -> usize {
    let mut best: Option<usize> = None;

    for (idx, car) in cars.iter().enumerate() {
        if car.is_stuck() {
            continue;
        }
        match best {
            Some(current) if cars[current].y <= car.y => {}
            _ => best = Some(idx),
        }
    }

    best.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.car.cohort_size = 10;
        config
    }

    #[test]
    fn test_cohort_shares_spawn_but_not_brains() {
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cars = generate_cohort(&config, 100.0, &mut rng);

        assert_eq!(cars.len(), 10);
        for car in &cars {
            assert_eq!(car.x, 100.0);
            assert_eq!(car.y, config.car.spawn_y);
            assert!(car.heading.abs() <= config.evolution.heading_jitter);
            assert!(car.controls.is_network_driven());
        }

        // Independent draws: first two brains differ somewhere.
        let a = &cars[0].pilot.as_ref().unwrap().brain;
        let b = &cars[1].pilot.as_ref().unwrap().brain;
        let differs = a
            .levels
            .iter()
            .zip(&b.levels)
            .any(|(la, lb)| la.weights != lb.weights);
        assert!(differs);
    }

    #[test]
    fn test_progress_count() {
        let mut car = Car::traffic(0.0, 50.0, 30.0, 50.0, 2.0);
        let traffic = vec![
            Car::traffic(0.0, 100.0, 30.0, 50.0, 2.0),
            Car::traffic(0.0, 20.0, 30.0, 50.0, 2.0),
            Car::traffic(0.0, -40.0, 30.0, 50.0, 2.0),
        ];

        assert_eq!(progress_count(&car, &traffic), 1);

        car.y = -100.0;
        assert_eq!(progress_count(&car, &traffic), 3);
    }

    fn pilot_car(y: f64) -> Car {
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut car = generate_cohort(&config, 0.0, &mut rng).remove(0);
        car.y = y;
        car.heading = 0.0;
        car
    }

    #[test]
    fn test_stuck_fires_exactly_after_timeout() {
        let mut car = pilot_car(0.0);
        let traffic = vec![Car::traffic(0.0, -500.0, 30.0, 50.0, 2.0)];

        for tick in 1..=601 {
            check_stuck(&mut car, &traffic, 600);
            if tick <= 600 {
                assert!(!car.damaged, "not stuck yet at tick {}", tick);
            }
        }

        assert!(car.damaged);
        assert!(car.is_stuck());
    }

    #[test]
    fn test_new_progress_resets_the_clock() {
        let mut car = pilot_car(0.0);
        let traffic = vec![
            Car::traffic(0.0, -200.0, 30.0, 50.0, 2.0),
            Car::traffic(0.0, -500.0, 30.0, 50.0, 2.0),
        ];

        for _ in 0..500 {
            check_stuck(&mut car, &traffic, 600);
        }

        // Pass the first obstacle just before the timeout.
        car.y = -250.0;
        for _ in 0..600 {
            check_stuck(&mut car, &traffic, 600);
        }
        assert!(!car.damaged, "progress reset the stall timer");

        check_stuck(&mut car, &traffic, 600);
        assert!(!car.damaged, "timer sits exactly at the timeout");
        check_stuck(&mut car, &traffic, 600);
        assert!(car.damaged && car.is_stuck());
    }

    #[test]
    fn test_no_stall_once_all_traffic_passed() {
        let mut car = pilot_car(-1000.0);
        let traffic = vec![Car::traffic(0.0, -500.0, 30.0, 50.0, 2.0)];
        car.max_passes = progress_count(&car, &traffic);

        for _ in 0..2000 {
            check_stuck(&mut car, &traffic, 600);
        }

        assert!(!car.damaged);
    }

    #[test]
    fn test_pick_best_prefers_furthest_non_stuck() {
        let mut cars: Vec<Car> = (0..4).map(|i| pilot_car(-100.0 * i as f64)).collect();

        // The furthest car is stuck; second-furthest should win.
        cars[3].damaged = true;
        cars[3].pilot.as_mut().unwrap().is_stuck = true;

        assert_eq!(pick_best(&cars), 2);
    }

    #[test]
    fn test_pick_best_ignores_relative_y_when_one_survives() {
        let mut cars: Vec<Car> = (0..3).map(|i| pilot_car(-100.0 * i as f64)).collect();
        for idx in [1, 2] {
            cars[idx].damaged = true;
            cars[idx].pilot.as_mut().unwrap().is_stuck = true;
        }

        assert_eq!(pick_best(&cars), 0);
    }

    #[test]
    fn test_pick_best_all_stuck_falls_back_to_first() {
        let mut cars: Vec<Car> = (0..3).map(|i| pilot_car(-100.0 * i as f64)).collect();
        for car in &mut cars {
            car.damaged = true;
            car.pilot.as_mut().unwrap().is_stuck = true;
        }

        assert_eq!(pick_best(&cars), 0);
    }

    #[test]
    fn test_damaged_but_not_stuck_stays_eligible() {
        let mut cars: Vec<Car> = (0..2).map(|i| pilot_car(-100.0 * i as f64)).collect();
        cars[1].damaged = true; // crashed, not stuck

        assert_eq!(pick_best(&cars), 1);
    }
}
