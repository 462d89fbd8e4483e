//! Ray sensor: a fixed fan of rays reporting the nearest obstruction.

use crate::geometry::{intersect, lerp, Intersection, Point, Segment};

/// Default number of rays in the fan.
pub const DEFAULT_RAY_COUNT: usize = 5;
/// Default ray length in world units.
pub const DEFAULT_RAY_LENGTH: f64 = 150.0;
/// Default angular spread of the fan (90 degrees centered on the heading).
pub const DEFAULT_RAY_SPREAD: f64 = std::f64::consts::FRAC_PI_2;

/// A fan of rays cast from a car's position along its heading.
///
/// After [`Sensor::update`], `rays[i]` holds the cast segment and
/// `readings[i]` the nearest intersection along it, if any.
#[derive(Clone, Debug)]
pub struct Sensor {
    pub ray_count: usize,
    pub ray_length: f64,
    pub ray_spread: f64,
    pub rays: Vec<Segment>,
    pub readings: Vec<Option<Intersection>>,
}

impl Default for Sensor {
    fn default() -> Self {
        Self::new(DEFAULT_RAY_COUNT, DEFAULT_RAY_LENGTH, DEFAULT_RAY_SPREAD)
    }
}

impl Sensor {
    pub fn new(ray_count: usize, ray_length: f64, ray_spread: f64) -> Self {
        assert!(ray_count > 0, "sensor needs at least one ray");
        Self {
            ray_count,
            ray_length,
            ray_spread,
            rays: Vec::with_capacity(ray_count),
            readings: Vec::with_capacity(ray_count),
        }
    }

    /// Recast all rays from the given pose and refresh the readings against
    /// the road borders and every obstacle footprint.
    pub fn update(
        &mut self,
        position: Point,
        heading: f64,
        borders: &[Segment],
        obstacles: &[[Point; 4]],
    ) {
        self.cast_rays(position, heading);
        self.readings.clear();
        for i in 0..self.rays.len() {
            let ray = self.rays[i];
            self.readings.push(Self::read(ray, borders, obstacles));
        }
    }

    /// Normalized perception vector for the network: 0.0 where a ray sees
    /// nothing, otherwise `1.0 - offset` so closer obstructions read higher.
    pub fn perception(&self) -> Vec<f64> {
        self.readings
            .iter()
            .map(|reading| match reading {
                Some(touch) => 1.0 - touch.offset,
                None => 0.0,
            })
            .collect()
    }

    fn cast_rays(&mut self, position: Point, heading: f64) {
        self.rays.clear();
        for i in 0..self.ray_count {
            // Spread the fan evenly; a single ray points straight along
            // the heading (the i/(count-1) division is undefined there).
            let t = if self.ray_count == 1 {
                0.5
            } else {
                i as f64 / (self.ray_count - 1) as f64
            };
            let angle = lerp(self.ray_spread / 2.0, -self.ray_spread / 2.0, t) + heading;

            let end = Point::new(
                position.x - angle.sin() * self.ray_length,
                position.y - angle.cos() * self.ray_length,
            );
            self.rays.push([position, end]);
        }
    }

    /// Nearest intersection along one ray, across every border segment and
    /// every edge of every obstacle polygon.
    fn read(ray: Segment, borders: &[Segment], obstacles: &[[Point; 4]]) -> Option<Intersection> {
        let mut nearest: Option<Intersection> = None;

        let mut consider = |touch: Option<Intersection>| {
            if let Some(touch) = touch {
                match nearest {
                    Some(best) if best.offset <= touch.offset => {}
                    _ => nearest = Some(touch),
                }
            }
        };

        for border in borders {
            consider(intersect(ray[0], ray[1], border[0], border[1]));
        }

        for polygon in obstacles {
            for j in 0..polygon.len() {
                consider(intersect(
                    ray[0],
                    ray[1],
                    polygon[j],
                    polygon[(j + 1) % polygon.len()],
                ));
            }
        }

        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn far_borders() -> Vec<Segment> {
        vec![
            [Point::new(-1000.0, -1e6), Point::new(-1000.0, 1e6)],
            [Point::new(1000.0, -1e6), Point::new(1000.0, 1e6)],
        ]
    }

    fn obstacle_square(cx: f64, cy: f64, half: f64) -> [Point; 4] {
        [
            Point::new(cx - half, cy - half),
            Point::new(cx + half, cy - half),
            Point::new(cx + half, cy + half),
            Point::new(cx - half, cy + half),
        ]
    }

    #[test]
    fn test_ray_fan_geometry() {
        let mut sensor = Sensor::default();
        sensor.update(Point::new(0.0, 0.0), 0.0, &[], &[]);

        assert_eq!(sensor.rays.len(), 5);
        // Heading 0 points toward decreasing y; the middle ray is straight.
        let middle = sensor.rays[2];
        assert!(middle[1].x.abs() < 1e-9);
        assert!((middle[1].y + DEFAULT_RAY_LENGTH).abs() < 1e-9);
    }

    #[test]
    fn test_single_ray_points_along_heading() {
        let mut sensor = Sensor::new(1, 100.0, DEFAULT_RAY_SPREAD);
        let heading = 0.4;
        sensor.update(Point::new(0.0, 0.0), heading, &[], &[]);

        assert_eq!(sensor.rays.len(), 1);
        let end = sensor.rays[0][1];
        assert!((end.x + heading.sin() * 100.0).abs() < 1e-9);
        assert!((end.y + heading.cos() * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_road_reads_nothing() {
        let mut sensor = Sensor::default();
        sensor.update(Point::new(0.0, 0.0), 0.0, &far_borders(), &[]);

        assert!(sensor.readings.iter().all(Option::is_none));
        assert!(sensor.perception().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_obstacle_ahead_is_detected() {
        let mut sensor = Sensor::default();
        let obstacle = obstacle_square(0.0, -75.0, 10.0);
        sensor.update(Point::new(0.0, 0.0), 0.0, &far_borders(), &[obstacle]);

        // The straight-ahead ray hits the near edge at y = -65.
        let reading = sensor.readings[2].expect("middle ray hits the obstacle");
        assert!((reading.offset - 65.0 / DEFAULT_RAY_LENGTH).abs() < 1e-9);

        let perception = sensor.perception();
        assert!(perception[2] > 0.0);
    }

    #[test]
    fn test_nearest_of_two_obstacles_wins() {
        let mut sensor = Sensor::default();
        let near = obstacle_square(0.0, -50.0, 10.0);
        let far = obstacle_square(0.0, -120.0, 10.0);
        sensor.update(Point::new(0.0, 0.0), 0.0, &[], &[far, near]);

        let reading = sensor.readings[2].expect("middle ray hits");
        assert!((reading.offset - 40.0 / DEFAULT_RAY_LENGTH).abs() < 1e-9);
    }

    #[test]
    fn test_closer_obstacle_reads_higher() {
        let mut sensor = Sensor::default();

        sensor.update(
            Point::new(0.0, 0.0),
            0.0,
            &[],
            &[obstacle_square(0.0, -120.0, 10.0)],
        );
        let far_value = sensor.perception()[2];

        sensor.update(
            Point::new(0.0, 0.0),
            0.0,
            &[],
            &[obstacle_square(0.0, -40.0, 10.0)],
        );
        let near_value = sensor.perception()[2];

        assert!(near_value > far_value);
    }
}
