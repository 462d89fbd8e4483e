//! Car kinematics, bounding polygon and collision (damage) state.

use crate::controls::{ControlFlags, Controls};
use crate::geometry::{polygons_intersect, Point, Segment};
use crate::neural::NeuralNetwork;
use crate::sensor::Sensor;

/// Speed gained per tick while the forward flag is held.
pub const DEFAULT_ACCELERATION: f64 = 0.2;
/// Speed bled off per tick toward zero.
pub const DEFAULT_FRICTION: f64 = 0.05;
/// Heading change per tick while steering.
pub const DEFAULT_STEER_RATE: f64 = 0.03;

/// Sensor, brain and liveness bookkeeping for a network-driven car.
#[derive(Clone, Debug)]
pub struct Pilot {
    pub sensor: Sensor,
    pub brain: NeuralNetwork,
    /// Ticks since the last new-progress event.
    pub frame_age: u32,
    /// Set when the stall timeout fires; stuck cars are also damaged.
    pub is_stuck: bool,
}

impl Pilot {
    pub fn new(sensor: Sensor, brain: NeuralNetwork) -> Self {
        Self {
            sensor,
            brain,
            frame_age: 0,
            is_stuck: false,
        }
    }
}

/// A kinematic agent on the road. Heading 0 faces decreasing y; positive
/// speed moves the car that way.
#[derive(Clone, Debug)]
pub struct Car {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    pub speed: f64,
    pub acceleration: f64,
    pub max_speed: f64,
    pub friction: f64,
    pub steer_rate: f64,
    pub heading: f64,

    /// Set once on collision or stall timeout; never cleared.
    pub damaged: bool,
    /// Highest obstacle-passed count ever observed for this car.
    pub max_passes: usize,

    /// Footprint derived from position/heading/dimensions each tick.
    pub polygon: [Point; 4],

    pub controls: Controls,
    pub pilot: Option<Pilot>,
}

impl Car {
    fn build(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        max_speed: f64,
        controls: Controls,
        pilot: Option<Pilot>,
    ) -> Self {
        let mut car = Self {
            x,
            y,
            width,
            height,
            speed: 0.0,
            acceleration: DEFAULT_ACCELERATION,
            max_speed,
            friction: DEFAULT_FRICTION,
            steer_rate: DEFAULT_STEER_RATE,
            heading: 0.0,
            damaged: false,
            max_passes: 0,
            polygon: [Point::default(); 4],
            controls,
            pilot,
        };
        car.polygon = car.bounding_polygon();
        car
    }

    /// A car steered by external input flags.
    pub fn human(x: f64, y: f64, width: f64, height: f64, max_speed: f64) -> Self {
        Self::build(
            x,
            y,
            width,
            height,
            max_speed,
            Controls::Human(ControlFlags::default()),
            None,
        )
    }

    /// An obstacle traffic car: forward forever, no sensor, no brain.
    pub fn traffic(x: f64, y: f64, width: f64, height: f64, max_speed: f64) -> Self {
        Self::build(x, y, width, height, max_speed, Controls::FixedForward, None)
    }

    /// A car driven by its own network via its own sensor.
    pub fn network_driven(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        max_speed: f64,
        sensor: Sensor,
        brain: NeuralNetwork,
    ) -> Self {
        Self::build(
            x,
            y,
            width,
            height,
            max_speed,
            Controls::NetworkDriven(ControlFlags::default()),
            Some(Pilot::new(sensor, brain)),
        )
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_stuck(&self) -> bool {
        self.pilot.as_ref().map_or(false, |p| p.is_stuck)
    }

    /// One simulation tick.
    ///
    /// A damaged car is frozen: no motion, no further damage checks. The
    /// sensor and network still run afterwards; the flags they set are
    /// simply never consumed again.
    pub fn update(&mut self, borders: &[Segment], obstacles: &[[Point; 4]]) {
        if !self.damaged {
            self.apply_motion();
            self.polygon = self.bounding_polygon();
            self.damaged = self.assess_damage(borders, obstacles);
        }

        if let Some(pilot) = &mut self.pilot {
            pilot
                .sensor
                .update(Point::new(self.x, self.y), self.heading, borders, obstacles);

            let outputs = pilot.brain.feed_forward(&pilot.sensor.perception());
            self.controls.set_flags(ControlFlags {
                forward: outputs[0] > 0.5,
                left: outputs[1] > 0.5,
                right: outputs[2] > 0.5,
                reverse: outputs[3] > 0.5,
            });
        }
    }

    fn apply_motion(&mut self) {
        let flags = self.controls.flags();

        if flags.forward {
            self.speed += self.acceleration;
        }
        if flags.reverse {
            self.speed -= self.acceleration;
        }

        // Reverse is capped at half the forward maximum.
        self.speed = self.speed.clamp(-self.max_speed / 2.0, self.max_speed);

        if self.speed > 0.0 {
            self.speed -= self.friction;
        } else if self.speed < 0.0 {
            self.speed += self.friction;
        }
        // Snap to rest instead of drifting forever on residual speed.
        if self.speed.abs() < self.friction {
            self.speed = 0.0;
        }

        if self.speed != 0.0 {
            // Steering mirrors when rolling backwards.
            let flip = if self.speed > 0.0 { 1.0 } else { -1.0 };
            if flags.left {
                self.heading += self.steer_rate * flip;
            }
            if flags.right {
                self.heading -= self.steer_rate * flip;
            }
        }

        self.x -= self.heading.sin() * self.speed;
        self.y -= self.heading.cos() * self.speed;
    }

    /// The footprint: a width x height rectangle rotated about the car's
    /// center by its heading.
    fn bounding_polygon(&self) -> [Point; 4] {
        let rad = self.width.hypot(self.height) / 2.0;
        let alpha = self.width.atan2(self.height);

        let corner = |angle: f64| {
            Point::new(
                self.x - angle.sin() * rad,
                self.y - angle.cos() * rad,
            )
        };

        [
            corner(self.heading - alpha),
            corner(self.heading + alpha),
            corner(std::f64::consts::PI + self.heading - alpha),
            corner(std::f64::consts::PI + self.heading + alpha),
        ]
    }

    fn assess_damage(&self, borders: &[Segment], obstacles: &[[Point; 4]]) -> bool {
        for border in borders {
            if polygons_intersect(&self.polygon, border) {
                return true;
            }
        }
        for polygon in obstacles {
            if polygons_intersect(&self.polygon, polygon) {
                return true;
            }
        }
        false
    }
}
