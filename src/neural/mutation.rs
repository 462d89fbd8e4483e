//! Hill-climbing mutation operator.

use super::network::NeuralNetwork;
use crate::geometry::lerp;
use rand::Rng;

impl NeuralNetwork {
    /// Blend every bias and weight toward an independent uniform draw from
    /// [-1, 1] by `amount`.
    ///
    /// `amount = 0.0` is the identity; `amount = 1.0` replaces every
    /// parameter outright, discarding all prior learning. Draw order is
    /// fixed (per level: biases, then weights in row-major order) so a
    /// seeded RNG makes the result reproducible.
    pub fn mutate<R: Rng>(&mut self, amount: f64, rng: &mut R) {
        for level in &mut self.levels {
            for bias in level.biases.iter_mut() {
                *bias = lerp(*bias, rng.gen_range(-1.0..1.0), amount);
            }
            for weight in level.weights.iter_mut() {
                *weight = lerp(*weight, rng.gen_range(-1.0..1.0), amount);
            }
        }
    }
}
