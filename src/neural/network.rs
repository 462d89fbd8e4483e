//! Network structure and forward propagation.

use ndarray::{Array1, Array2};
use rand::Rng;

/// A single learnable layer: a weight matrix of shape
/// `[input_count, output_count]` and one bias per output neuron.
///
/// Every parameter lies in [-1, 1] immediately after construction and stays
/// there across mutation, since mutation only interpolates toward in-range
/// targets.
#[derive(Clone, Debug)]
pub struct Level {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
}

impl Level {
    /// Create a level with every weight and bias drawn uniformly from [-1, 1].
    pub fn random<R: Rng>(input_count: usize, output_count: usize, rng: &mut R) -> Self {
        let weights =
            Array2::from_shape_fn((input_count, output_count), |_| rng.gen_range(-1.0..1.0));
        let biases = Array1::from_shape_fn(output_count, |_| rng.gen_range(-1.0..1.0));
        Self { weights, biases }
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.weights.nrows()
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.weights.ncols()
    }

    /// Forward pass: an output neuron fires (1.0) when its weighted input
    /// sum exceeds its bias, otherwise stays off (0.0). The hard threshold
    /// is deliberate; there is no smooth activation anywhere.
    fn feed_forward(&self, inputs: &Array1<f64>) -> Array1<f64> {
        let sums = inputs.dot(&self.weights);
        let mut outputs = Array1::zeros(self.output_count());
        for (i, out) in outputs.iter_mut().enumerate() {
            *out = if sums[i] > self.biases[i] { 1.0 } else { 0.0 };
        }
        outputs
    }
}

/// A feedforward network: levels chained so that each level's outputs are
/// the next level's inputs. Topology is fixed at construction; only weights
/// and biases change afterwards.
#[derive(Clone, Debug)]
pub struct NeuralNetwork {
    pub levels: Vec<Level>,
}

impl NeuralNetwork {
    /// Build a network from a topology vector (layer sizes, length >= 2),
    /// one level per adjacent pair, all parameters independently randomized.
    pub fn new<R: Rng>(topology: &[usize], rng: &mut R) -> Self {
        assert!(
            topology.len() >= 2,
            "network topology needs at least an input and an output layer"
        );

        let levels = topology
            .windows(2)
            .map(|pair| Level::random(pair[0], pair[1], rng))
            .collect();

        Self { levels }
    }

    /// Feed `inputs` through every level in order.
    ///
    /// Panics if `inputs` does not match the first level's input count;
    /// that is a contract violation, not a recoverable condition.
    pub fn feed_forward(&self, inputs: &[f64]) -> Vec<f64> {
        assert_eq!(
            inputs.len(),
            self.input_count(),
            "network fed {} inputs but expects {}",
            inputs.len(),
            self.input_count()
        );

        let mut activation = Array1::from_vec(inputs.to_vec());
        for level in &self.levels {
            activation = level.feed_forward(&activation);
        }
        activation.to_vec()
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.levels[0].input_count()
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.levels[self.levels.len() - 1].output_count()
    }

    /// Layer sizes, input first.
    pub fn topology(&self) -> Vec<usize> {
        let mut sizes = vec![self.input_count()];
        sizes.extend(self.levels.iter().map(Level::output_count));
        sizes
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.levels
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Check that no parameter is NaN/Inf.
    pub fn is_valid(&self) -> bool {
        self.levels.iter().all(|level| {
            level.weights.iter().all(|w| w.is_finite())
                && level.biases.iter().all(|b| b.is_finite())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_construction_matches_topology() {
        let net = NeuralNetwork::new(&[5, 6, 4], &mut rng());

        assert_eq!(net.levels.len(), 2);
        assert_eq!(net.topology(), vec![5, 6, 4]);
        assert_eq!(net.input_count(), 5);
        assert_eq!(net.output_count(), 4);
        assert_eq!(net.parameter_count(), 5 * 6 + 6 + 6 * 4 + 4);
        assert!(net.is_valid());
    }

    #[test]
    fn test_initial_parameters_in_range() {
        let net = NeuralNetwork::new(&[5, 6, 4], &mut rng());
        for level in &net.levels {
            assert!(level.weights.iter().all(|&w| (-1.0..1.0).contains(&w)));
            assert!(level.biases.iter().all(|&b| (-1.0..1.0).contains(&b)));
        }
    }

    #[test]
    fn test_outputs_are_binary() {
        let net = NeuralNetwork::new(&[5, 6, 4], &mut rng());
        let outputs = net.feed_forward(&[0.2, 0.9, 0.0, 0.4, 1.0]);

        assert_eq!(outputs.len(), 4);
        assert!(outputs.iter().all(|&o| o == 0.0 || o == 1.0));
    }

    #[test]
    fn test_feed_forward_is_deterministic() {
        let net = NeuralNetwork::new(&[5, 6, 4], &mut rng());
        let inputs = [0.3, 0.0, 0.8, 0.1, 0.5];

        assert_eq!(net.feed_forward(&inputs), net.feed_forward(&inputs));
    }

    #[test]
    fn test_threshold_semantics() {
        // Single input, single output, hand-set parameters.
        let mut net = NeuralNetwork::new(&[1, 1], &mut rng());
        net.levels[0].weights[[0, 0]] = 1.0;
        net.levels[0].biases[0] = 0.5;

        assert_eq!(net.feed_forward(&[0.6]), vec![1.0]);
        assert_eq!(net.feed_forward(&[0.4]), vec![0.0]);
        // Exactly at the bias: strictly-greater comparison, so off.
        assert_eq!(net.feed_forward(&[0.5]), vec![0.0]);
    }

    #[test]
    #[should_panic(expected = "expects")]
    fn test_input_length_mismatch_panics() {
        let net = NeuralNetwork::new(&[5, 6, 4], &mut rng());
        net.feed_forward(&[1.0, 2.0]);
    }
}
