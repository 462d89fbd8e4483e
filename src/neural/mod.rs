//! Feedforward networks that steer the cars.
//!
//! A network is an ordered stack of levels with hard-threshold activation.
//! Learning is pure hill climbing: [`NeuralNetwork::mutate`] blends every
//! parameter toward a fresh random draw, and the driver reseeds each
//! generation from the best performer.

mod mutation;
mod network;

pub use network::{Level, NeuralNetwork};
