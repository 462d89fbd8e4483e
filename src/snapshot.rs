//! Saving and loading the best brain between runs.
//!
//! A [`NetworkSnapshot`] is the serializable form of a network: one entry
//! per level, weights as a 2D table (rows = input index), biases as a flat
//! list. Loading validates the shape against the configured topology and
//! refuses to truncate or pad.

use crate::neural::{Level, NeuralNetwork};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Serializable form of one level.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

/// Serializable form of a whole network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub levels: Vec<LevelSnapshot>,
}

impl NetworkSnapshot {
    /// Capture the current parameters of a network.
    pub fn from_network(network: &NeuralNetwork) -> Self {
        let levels = network
            .levels
            .iter()
            .map(|level| LevelSnapshot {
                weights: level.weights.outer_iter().map(|row| row.to_vec()).collect(),
                biases: level.biases.to_vec(),
            })
            .collect();
        Self { levels }
    }

    /// Rebuild a network, checking every level shape against `topology`.
    /// A mismatch anywhere fails the whole load; nothing is coerced.
    pub fn into_network(self, topology: &[usize]) -> Result<NeuralNetwork, SnapshotError> {
        if self.levels.len() + 1 != topology.len() {
            return Err(SnapshotError::DimensionMismatch(format!(
                "snapshot has {} levels but topology {:?} needs {}",
                self.levels.len(),
                topology,
                topology.len() - 1
            )));
        }

        let mut levels = Vec::with_capacity(self.levels.len());
        for (idx, level) in self.levels.into_iter().enumerate() {
            let (inputs, outputs) = (topology[idx], topology[idx + 1]);

            if level.weights.len() != inputs {
                return Err(SnapshotError::DimensionMismatch(format!(
                    "level {}: {} weight rows, expected {}",
                    idx,
                    level.weights.len(),
                    inputs
                )));
            }
            if level.weights.iter().any(|row| row.len() != outputs) {
                return Err(SnapshotError::DimensionMismatch(format!(
                    "level {}: ragged or missized weight rows, expected {} columns",
                    idx, outputs
                )));
            }
            if level.biases.len() != outputs {
                return Err(SnapshotError::DimensionMismatch(format!(
                    "level {}: {} biases, expected {}",
                    idx,
                    level.biases.len(),
                    outputs
                )));
            }

            let flat: Vec<f64> = level.weights.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((inputs, outputs), flat)
                .map_err(|e| SnapshotError::DimensionMismatch(e.to_string()))?;
            let biases = Array1::from_vec(level.biases);

            levels.push(Level { weights, biases });
        }

        Ok(NeuralNetwork { levels })
    }
}

/// Errors that can occur while loading or saving a brain snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    /// Malformed on-disk data (bad JSON, non-numeric values, missing levels).
    Deserialization(serde_json::Error),
    /// Well-formed data whose shapes contradict the configured topology.
    DimensionMismatch(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Deserialization(e) => write!(f, "malformed snapshot: {}", e),
            Self::DimensionMismatch(msg) => write!(f, "dimension mismatch: {}", msg),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Deserialization(e)
    }
}

/// File-backed store for the best brain. The simulation core only sees the
/// load/save contract; the JSON-file medium lives entirely here.
pub struct BrainStore {
    path: PathBuf,
}

impl BrainStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored snapshot, or `None` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<NetworkSnapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&contents)?;
        Ok(Some(snapshot))
    }

    pub fn save(&self, snapshot: &NetworkSnapshot) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(snapshot)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Drop the stored snapshot so the next run starts from scratch.
    pub fn discard(&self) -> Result<(), SnapshotError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
