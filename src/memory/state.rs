use super::config::MemoryConfig;
use super::error::{check_shape, MemoryError};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// Fill value for tensors that must not start at exact zero (a zero memory
/// word has no direction for cosine similarity).
pub const INITIAL_FILL: f32 = 1e-6;

/// Everything the engine carries from one time step to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    /// Memory bank `[B,N,W]`
    pub memory: Array3<f32>,
    /// Slot usage `[B,N]`, in `[0,1]`
    pub usage: Array2<f32>,
    /// Degree to which each slot was the latest write `[B,N]`
    pub precedence: Array2<f32>,
    /// Temporal link matrix `[B,N,N]` with a zero diagonal
    pub link: Array3<f32>,
    /// Latest write weighting `[B,N]`
    pub write_weight: Array2<f32>,
    /// Latest read weighting per head `[B,N,R]`
    pub read_weights: Array3<f32>,
    /// Latest read vectors per head `[B,W,R]`
    pub read_vectors: Array3<f32>,
}

impl MemoryState {
    /// Initial state for a memory of the given dimensions
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            memory: Array3::from_elem(config.memory_shape(), INITIAL_FILL),
            usage: Array2::zeros(config.slot_shape()),
            precedence: Array2::zeros(config.slot_shape()),
            link: Array3::zeros(config.link_shape()),
            write_weight: Array2::from_elem(config.slot_shape(), INITIAL_FILL),
            read_weights: Array3::from_elem(config.read_weight_shape(), INITIAL_FILL),
            read_vectors: Array3::from_elem(config.read_vector_shape(), INITIAL_FILL),
        }
    }

    /// Checks every tensor against the dimensions in `config`
    pub fn validate(&self, config: &MemoryConfig) -> Result<(), MemoryError> {
        check_shape("memory", self.memory.shape(), &config.memory_shape())?;
        check_shape("usage", self.usage.shape(), &config.slot_shape())?;
        check_shape("precedence", self.precedence.shape(), &config.slot_shape())?;
        check_shape("link", self.link.shape(), &config.link_shape())?;
        check_shape("write_weight", self.write_weight.shape(), &config.slot_shape())?;
        check_shape("read_weights", self.read_weights.shape(), &config.read_weight_shape())?;
        check_shape("read_vectors", self.read_vectors.shape(), &config.read_vector_shape())?;
        Ok(())
    }
}
