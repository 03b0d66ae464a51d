//! Per-step values supplied by the controller.
//!
//! Gates and read modes are expected to be already squashed into `[0,1]`
//! (read modes already softmaxed). The engine checks shapes only and uses the
//! values as given.

use super::config::MemoryConfig;
use super::error::{check_shape, MemoryError};
use super::reading::LOOKUP_MODE;
use ndarray::{Array1, Array2, Array3, Axis};

/// Number of read strategies a head mixes between.
pub const READ_MODES: usize = 3;

/// Controller output driving one `write`
#[derive(Debug, Clone, PartialEq)]
pub struct WriteInterface {
    /// Lookup key `[B,W]`
    pub key: Array2<f32>,
    /// Lookup key strength `[B]`
    pub strength: Array1<f32>,
    /// Per-head permission to free previously read slots `[B,R]`
    pub free_gates: Array2<f32>,
    /// Share of the write placed by allocation rather than lookup `[B]`
    pub allocation_gate: Array1<f32>,
    /// Overall write intensity `[B]`
    pub write_gate: Array1<f32>,
    /// Content to add `[B,W]`
    pub write_vector: Array2<f32>,
    /// Content to remove `[B,W]`
    pub erase_vector: Array2<f32>,
}

impl WriteInterface {
    /// A correctly shaped write that changes no memory content
    pub fn idle(config: &MemoryConfig) -> Self {
        Self {
            key: Array2::zeros(config.word_shape()),
            strength: Array1::zeros(config.batch_size),
            free_gates: Array2::zeros(config.head_shape()),
            allocation_gate: Array1::zeros(config.batch_size),
            write_gate: Array1::zeros(config.batch_size),
            write_vector: Array2::zeros(config.word_shape()),
            erase_vector: Array2::zeros(config.word_shape()),
        }
    }

    pub fn validate(&self, config: &MemoryConfig) -> Result<(), MemoryError> {
        let batch = [config.batch_size];
        check_shape("key", self.key.shape(), &config.word_shape())?;
        check_shape("strength", self.strength.shape(), &batch)?;
        check_shape("free_gates", self.free_gates.shape(), &config.head_shape())?;
        check_shape("allocation_gate", self.allocation_gate.shape(), &batch)?;
        check_shape("write_gate", self.write_gate.shape(), &batch)?;
        check_shape("write_vector", self.write_vector.shape(), &config.word_shape())?;
        check_shape("erase_vector", self.erase_vector.shape(), &config.word_shape())?;
        Ok(())
    }
}

/// Controller output driving one `read`
#[derive(Debug, Clone, PartialEq)]
pub struct ReadInterface {
    /// One lookup key per head `[B,W,R]`
    pub keys: Array3<f32>,
    /// Key strengths `[B,R]`
    pub strengths: Array2<f32>,
    /// Backward/lookup/forward mixture per head `[B,3,R]`
    pub read_modes: Array3<f32>,
}

impl ReadInterface {
    /// A correctly shaped read doing a flat content lookup on every head
    pub fn idle(config: &MemoryConfig) -> Self {
        let mut read_modes = Array3::zeros((config.batch_size, READ_MODES, config.read_heads));
        read_modes.index_axis_mut(Axis(1), LOOKUP_MODE).fill(1.0);

        Self {
            keys: Array3::zeros(config.read_vector_shape()),
            strengths: Array2::zeros(config.head_shape()),
            read_modes,
        }
    }

    pub fn validate(&self, config: &MemoryConfig) -> Result<(), MemoryError> {
        check_shape("keys", self.keys.shape(), &config.read_vector_shape())?;
        check_shape("strengths", self.strengths.shape(), &config.head_shape())?;
        check_shape(
            "read_modes",
            self.read_modes.shape(),
            &[config.batch_size, READ_MODES, config.read_heads],
        )?;
        Ok(())
    }
}
