use super::error::MemoryError;
use serde::{Deserialize, Serialize};

/// Dimensions of a memory engine, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of addressable memory words
    pub slot_count: usize,
    /// Width of a single memory word
    pub word_size: usize,
    /// Number of read heads
    pub read_heads: usize,
    /// Number of independent memory banks processed together
    pub batch_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            slot_count: 256,
            word_size: 64,
            read_heads: 4,
            batch_size: 1,
        }
    }
}

impl MemoryConfig {
    pub fn new(slot_count: usize, word_size: usize, read_heads: usize, batch_size: usize) -> Self {
        Self {
            slot_count,
            word_size,
            read_heads,
            batch_size,
        }
    }

    /// Rejects configurations with an empty dimension
    pub fn validate(&self) -> Result<(), MemoryError> {
        let dims = [
            ("slot_count", self.slot_count),
            ("word_size", self.word_size),
            ("read_heads", self.read_heads),
            ("batch_size", self.batch_size),
        ];
        for (name, value) in dims {
            if value == 0 {
                return Err(MemoryError::InvalidConfig(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    // Tensor shapes derived from the configuration
    pub fn memory_shape(&self) -> [usize; 3] {
        [self.batch_size, self.slot_count, self.word_size]
    }

    pub fn slot_shape(&self) -> [usize; 2] {
        [self.batch_size, self.slot_count]
    }

    pub fn link_shape(&self) -> [usize; 3] {
        [self.batch_size, self.slot_count, self.slot_count]
    }

    pub fn read_weight_shape(&self) -> [usize; 3] {
        [self.batch_size, self.slot_count, self.read_heads]
    }

    pub fn read_vector_shape(&self) -> [usize; 3] {
        [self.batch_size, self.word_size, self.read_heads]
    }

    pub fn word_shape(&self) -> [usize; 2] {
        [self.batch_size, self.word_size]
    }

    pub fn head_shape(&self) -> [usize; 2] {
        [self.batch_size, self.read_heads]
    }
}
