use super::addressing::content_weighting;
use super::allocation::{allocation_weighting, update_usage};
use super::config::MemoryConfig;
use super::error::MemoryError;
use super::interface::{ReadInterface, WriteInterface};
use super::reading::{read_vectors, read_weighting};
use super::state::MemoryState;
use super::temporal::{directional_weights, update_link, update_precedence};
use super::writing::{update_memory, write_weighting};
use ndarray::Axis;
use tracing::{debug_span, trace};

/// External memory with content, allocation and temporal addressing.
///
/// The engine itself only holds its dimensions. All state lives in the
/// [`MemoryState`] passed to each call, and every call returns a fresh state
/// without touching its input.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    config: MemoryConfig,
}

impl MemoryEngine {
    pub fn new(config: MemoryConfig) -> Result<Self, MemoryError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Initial state matching this engine's dimensions
    pub fn init_state(&self) -> MemoryState {
        MemoryState::new(&self.config)
    }

    /// Writes to memory.
    ///
    /// Usage is refreshed from the previous step's read and write weightings,
    /// the new write weighting blends allocation with a lookup on `key`, the
    /// bank is erased then written, and the temporal links record the write.
    /// Read weights and read vectors carry over unchanged.
    pub fn write(
        &self,
        state: &MemoryState,
        write: &WriteInterface,
    ) -> Result<MemoryState, MemoryError> {
        state.validate(&self.config)?;
        write.validate(&self.config)?;
        let _span = debug_span!("memory_write", batch = self.config.batch_size).entered();

        let key = write.key.view().insert_axis(Axis(2));
        let strength = write.strength.view().insert_axis(Axis(1));
        let lookup =
            content_weighting(state.memory.view(), key, strength).index_axis_move(Axis(2), 0);

        let usage = update_usage(
            state.usage.view(),
            state.read_weights.view(),
            state.write_weight.view(),
            write.free_gates.view(),
        );
        let allocation = allocation_weighting(usage.view());

        let write_weight = write_weighting(
            lookup.view(),
            allocation.view(),
            write.write_gate.view(),
            write.allocation_gate.view(),
        );
        let memory = update_memory(
            state.memory.view(),
            write_weight.view(),
            write.write_vector.view(),
            write.erase_vector.view(),
        );

        let link = update_link(state.precedence.view(), state.link.view(), write_weight.view());
        let precedence = update_precedence(state.precedence.view(), write_weight.view());
        trace!(written = write_weight.sum(), "write complete");

        Ok(MemoryState {
            memory,
            usage,
            precedence,
            link,
            write_weight,
            read_weights: state.read_weights.clone(),
            read_vectors: state.read_vectors.clone(),
        })
    }

    /// Reads from memory.
    ///
    /// Each head blends a content lookup on its key with forward and backward
    /// traversal of the link matrix from its previous read weights. The new
    /// read weights and read vectors are returned in the state; everything
    /// else carries over unchanged.
    pub fn read(
        &self,
        state: &MemoryState,
        read: &ReadInterface,
    ) -> Result<MemoryState, MemoryError> {
        state.validate(&self.config)?;
        read.validate(&self.config)?;
        let _span = debug_span!("memory_read", batch = self.config.batch_size).entered();

        let lookup =
            content_weighting(state.memory.view(), read.keys.view(), read.strengths.view());
        let (forward, backward) = directional_weights(state.read_weights.view(), state.link.view());
        let read_weights = read_weighting(
            lookup.view(),
            forward.view(),
            backward.view(),
            read.read_modes.view(),
        );
        let read_vectors = read_vectors(state.memory.view(), read_weights.view());
        trace!(heads = self.config.read_heads, "read complete");

        Ok(MemoryState {
            read_weights,
            read_vectors,
            ..state.clone()
        })
    }

    /// One time step: a write followed by a read of the updated memory
    pub fn step(
        &self,
        state: &MemoryState,
        write: &WriteInterface,
        read: &ReadInterface,
    ) -> Result<MemoryState, MemoryError> {
        let written = self.write(state, write)?;
        self.read(&written, read)
    }
}
