//! Differentiable-neural-computer style external memory.
//!
//! The [`memory`] module holds the engine: content addressing, usage-based
//! allocation, temporal links and the `write`/`read` pipelines built on them.
//! The [`storage`] module persists engine state as checksummed checkpoints.

pub mod memory;
pub mod storage;

pub use memory::{
    MemoryConfig, MemoryEngine, MemoryError, MemoryState, ReadInterface, WriteInterface,
};
