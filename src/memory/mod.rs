//! The memory engine and the sub-operations its `write` and `read` pipelines
//! are composed of.
//!
//! Every sub-operation is a pure function over batched arrays whose leading
//! axis indexes independent memories; batch rows are evaluated in parallel.

pub mod addressing;
pub mod allocation;
pub mod config;
pub mod engine;
pub mod error;
pub mod interface;
pub mod reading;
pub mod state;
pub mod temporal;
pub mod writing;

pub use config::MemoryConfig;
pub use engine::MemoryEngine;
pub use error::MemoryError;
pub use interface::{ReadInterface, WriteInterface};
pub use state::MemoryState;
