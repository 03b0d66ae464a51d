//! Checkpoint persistence for memory state.
//!
//! A checkpoint is the engine configuration plus all seven state tensors,
//! encoded with bincode, optionally LZ4 compressed, and guarded by a CRC32 of
//! the stored payload.

pub mod compression;

use crate::memory::{MemoryConfig, MemoryError, MemoryState};
use bincode::{deserialize, serialize};
use compression::{CompressionAlgorithm, CompressionMetrics, Compressor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const CHECKPOINT_EXTENSION: &str = "ckpt";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("Decompression error: {0}")]
    Decompression(String),
    #[error("Checksum mismatch: stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("Invalid checkpoint name: {0:?}")]
    InvalidName(String),
    #[error("Checkpoint does not match its configuration: {0}")]
    Memory(#[from] MemoryError),
}

/// Engine configuration together with a state of that shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub config: MemoryConfig,
    pub state: MemoryState,
}

/// On-disk framing of an encoded checkpoint
#[derive(Serialize, Deserialize)]
struct CheckpointBlock {
    algorithm: CompressionAlgorithm,
    checksum: u32,
    payload: Vec<u8>,
}

impl Checkpoint {
    pub fn new(config: MemoryConfig, state: MemoryState) -> Result<Self, StorageError> {
        state.validate(&config)?;
        Ok(Self { config, state })
    }

    /// Encodes the checkpoint, compressing it with `algorithm`
    pub fn to_bytes(
        &self,
        algorithm: CompressionAlgorithm,
    ) -> Result<(Vec<u8>, CompressionMetrics), StorageError> {
        let encoded = serialize(self)?;
        let (payload, metrics) = Compressor::new(algorithm).compress(&encoded);
        let checksum = crc32fast::hash(&payload);

        let block = CheckpointBlock {
            algorithm,
            checksum,
            payload,
        };
        Ok((serialize(&block)?, metrics))
    }

    /// Decodes a checkpoint, verifying its checksum and tensor shapes.
    ///
    /// The checksum covers the payload as stored, so a damaged block is
    /// rejected before decompression.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let block: CheckpointBlock = deserialize(bytes)?;

        let actual = crc32fast::hash(&block.payload);
        if actual != block.checksum {
            return Err(StorageError::ChecksumMismatch {
                expected: block.checksum,
                actual,
            });
        }

        let encoded = Compressor::new(block.algorithm).decompress(&block.payload)?;

        let checkpoint: Checkpoint = deserialize(&encoded)?;
        checkpoint.config.validate()?;
        checkpoint.state.validate(&checkpoint.config)?;
        Ok(checkpoint)
    }
}

/// Configuration for checkpoint storage
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding checkpoint files
    pub storage_path: PathBuf,
    /// Compression applied when saving
    pub compression: CompressionAlgorithm,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("storage/checkpoints"),
            compression: CompressionAlgorithm::Lz4,
        }
    }
}

/// Directory of named checkpoints
pub struct CheckpointStore {
    config: StoreConfig,
}

impl CheckpointStore {
    pub fn new(config: StoreConfig) -> io::Result<Self> {
        fs::create_dir_all(&config.storage_path)?;
        Ok(Self { config })
    }

    pub fn path(&self) -> &Path {
        &self.config.storage_path
    }

    /// Saves `checkpoint` under `name`, replacing any previous one
    pub fn save(
        &self,
        name: &str,
        checkpoint: &Checkpoint,
    ) -> Result<CompressionMetrics, StorageError> {
        let path = self.checkpoint_path(name)?;
        let (bytes, metrics) = checkpoint.to_bytes(self.config.compression)?;

        // Partial writes never appear under the checkpoint's name
        let staging = path.with_extension("tmp");
        if let Err(e) = fs::write(&staging, &bytes).and_then(|_| fs::rename(&staging, &path)) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        info!(
            name,
            bytes = bytes.len(),
            ratio = metrics.compression_ratio(),
            "checkpoint saved"
        );
        Ok(metrics)
    }

    /// Loads the checkpoint saved under `name`
    pub fn load(&self, name: &str) -> Result<Checkpoint, StorageError> {
        let path = self.checkpoint_path(name)?;
        let bytes = fs::read(&path)?;
        let checkpoint = Checkpoint::from_bytes(&bytes)?;
        debug!(name, bytes = bytes.len(), "checkpoint loaded");
        Ok(checkpoint)
    }

    /// Names of all saved checkpoints, sorted
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.config.storage_path)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == CHECKPOINT_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn remove(&self, name: &str) -> Result<(), StorageError> {
        fs::remove_file(self.checkpoint_path(name)?)?;
        Ok(())
    }

    fn checkpoint_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(|c: char| c == '/' || c == '\\');
        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self
            .config
            .storage_path
            .join(format!("{}.{}", name, CHECKPOINT_EXTENSION)))
    }
}
