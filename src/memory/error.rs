use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    #[error("Shape mismatch for {tensor}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        tensor: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Invalid memory configuration: {0}")]
    InvalidConfig(String),
}

/// Fails with [`MemoryError::ShapeMismatch`] unless `actual` equals `expected`.
pub(crate) fn check_shape(
    tensor: &'static str,
    actual: &[usize],
    expected: &[usize],
) -> Result<(), MemoryError> {
    if actual == expected {
        Ok(())
    } else {
        Err(MemoryError::ShapeMismatch {
            tensor,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}
