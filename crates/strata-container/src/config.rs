//! Container configuration parameters.

use strata_core::ContainerError;

/// Configuration for an [`AttributeContainer`](crate::AttributeContainer).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Rows per chunk, shared by every column, the reference counts and
    /// the free list.
    ///
    /// Default: 4096. Must be non-zero.
    pub chunk_size: u32,
}

impl ContainerConfig {
    /// Default chunk size in rows.
    pub const DEFAULT_CHUNK_SIZE: u32 = 4096;

    /// Create a config with the given chunk size.
    pub fn new(chunk_size: u32) -> Self {
        Self { chunk_size }
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<(), ContainerError> {
        if self.chunk_size == 0 {
            return Err(ContainerError::InvalidConfig {
                reason: "chunk_size must be non-zero".into(),
            });
        }
        Ok(())
    }

    /// Number of chunks needed to address `extent` rows.
    pub fn chunks_for(&self, extent: u32) -> usize {
        extent.div_ceil(self.chunk_size) as usize
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chunk_size() {
        assert_eq!(ContainerConfig::default().chunk_size, 4096);
        assert!(ContainerConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let err = ContainerConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, ContainerError::InvalidConfig { .. }));
    }

    #[test]
    fn chunks_for_rounds_up() {
        let config = ContainerConfig::new(16);
        assert_eq!(config.chunks_for(0), 0);
        assert_eq!(config.chunks_for(1), 1);
        assert_eq!(config.chunks_for(16), 1);
        assert_eq!(config.chunks_for(17), 2);
    }
}
