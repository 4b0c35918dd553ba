//! Store configuration.

/// Upper bound on one record frame, matching the section limit of
/// length-delimited CAR-style framing.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 32 * 1024 * 1024;

/// Multicodec code for dag-cbor.
pub const DAG_CBOR_CODEC: u64 = 0x71;

/// Configuration for a [`crate::SelectorStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Largest payload a single record frame may carry, on encode and decode.
    pub max_frame_size: usize,

    /// Optional cap on the bytes one traversal may record.
    ///
    /// Exceeding it is a recording failure: the traversal keeps running but
    /// its commit is refused.
    pub max_log_size: Option<usize>,

    /// Codec used when a storage key is turned back into a root CID.
    pub key_codec: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_log_size: None,
            key_codec: DAG_CBOR_CODEC,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum frame payload size.
    #[must_use]
    pub const fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Caps the size of one traversal's record log.
    #[must_use]
    pub const fn max_log_size(mut self, size: usize) -> Self {
        self.max_log_size = Some(size);
        self
    }

    /// Sets the codec used to rebuild root CIDs from keys.
    #[must_use]
    pub const fn key_codec(mut self, codec: u64) -> Self {
        self.key_codec = codec;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.max_frame_size, 32 * 1024 * 1024);
        assert_eq!(config.max_log_size, None);
        assert_eq!(config.key_codec, DAG_CBOR_CODEC);
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .max_frame_size(1024)
            .max_log_size(4096)
            .key_codec(0x70);

        assert_eq!(config.max_frame_size, 1024);
        assert_eq!(config.max_log_size, Some(4096));
        assert_eq!(config.key_codec, 0x70);
    }
}
