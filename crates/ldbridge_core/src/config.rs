//! Engine configuration.

/// Block compression applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Blocks are stored as-is.
    None,
    /// Blocks are compressed with Snappy.
    Snappy,
}

/// Every tunable of an [`Options`](crate::Options) aggregate.
///
/// The aggregate is built from a complete config in one step; nothing can be
/// changed once it exists.
#[derive(Debug, Clone)]
pub struct OptionsConfig {
    /// Whether the engine writes an informational log.
    pub print_logs: bool,

    /// Whether to create the database if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to error if the database already exists.
    pub error_if_exists: bool,

    /// Whether the engine checks data aggressively and stops early on errors.
    pub paranoid_checks: bool,

    /// Bytes buffered in memory before being flushed to a sorted file.
    pub write_buffer_size: i32,

    /// Number of files the engine may keep open, `-1` for no limit.
    pub max_open_files: i32,

    /// Capacity of the LRU block cache, in bytes.
    pub cache_size: i32,

    /// Approximate size of uncompressed user data per block.
    pub block_size: i32,

    /// Keys between restart points for delta encoding.
    pub block_restart_interval: i32,

    /// Bytes written to a file before switching to a new one.
    pub max_file_size: i32,

    /// Block compression.
    pub compression: Compression,

    /// Whether log files are reused instead of recreated.
    pub reuse_logs: bool,

    /// Bloom filter bits per key; zero or less disables the filter.
    pub bloom_filter_bits_per_key: i32,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            print_logs: false,
            create_if_missing: true,
            error_if_exists: false,
            paranoid_checks: false,
            write_buffer_size: 4 * 1024 * 1024, // 4 MB
            max_open_files: 1000,
            cache_size: 8 * 1024 * 1024, // 8 MB
            block_size: 4 * 1024,
            block_restart_interval: 16,
            max_file_size: 2 * 1024 * 1024, // 2 MB
            compression: Compression::Snappy,
            reuse_logs: false,
            bloom_filter_bits_per_key: 10,
        }
    }
}

impl OptionsConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the engine writes an informational log.
    #[must_use]
    pub const fn print_logs(mut self, value: bool) -> Self {
        self.print_logs = value;
        self
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to error if the database exists.
    #[must_use]
    pub const fn error_if_exists(mut self, value: bool) -> Self {
        self.error_if_exists = value;
        self
    }

    /// Sets paranoid checks.
    #[must_use]
    pub const fn paranoid_checks(mut self, value: bool) -> Self {
        self.paranoid_checks = value;
        self
    }

    /// Sets the write buffer size.
    #[must_use]
    pub const fn write_buffer_size(mut self, size: i32) -> Self {
        self.write_buffer_size = size;
        self
    }

    /// Sets the open file limit.
    #[must_use]
    pub const fn max_open_files(mut self, count: i32) -> Self {
        self.max_open_files = count;
        self
    }

    /// Sets the block cache capacity.
    #[must_use]
    pub const fn cache_size(mut self, size: i32) -> Self {
        self.cache_size = size;
        self
    }

    /// Sets the block size.
    #[must_use]
    pub const fn block_size(mut self, size: i32) -> Self {
        self.block_size = size;
        self
    }

    /// Sets the restart interval.
    #[must_use]
    pub const fn block_restart_interval(mut self, interval: i32) -> Self {
        self.block_restart_interval = interval;
        self
    }

    /// Sets the maximum file size.
    #[must_use]
    pub const fn max_file_size(mut self, size: i32) -> Self {
        self.max_file_size = size;
        self
    }

    /// Sets the block compression.
    #[must_use]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Sets log reuse.
    #[must_use]
    pub const fn reuse_logs(mut self, value: bool) -> Self {
        self.reuse_logs = value;
        self
    }

    /// Sets the bloom filter density.
    #[must_use]
    pub const fn bloom_filter_bits_per_key(mut self, bits: i32) -> Self {
        self.bloom_filter_bits_per_key = bits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = OptionsConfig::default();
        assert!(config.create_if_missing);
        assert!(!config.error_if_exists);
        assert_eq!(config.compression, Compression::Snappy);
        assert_eq!(config.block_restart_interval, 16);
    }

    #[test]
    fn builder_pattern() {
        let config = OptionsConfig::new()
            .create_if_missing(false)
            .compression(Compression::None)
            .cache_size(1024)
            .bloom_filter_bits_per_key(0);

        assert!(!config.create_if_missing);
        assert_eq!(config.compression, Compression::None);
        assert_eq!(config.cache_size, 1024);
        assert_eq!(config.bloom_filter_bits_per_key, 0);
    }
}
