//! Engine options aggregate.

use crate::config::{Compression, OptionsConfig};
use crate::error::{BridgeError, BridgeResult};
use rocksdb::{BlockBasedOptions, Cache, DBCompressionType, LogLevel};

/// A complete engine configuration, owning its block cache and filter policy.
///
/// Consumed by reference by [`Database::open`](crate::Database::open),
/// [`Database::destroy`](crate::Database::destroy) and
/// [`Database::repair`](crate::Database::repair). The cache and the filter are
/// released together with the options, once.
pub struct Options {
    engine: rocksdb::Options,
    // Kept so the cache outlives every table factory built from it.
    _cache: Cache,
    cache_size: usize,
    bloom_filter_bits_per_key: Option<i32>,
    config: OptionsConfig,
}

impl Options {
    /// Builds the engine options from a config.
    ///
    /// Sizes must be positive. The open file limit is positive, or `-1` for
    /// no limit. A bloom filter density of zero or less means no filter policy
    /// is attached.
    pub fn new(config: OptionsConfig) -> BridgeResult<Self> {
        let cache_size = positive("cache size", config.cache_size)?;
        let write_buffer_size = positive("write buffer size", config.write_buffer_size)?;
        let block_size = positive("block size", config.block_size)?;
        let max_file_size = positive("max file size", config.max_file_size)?;
        if config.max_open_files != UNLIMITED_OPEN_FILES {
            positive("max open files", config.max_open_files)?;
        }
        positive("block restart interval", config.block_restart_interval)?;

        let cache = Cache::new_lru_cache(cache_size);
        let bloom_filter_bits_per_key =
            (config.bloom_filter_bits_per_key > 0).then_some(config.bloom_filter_bits_per_key);

        let mut table = BlockBasedOptions::default();
        table.set_block_cache(&cache);
        table.set_block_size(block_size);
        table.set_block_restart_interval(config.block_restart_interval);
        if let Some(bits) = bloom_filter_bits_per_key {
            table.set_bloom_filter(f64::from(bits), false);
        }

        let mut engine = rocksdb::Options::default();
        engine.create_if_missing(config.create_if_missing);
        engine.set_error_if_exists(config.error_if_exists);
        engine.set_paranoid_checks(config.paranoid_checks);
        engine.set_write_buffer_size(write_buffer_size);
        engine.set_max_open_files(config.max_open_files);
        engine.set_target_file_size_base(max_file_size as u64);
        engine.set_compression_type(match config.compression {
            Compression::None => DBCompressionType::None,
            Compression::Snappy => DBCompressionType::Snappy,
        });
        engine.set_recycle_log_file_num(usize::from(config.reuse_logs));
        engine.set_log_level(if config.print_logs {
            LogLevel::Info
        } else {
            LogLevel::Error
        });
        engine.set_block_based_table_factory(&table);

        Ok(Self {
            engine,
            _cache: cache,
            cache_size,
            bloom_filter_bits_per_key,
            config,
        })
    }

    /// Returns the config these options were built from.
    pub fn config(&self) -> &OptionsConfig {
        &self.config
    }

    /// Capacity of the owned block cache, in bytes.
    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    /// Returns true if a bloom filter policy is attached.
    pub fn has_filter_policy(&self) -> bool {
        self.bloom_filter_bits_per_key.is_some()
    }

    /// Releases the options together with the owned cache and filter policy.
    pub fn release(self) {
        tracing::trace!(cache_size = self.cache_size, "releasing options");
    }

    pub(crate) fn engine(&self) -> &rocksdb::Options {
        &self.engine
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

const UNLIMITED_OPEN_FILES: i32 = -1;

fn positive(name: &str, value: i32) -> BridgeResult<usize> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| BridgeError::invalid_argument(format!("{name} must be positive, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = Options::new(OptionsConfig::default()).unwrap();
        assert_eq!(options.cache_size(), 8 * 1024 * 1024);
        assert!(options.has_filter_policy());
        options.release();
    }

    #[test]
    fn non_positive_bloom_disables_filter() {
        let zero = Options::new(OptionsConfig::new().bloom_filter_bits_per_key(0)).unwrap();
        assert!(!zero.has_filter_policy());

        let negative = Options::new(OptionsConfig::new().bloom_filter_bits_per_key(-3)).unwrap();
        assert!(!negative.has_filter_policy());
    }

    #[test]
    fn cache_size_must_be_positive() {
        let err = Options::new(OptionsConfig::new().cache_size(0)).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument { .. }));

        let err = Options::new(OptionsConfig::new().cache_size(-1)).unwrap_err();
        assert!(err.to_string().contains("cache size"));
    }

    #[test]
    fn cache_sized_exactly() {
        let options = Options::new(OptionsConfig::new().cache_size(12_345)).unwrap();
        assert_eq!(options.cache_size(), 12_345);
    }

    #[test]
    fn rejects_zero_block_size() {
        assert!(Options::new(OptionsConfig::new().block_size(0)).is_err());
    }

    #[test]
    fn unlimited_open_files() {
        let options = Options::new(OptionsConfig::new().max_open_files(-1)).unwrap();
        assert_eq!(options.config().max_open_files, -1);

        assert!(Options::new(OptionsConfig::new().max_open_files(0)).is_err());
        let err = Options::new(OptionsConfig::new().max_open_files(-2)).unwrap_err();
        assert!(err.to_string().contains("max open files"));
    }
}
