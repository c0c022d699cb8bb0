use header_sync_chain_config::HeaderSyncConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The number of committed headers kept in memory. Zero disables the cache.
    pub header_cache_size: usize,
}

impl Config {
    pub fn new(header_cache_size: usize) -> Self {
        Self { header_cache_size }
    }
}

impl Default for Config {
    fn default() -> Self {
        HeaderSyncConfig::default().into()
    }
}

impl From<HeaderSyncConfig> for Config {
    fn from(config: HeaderSyncConfig) -> Self {
        Self::new(config.header_cache_size)
    }
}
