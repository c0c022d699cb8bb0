use serde::{
    Deserialize,
    Serialize,
};

/// The knobs of the header sync engine that are not part of any chain's rules.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct HeaderSyncConfig {
    /// The number of committed headers kept in memory. Zero disables the cache.
    #[serde(default = "HeaderSyncConfig::default_header_cache_size")]
    pub header_cache_size: usize,
}

impl HeaderSyncConfig {
    fn default_header_cache_size() -> usize {
        4096
    }
}

impl Default for HeaderSyncConfig {
    fn default() -> Self {
        Self {
            header_cache_size: Self::default_header_cache_size(),
        }
    }
}
