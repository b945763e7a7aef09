//! Proxy configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scorer::Scorer;

/// Configuration for the TiVo served object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Index only HD channels
    #[serde(default = "default_true")]
    pub hd_only: bool,
    /// Drop non-HD candidates during name resolution (only meaningful when
    /// `hd_only` is off)
    #[serde(default)]
    pub prefer_hd: bool,
    /// Similarity function for name and affiliate resolution
    #[serde(default)]
    pub scorer: Scorer,
    /// Channel lineup snapshot, read at startup and rewritten after a live fetch
    #[serde(default)]
    pub channel_cache_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            hd_only: true,
            prefer_hd: false,
            scorer: Scorer::Ratio,
            channel_cache_file: None,
        }
    }
}
