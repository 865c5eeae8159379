//! Node configuration

use std::path::Path;

use attest_core::Timeouts;
use attest_state::{
    AssemblyLimits, EngineConfig, DEFAULT_BLANK_SENTINELS, DEFAULT_MAX_ASSEMBLY_BYTES,
    DEFAULT_MAX_TOTAL_CHUNKS,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Node configuration, read once at startup
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Seconds before an undisputed claim can be finalized
    pub claim_timeout_secs: u64,
    /// Seconds before an unanswered dispute resolves against the claimant
    pub dispute_timeout_secs: u64,
    /// Cell values scored as blank
    pub blank_sentinels: Vec<String>,
    /// Maximum fragments per chunked validation
    pub max_total_chunks: u32,
    /// Maximum payload bytes buffered per chunked validation
    pub max_assembly_bytes: usize,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Default log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let timeouts = Timeouts::default();
        NodeConfig {
            claim_timeout_secs: timeouts.claim_secs,
            dispute_timeout_secs: timeouts.dispute_secs,
            blank_sentinels: DEFAULT_BLANK_SENTINELS.iter().map(|s| s.to_string()).collect(),
            max_total_chunks: DEFAULT_MAX_TOTAL_CHUNKS,
            max_assembly_bytes: DEFAULT_MAX_ASSEMBLY_BYTES,
            log_json: false,
            log_filter: "attest=info".into(),
        }
    }
}

impl NodeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(NodeConfig::default());
        }
        let text = std::fs::read_to_string(path)?;
        NodeConfig::from_toml_str(&text)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts::new(self.claim_timeout_secs, self.dispute_timeout_secs)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            timeouts: self.timeouts(),
            blank_sentinels: self.blank_sentinels.clone(),
            assembly_limits: AssemblyLimits::new(self.max_total_chunks, self.max_assembly_bytes),
        }
    }
}
