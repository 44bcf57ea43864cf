//! Output configuration
//!
//! Configuration is supplied by the enclosing job and forwarded verbatim to
//! the bulk-load client constructor. Nothing here is parsed from disk; the
//! hosting framework owns how jobs are configured.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default mutation-buffer size at which a buffering loader flushes
pub const DEFAULT_FLUSH_THRESHOLD: usize = 1000;

/// Configuration for one edge-output job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Name of the destination graph
    pub graph_name: String,
    /// Connection endpoint for the destination store
    pub endpoint: String,
    /// Additional connection parameters, forwarded to the loader unchanged
    #[serde(default)]
    pub connection: IndexMap<String, String>,
    /// Number of buffered mutations at which the loader flushes
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
}

fn default_flush_threshold() -> usize {
    DEFAULT_FLUSH_THRESHOLD
}

impl OutputConfig {
    /// Create a configuration for the given destination graph
    pub fn new(graph_name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            graph_name: graph_name.into(),
            endpoint: endpoint.into(),
            connection: IndexMap::new(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }

    /// Set an extra connection parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.connection.insert(key.into(), value.into());
        self
    }

    /// Set the flush threshold
    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold;
        self
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new("graph", "memory://local")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = OutputConfig::new("social", "store://cluster-a")
            .with_parameter("namespace", "prod")
            .with_flush_threshold(64);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: OutputConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn flush_threshold_defaults_when_missing() {
        let parsed: OutputConfig =
            serde_json::from_str(r#"{"graph_name":"g","endpoint":"memory://local"}"#).unwrap();
        assert_eq!(parsed.flush_threshold, DEFAULT_FLUSH_THRESHOLD);
    }
}
