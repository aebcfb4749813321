//! Configuration for the cdpwalk crawler.

use std::time::Duration;

use serde::Deserialize;

/// Top-level crawl configuration.
///
/// Loaded from `cdpwalk.toml` `[crawl]` section or
/// `CDPWALK__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// SNMP community string (read-only credential).
    #[serde(default = "default_community")]
    pub community: String,

    /// UDP port SNMP agents listen on.
    #[serde(default = "default_snmp_port")]
    pub snmp_port: u16,

    /// Per-request timeout in milliseconds. A request past this is a
    /// terminal timeout for the visit, never retried.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Capability substrings that keep a neighbor out of the visit queue.
    /// Matching is case-sensitive and unanchored.
    #[serde(default = "default_ignore_list")]
    pub ignore_list: Vec<String>,

    /// Directory the baseline/current snapshots are written to.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
}

impl CrawlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_community() -> String {
    "public".to_string()
}

fn default_snmp_port() -> u16 {
    161
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_ignore_list() -> Vec<String> {
    // Endpoints that advertise CDP but are not worth crawling.
    vec!["Cisco IP Phone".to_string(), "AIR-".to_string()]
}

fn default_snapshot_dir() -> String {
    ".".to_string()
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            community: default_community(),
            snmp_port: default_snmp_port(),
            timeout_ms: default_timeout_ms(),
            ignore_list: default_ignore_list(),
            snapshot_dir: default_snapshot_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrawlConfig::default();
        assert_eq!(config.community, "public");
        assert_eq!(config.snmp_port, 161);
        assert_eq!(config.timeout_ms, 2000);
        assert_eq!(config.snapshot_dir, ".");
        assert!(!config.ignore_list.is_empty());
    }

    #[test]
    fn test_timeout_duration() {
        let config = CrawlConfig {
            timeout_ms: 500,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_millis(500));
    }
}
