use crate::DnsProtocol;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Tried in order; the next one is used only when the previous fails to answer.
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl UpstreamConfig {
    pub fn protocols(&self) -> Result<Vec<DnsProtocol>, String> {
        self.servers.iter().map(|s| s.parse()).collect()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

fn default_servers() -> Vec<String> {
    vec!["8.8.8.8:53".to_string(), "1.1.1.1:53".to_string()]
}

fn default_query_timeout_ms() -> u64 {
    2000
}
