use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Value of the `server` label on every metric. Derived from the DNS port when unset.
    #[serde(default)]
    pub name: Option<String>,

    /// Budget for one client request, upstream lookups included.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerConfig {
    pub fn server_label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("dns://:{}", self.dns_port),
        }
    }

    pub fn dns_bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.dns_port)
    }

    pub fn metrics_bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.metrics_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dns_port: default_dns_port(),
            metrics_port: default_metrics_port(),
            name: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_dns_port() -> u16 {
    5353
}

fn default_metrics_port() -> u16 {
    9153
}

fn default_request_timeout_ms() -> u64 {
    5000
}
