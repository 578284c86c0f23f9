use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Transport used to reach an upstream resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsProtocol {
    Udp { addr: SocketAddr },
    Tcp { addr: SocketAddr },
}

impl DnsProtocol {
    pub fn socket_addr(&self) -> SocketAddr {
        match self {
            DnsProtocol::Udp { addr } | DnsProtocol::Tcp { addr } => *addr,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            DnsProtocol::Udp { .. } => "UDP",
            DnsProtocol::Tcp { .. } => "TCP",
        }
    }

    /// Same server reached over TCP, used after a truncated UDP reply.
    pub fn as_tcp(&self) -> Self {
        DnsProtocol::Tcp {
            addr: self.socket_addr(),
        }
    }
}

fn parse_socket_addr(addr_str: &str, proto: &str) -> Result<SocketAddr, String> {
    addr_str
        .parse::<SocketAddr>()
        .map_err(|_| format!("Invalid {} address '{}'", proto, addr_str))
}

impl FromStr for DnsProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(addr_str) = s.strip_prefix("udp://") {
            let addr = parse_socket_addr(addr_str, "UDP")?;
            return Ok(DnsProtocol::Udp { addr });
        }
        if let Some(addr_str) = s.strip_prefix("tcp://") {
            let addr = parse_socket_addr(addr_str, "TCP")?;
            return Ok(DnsProtocol::Tcp { addr });
        }
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(DnsProtocol::Udp { addr });
        }
        Err(format!(
            "Invalid DNS endpoint format: '{}'. Expected: udp://IP:PORT, tcp://IP:PORT, or IP:PORT",
            s
        ))
    }
}

impl fmt::Display for DnsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsProtocol::Udp { addr } => write!(f, "udp://{}", addr),
            DnsProtocol::Tcp { addr } => write!(f, "tcp://{}", addr),
        }
    }
}
