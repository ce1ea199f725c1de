use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 2500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }
}

impl ServerConfig {
    /// Listen on `host:port`. `host` must be an IP address.
    pub fn new(host: &str, port: u16) -> ServerResult<Self> {
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ServerError::Config(format!("invalid bind host '{host}'")))?;
        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "0.0.0.0:2500".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn host_and_port() {
        let c = ServerConfig::new("127.0.0.1", 0).unwrap();
        assert_eq!(c.bind_addr, "127.0.0.1:0".parse::<SocketAddr>().unwrap());
        assert!(ServerConfig::new("::1", 8080).is_ok());
    }

    #[test]
    fn hostname_is_rejected() {
        assert!(matches!(
            ServerConfig::new("localhost", 2500),
            Err(ServerError::Config(_))
        ));
    }
}
