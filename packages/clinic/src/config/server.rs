use super::{DEFAULT_PORT, DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_WORKER_THREADS};
use crate::error::{ConfigError, Error};
use serde::Deserialize;
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,

    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,

    #[serde(default = "ServerConfig::default_shutdown_timeout")]
    pub shutdown_timeout: u64,

    #[serde(default = "ServerConfig::default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: ServerConfig::default_host(),
            port: ServerConfig::default_port(),
            shutdown_timeout: ServerConfig::default_shutdown_timeout(),
            worker_threads: ServerConfig::default_worker_threads(),
        }
    }
}

impl ServerConfig {
    pub fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    pub fn default_port() -> u16 {
        DEFAULT_PORT
    }

    pub fn default_shutdown_timeout() -> u64 {
        DEFAULT_SHUTDOWN_TIMEOUT
    }

    ///
    /// Default number of worker threads
    /// This is half the number of available cores or DEFAULT_WORKER_THREADS, whichever is greater
    pub fn default_worker_threads() -> usize {
        match thread::available_parallelism() {
            Ok(p) => {
                let count = p.get();
                let threads = count / 2;
                threads.max(DEFAULT_WORKER_THREADS)
            }
            Err(_) => DEFAULT_WORKER_THREADS,
        }
    }

    pub fn to_socket_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        let address = self.to_socket_address();
        let addr = address
            .parse()
            .map_err(|_| ConfigError::InvalidServerName {
                name: self.host.to_owned(),
            })?;
        Ok(addr)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;

    #[test]
    fn default_server_listens_on_all_interfaces() {
        let server = ServerConfig::default();
        assert_eq!(server.to_socket_address(), "0.0.0.0:2022");
        assert!(server.socket_addr().is_ok());
        assert!(server.worker_threads >= 4);
    }

    #[test]
    fn hostname_is_not_a_socket_addr() {
        let server = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(server.socket_addr().is_err());
    }
}
