//! Probe capabilities backed by the operating system.
//!
//! SRV lookups go through hickory's resolver with the system configuration,
//! pings shell out to the platform `ping`, TCP checks use tokio sockets.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use log::{debug, warn};
use tokio::net::TcpStream;
use tokio::process::Command;

use crate::config::ProbeConfig;
use crate::error::{JoinWatchError, Result};
use crate::probe::traits::{DomainControllerRecord, HostProber, SrvResolver};

/// SRV resolver using the host's DNS configuration
pub struct HickoryResolver {
    resolver: Option<TokioAsyncResolver>,
}

impl HickoryResolver {
    /// Build from the system DNS configuration. If it cannot be read, every
    /// lookup fails and the prober reports the domain as unreachable.
    pub fn from_system_conf() -> Self {
        match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => Self {
                resolver: Some(resolver),
            },
            Err(e) => {
                warn!("Failed to read system DNS config: {}", e);
                Self { resolver: None }
            }
        }
    }
}

#[async_trait]
impl SrvResolver for HickoryResolver {
    async fn lookup_srv(&self, name: &str) -> Result<Vec<DomainControllerRecord>> {
        let Some(resolver) = &self.resolver else {
            return Err(JoinWatchError::Dns("no system DNS configuration".to_string()));
        };
        let lookup = resolver
            .srv_lookup(name)
            .await
            .map_err(|e| JoinWatchError::Dns(format!("{}: {}", name, e)))?;

        Ok(lookup
            .iter()
            .map(|srv| DomainControllerRecord {
                target: srv.target().to_utf8().trim_end_matches('.').to_string(),
                port: srv.port(),
                priority: srv.priority(),
                weight: srv.weight(),
            })
            .collect())
    }
}

/// Ping + TCP checks against real hosts
pub struct SystemHostProber {
    ping_count: u32,
    timeout: Duration,
}

impl SystemHostProber {
    pub fn new(ping_count: u32, timeout: Duration) -> Self {
        Self {
            ping_count: ping_count.max(1),
            timeout,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.ping_count, config.connect_timeout())
    }

    fn ping_command(&self, host: &str) -> Command {
        let mut cmd = Command::new("ping");
        if cfg!(windows) {
            cmd.arg("-n")
                .arg(self.ping_count.to_string())
                .arg("-w")
                .arg(self.timeout.as_millis().to_string());
        } else {
            cmd.arg("-c")
                .arg(self.ping_count.to_string())
                .arg("-W")
                .arg(self.timeout.as_secs().max(1).to_string());
        }
        cmd.arg(host);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

#[async_trait]
impl HostProber for SystemHostProber {
    async fn ping(&self, host: &str) -> bool {
        match self.ping_command(host).status().await {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("ping {} could not run: {}", host, e);
                false
            }
        }
    }

    async fn tcp_connect(&self, host: &str, port: u16) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!("TCP connect {}:{} failed: {}", host, port, e);
                false
            }
            Err(_) => {
                debug!("TCP connect {}:{} timed out after {:?}", host, port, self.timeout);
                false
            }
        }
    }
}
