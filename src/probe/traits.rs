//! Capability traits for domain controller discovery and reachability.

use crate::error::Result;
use async_trait::async_trait;

/// A domain controller found through the directory locator SRV records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainControllerRecord {
    /// Host name, without the trailing root dot
    pub target: String,
    pub port: u16,
    pub priority: u16,
    pub weight: u16,
}

impl DomainControllerRecord {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            port: 389,
            priority: 0,
            weight: 100,
        }
    }
}

/// Ping and TCP outcome for one domain controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReachabilityResult {
    pub ping_ok: bool,
    pub tcp_ok: bool,
}

impl ReachabilityResult {
    pub fn new(ping_ok: bool, tcp_ok: bool) -> Self {
        Self { ping_ok, tcp_ok }
    }

    /// A DC only counts when both checks pass
    pub fn is_reachable(&self) -> bool {
        self.ping_ok && self.tcp_ok
    }
}

/// Name of the LDAP locator SRV record for a domain
pub fn ldap_srv_name(domain: &str) -> String {
    format!("_ldap._tcp.dc._msdcs.{}", domain.trim().trim_end_matches('.'))
}

/// Resolves SRV records
#[async_trait]
pub trait SrvResolver: Send + Sync {
    /// Look up `name`, returning targets in resolution order
    async fn lookup_srv(&self, name: &str) -> Result<Vec<DomainControllerRecord>>;
}

/// Low-level reachability checks against a single host
#[async_trait]
pub trait HostProber: Send + Sync {
    /// ICMP echo with a fixed probe count
    async fn ping(&self, host: &str) -> bool;

    /// TCP connect to `host:port`
    async fn tcp_connect(&self, host: &str, port: u16) -> bool;
}

/// Answers "can a domain controller be reached right now"
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    async fn is_reachable(&self, domain: &str, exhaustive: bool) -> bool;
}
