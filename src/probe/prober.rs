//! Connectivity prober - decides whether any domain controller is reachable.
//!
//! Resolves the LDAP locator SRV records for the domain, then pings and
//! TCP-connects each target in resolution order. Without `exhaustive` the
//! first healthy target ends the probe.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::config::ProbeConfig;
use crate::probe::traits::{
    DomainControllerRecord, HostProber, ReachabilityCheck, ReachabilityResult, SrvResolver, ldap_srv_name,
};
use crate::report::Reporter;

/// Settings for the prober
#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// TCP port checked on each DC
    pub ldap_port: u16,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self { ldap_port: 389 }
    }
}

impl From<&ProbeConfig> for ProberConfig {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            ldap_port: config.ldap_port,
        }
    }
}

pub struct ConnectivityProber<R, H>
where
    R: SrvResolver,
    H: HostProber,
{
    resolver: Arc<R>,
    host_prober: Arc<H>,
    reporter: Arc<dyn Reporter>,
    config: ProberConfig,
}

impl<R, H> ConnectivityProber<R, H>
where
    R: SrvResolver,
    H: HostProber,
{
    pub fn new(resolver: Arc<R>, host_prober: Arc<H>, reporter: Arc<dyn Reporter>) -> Self {
        Self::with_config(resolver, host_prober, reporter, ProberConfig::default())
    }

    pub fn with_config(
        resolver: Arc<R>,
        host_prober: Arc<H>,
        reporter: Arc<dyn Reporter>,
        config: ProberConfig,
    ) -> Self {
        Self {
            resolver,
            host_prober,
            reporter,
            config,
        }
    }

    /// Probe the domain's controllers; true when at least one passes both checks
    pub async fn probe(&self, domain: &str, exhaustive: bool) -> bool {
        let srv_name = ldap_srv_name(domain);
        let records = match self.resolver.lookup_srv(&srv_name).await {
            Ok(records) => records,
            Err(e) => {
                debug!("SRV lookup for {} failed: {}", srv_name, e);
                Vec::new()
            }
        };

        if records.is_empty() {
            self.reporter
                .line(&format!("No domain controllers found for {}", domain));
            return false;
        }

        let mut any_reachable = false;
        for record in &records {
            let result = self.check(record).await;
            self.reporter.line(&format!(
                "Domain controller {}: ping {}, TCP {} {}",
                record.target,
                pass_fail(result.ping_ok),
                self.config.ldap_port,
                pass_fail(result.tcp_ok)
            ));

            if result.is_reachable() {
                any_reachable = true;
                if !exhaustive {
                    info!("Domain controller {} reachable, stopping probe", record.target);
                    return true;
                }
            }
        }

        if !any_reachable {
            info!("No domain controller for {} passed both checks", domain);
        }
        any_reachable
    }

    /// Ping and TCP are independent; both always run
    async fn check(&self, record: &DomainControllerRecord) -> ReachabilityResult {
        let ping_ok = self.host_prober.ping(&record.target).await;
        let tcp_ok = self
            .host_prober
            .tcp_connect(&record.target, self.config.ldap_port)
            .await;
        ReachabilityResult::new(ping_ok, tcp_ok)
    }
}

#[async_trait]
impl<R, H> ReachabilityCheck for ConnectivityProber<R, H>
where
    R: SrvResolver,
    H: HostProber,
{
    async fn is_reachable(&self, domain: &str, exhaustive: bool) -> bool {
        self.probe(domain, exhaustive).await
    }
}

fn pass_fail(ok: bool) -> &'static str {
    if ok { "ok" } else { "failed" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{JoinWatchError, Result};
    use crate::report::MemoryReporter;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockResolver {
        records: Result<Vec<DomainControllerRecord>>,
        queried: Mutex<Vec<String>>,
    }

    impl MockResolver {
        fn with_hosts(hosts: &[&str]) -> Self {
            Self {
                records: Ok(hosts.iter().map(|h| DomainControllerRecord::new(*h)).collect()),
                queried: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                records: Err(JoinWatchError::Dns("NXDOMAIN".to_string())),
                queried: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SrvResolver for MockResolver {
        async fn lookup_srv(&self, name: &str) -> Result<Vec<DomainControllerRecord>> {
            self.queried.lock().unwrap().push(name.to_string());
            match &self.records {
                Ok(records) => Ok(records.clone()),
                Err(e) => Err(JoinWatchError::Dns(e.to_string())),
            }
        }
    }

    #[derive(Default)]
    struct MockHostProber {
        health: HashMap<String, ReachabilityResult>,
        pings: Mutex<Vec<String>>,
        connects: Mutex<Vec<(String, u16)>>,
    }

    impl MockHostProber {
        fn with(mut self, host: &str, ping_ok: bool, tcp_ok: bool) -> Self {
            self.health
                .insert(host.to_string(), ReachabilityResult::new(ping_ok, tcp_ok));
            self
        }

        fn ping_count(&self) -> usize {
            self.pings.lock().unwrap().len()
        }

        fn connect_count(&self) -> usize {
            self.connects.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HostProber for MockHostProber {
        async fn ping(&self, host: &str) -> bool {
            self.pings.lock().unwrap().push(host.to_string());
            self.health.get(host).map(|r| r.ping_ok).unwrap_or(false)
        }

        async fn tcp_connect(&self, host: &str, port: u16) -> bool {
            self.connects.lock().unwrap().push((host.to_string(), port));
            self.health.get(host).map(|r| r.tcp_ok).unwrap_or(false)
        }
    }

    fn prober(
        resolver: MockResolver,
        hosts: MockHostProber,
    ) -> (
        ConnectivityProber<MockResolver, MockHostProber>,
        Arc<MockResolver>,
        Arc<MockHostProber>,
        Arc<MemoryReporter>,
    ) {
        let resolver = Arc::new(resolver);
        let hosts = Arc::new(hosts);
        let reporter = Arc::new(MemoryReporter::new());
        let prober = ConnectivityProber::new(resolver.clone(), hosts.clone(), reporter.clone());
        (prober, resolver, hosts, reporter)
    }

    #[tokio::test]
    async fn test_queries_ldap_locator_record() {
        let (prober, resolver, _, _) = prober(MockResolver::with_hosts(&[]), MockHostProber::default());
        prober.probe("corp.contoso.com", false).await;
        assert_eq!(
            resolver.queried.lock().unwrap().as_slice(),
            ["_ldap._tcp.dc._msdcs.corp.contoso.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_short_circuits_on_first_healthy_target() {
        let hosts = MockHostProber::default()
            .with("dc01", true, true)
            .with("dc02", true, true);
        let (prober, _, hosts, reporter) = prober(MockResolver::with_hosts(&["dc01", "dc02"]), hosts);

        assert!(prober.probe("corp.contoso.com", false).await);
        assert_eq!(hosts.ping_count(), 1);
        assert_eq!(hosts.connect_count(), 1);
        assert_eq!(reporter.lines().len(), 1);
        assert!(reporter.contains("dc01"));
        assert!(!reporter.contains("dc02"));
    }

    #[tokio::test]
    async fn test_exhaustive_probes_every_target() {
        let hosts = MockHostProber::default()
            .with("dc01", true, true)
            .with("dc02", false, false)
            .with("dc03", true, false);
        let (prober, _, hosts, reporter) =
            prober(MockResolver::with_hosts(&["dc01", "dc02", "dc03"]), hosts);

        assert!(prober.probe("corp.contoso.com", true).await);
        assert_eq!(hosts.ping_count(), 3);
        assert_eq!(hosts.connect_count(), 3);
        assert_eq!(reporter.lines().len(), 3);
    }

    #[tokio::test]
    async fn test_continues_past_unhealthy_targets() {
        let hosts = MockHostProber::default()
            .with("dc01", true, false)
            .with("dc02", true, true)
            .with("dc03", true, true);
        let (prober, _, hosts, _) = prober(MockResolver::with_hosts(&["dc01", "dc02", "dc03"]), hosts);

        assert!(prober.probe("corp.contoso.com", false).await);
        assert_eq!(hosts.ping_count(), 2);
    }

    #[tokio::test]
    async fn test_ping_and_tcp_run_independently() {
        let hosts = MockHostProber::default().with("dc01", false, true);
        let (prober, _, hosts, reporter) = prober(MockResolver::with_hosts(&["dc01"]), hosts);

        assert!(!prober.probe("corp.contoso.com", false).await);
        assert_eq!(hosts.ping_count(), 1);
        assert_eq!(hosts.connect_count(), 1);
        assert!(reporter.contains("ping failed"));
        assert!(reporter.contains("TCP 389 ok"));
    }

    #[tokio::test]
    async fn test_all_targets_unhealthy_fails() {
        let hosts = MockHostProber::default()
            .with("dc01", false, false)
            .with("dc02", true, false);
        let (prober, _, _, _) = prober(MockResolver::with_hosts(&["dc01", "dc02"]), hosts);

        assert!(!prober.probe("corp.contoso.com", true).await);
    }

    #[tokio::test]
    async fn test_empty_record_set_reports_no_dcs() {
        let (prober, _, hosts, reporter) = prober(MockResolver::with_hosts(&[]), MockHostProber::default());

        assert!(!prober.probe("corp.contoso.com", false).await);
        assert!(reporter.contains("No domain controllers found"));
        assert_eq!(hosts.ping_count(), 0);
    }

    #[tokio::test]
    async fn test_resolution_error_treated_as_unreachable() {
        let (prober, _, _, reporter) = prober(MockResolver::failing(), MockHostProber::default());

        assert!(!prober.probe("corp.contoso.com", false).await);
        assert!(reporter.contains("No domain controllers found"));
    }

    #[tokio::test]
    async fn test_custom_port_used_for_tcp() {
        let resolver = Arc::new(MockResolver::with_hosts(&["dc01"]));
        let hosts = Arc::new(MockHostProber::default().with("dc01", true, true));
        let prober = ConnectivityProber::with_config(
            resolver,
            hosts.clone(),
            Arc::new(MemoryReporter::new()),
            ProberConfig { ldap_port: 636 },
        );

        assert!(prober.is_reachable("corp.contoso.com", false).await);
        assert_eq!(hosts.connects.lock().unwrap()[0], ("dc01".to_string(), 636));
    }

    #[test]
    fn test_prober_config_from_probe_config() {
        let probe = ProbeConfig {
            ldap_port: 3268,
            ..ProbeConfig::default()
        };
        assert_eq!(ProberConfig::from(&probe).ldap_port, 3268);
    }
}
