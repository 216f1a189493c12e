//! Connectivity prober
//!
//! Finds the domain's controllers through DNS and checks whether any of them
//! answers ping and LDAP TCP connects.

pub mod prober;
pub mod system;
pub mod traits;

pub use prober::{ConnectivityProber, ProberConfig};
pub use system::{HickoryResolver, SystemHostProber};
pub use traits::{
    DomainControllerRecord, HostProber, ReachabilityCheck, ReachabilityResult, SrvResolver, ldap_srv_name,
};
