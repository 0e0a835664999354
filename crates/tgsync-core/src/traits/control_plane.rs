// # Load Balancer Control Plane Trait
//
// Defines the interface for reading and mutating the registered targets of
// a target group.
//
// ## Implementations
//
// - AWS ELBv2: `tgsync-elbv2` crate
//
// ## Usage
//
// ```rust,ignore
// use tgsync_core::{LoadBalancerControlPlane, Target};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let control_plane = /* LoadBalancerControlPlane implementation */;
//     let tg = "arn:aws:elasticloadbalancing:...:targetgroup/db/abc";
//
//     let current = control_plane.describe_targets(tg).await?;
//     control_plane
//         .register_targets(tg, &[Target::new("10.0.0.5".parse()?, Some(5432))])
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// A target registered (or to be registered) in a target group
///
/// Only `ip` takes part in reconciliation identity. `port` is carried so a
/// deregistration can address the exact registration the control plane
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Target IP address
    pub ip: IpAddr,
    /// Port override, if the registration has one
    pub port: Option<u16>,
}

impl Target {
    /// Create a new target
    pub fn new(ip: IpAddr, port: Option<u16>) -> Self {
        Self { ip, port }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ip, self.port) {
            (IpAddr::V6(ip), Some(port)) => write!(f, "[{}]:{}", ip, port),
            (ip, Some(port)) => write!(f, "{}:{}", ip, port),
            (ip, None) => write!(f, "{}", ip),
        }
    }
}

/// Trait for load-balancer control plane implementations
///
/// # Contract
///
/// - One API call per method invocation. No retry, no backoff: failures are
///   returned to the reconciler, which reports them.
/// - No caching of membership between calls.
/// - `register_targets` and `deregister_targets` are never called with an
///   empty slice by the reconciler.
#[async_trait]
pub trait LoadBalancerControlPlane: Send + Sync {
    /// List the targets currently registered in a target group
    async fn describe_targets(&self, target_group: &str) -> Result<Vec<Target>, crate::Error>;

    /// Register targets in a target group
    async fn register_targets(
        &self,
        target_group: &str,
        targets: &[Target],
    ) -> Result<(), crate::Error>;

    /// Deregister targets from a target group
    async fn deregister_targets(
        &self,
        target_group: &str,
        targets: &[Target],
    ) -> Result<(), crate::Error>;

    /// Get the control plane name (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Helper trait for constructing control planes from configuration
///
/// Creation is async: SDK-backed implementations load credentials and region
/// before the first call.
#[async_trait]
pub trait ControlPlaneFactory: Send + Sync {
    /// Create a LoadBalancerControlPlane instance from configuration
    async fn create(
        &self,
        config: &crate::config::ControlPlaneConfig,
    ) -> Result<Box<dyn LoadBalancerControlPlane>, crate::Error>;
}
