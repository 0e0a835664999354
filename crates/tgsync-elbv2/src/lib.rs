// # ELBv2 Control Plane
//
// This crate provides the AWS Elastic Load Balancing v2 implementation of
// `LoadBalancerControlPlane` for tgsync.
//
// ## Behaviour
//
// - ✅ One API call per trait method (DescribeTargetHealth, RegisterTargets,
//   DeregisterTargets)
// - ✅ Error codes mapped onto core error kinds (AccessDenied, Throttling,
//   TargetGroupNotFound)
// - ✅ Dry-run mode: reads run, writes are only logged
// - ✅ Only `ip` target groups: a non-IP target id is reported as an error
// - ✅ Draining targets are not members: they are already on their way out and
//   can be registered again
// - ❌ NO retry or backoff beyond the SDK's own transport defaults; failures
//   go back to the reconciler and surface in the invocation response
// - ❌ NO caching of membership between calls
//
// ## Credentials
//
// Region and credentials come from the standard SDK provider chain
// (environment, profile, instance/task role). Nothing is read or logged here.
//
// ## API Reference
//
// - DescribeTargetHealth: https://docs.aws.amazon.com/elasticloadbalancing/latest/APIReference/API_DescribeTargetHealth.html
// - RegisterTargets: https://docs.aws.amazon.com/elasticloadbalancing/latest/APIReference/API_RegisterTargets.html
// - DeregisterTargets: https://docs.aws.amazon.com/elasticloadbalancing/latest/APIReference/API_DeregisterTargets.html

use async_trait::async_trait;
use aws_sdk_elasticloadbalancingv2 as elbv2;
use elbv2::error::{DisplayErrorContext, ProvideErrorMetadata};
use elbv2::types::{TargetDescription, TargetHealthDescription, TargetHealthStateEnum};
use std::net::IpAddr;
use tgsync_core::config::ControlPlaneConfig;
use tgsync_core::traits::{ControlPlaneFactory, LoadBalancerControlPlane, Target};
use tgsync_core::{BackendRegistry, Error, Result};

/// ELBv2 control plane
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the control plane will:
/// - Perform DescribeTargetHealth
/// - Log the intended RegisterTargets/DeregisterTargets payload
/// - **NOT** change target group membership
pub struct Elbv2ControlPlane {
    client: elbv2::Client,

    /// Dry-run mode: if true, describe but skip register/deregister
    dry_run: bool,
}

impl std::fmt::Debug for Elbv2ControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Elbv2ControlPlane")
            .field("region", &self.client.config().region())
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Elbv2ControlPlane {
    /// Wrap an existing SDK client
    pub fn new(client: elbv2::Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Build a client from the SDK default provider chain
    ///
    /// # Parameters
    ///
    /// - `region`: Region override; the provider chain decides when `None`
    /// - `dry_run`: If true, skip register/deregister calls
    pub async fn from_env(region: Option<String>, dry_run: bool) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;

        Self::new(elbv2::Client::new(&sdk_config), dry_run)
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn mode(&self) -> &'static str {
        if self.dry_run { "DRY-RUN" } else { "LIVE" }
    }
}

#[async_trait]
impl LoadBalancerControlPlane for Elbv2ControlPlane {
    async fn describe_targets(&self, target_group: &str) -> Result<Vec<Target>> {
        tracing::debug!("DescribeTargetHealth {}", target_group);

        let output = self
            .client
            .describe_target_health()
            .target_group_arn(target_group)
            .send()
            .await
            .map_err(|e| {
                classify(
                    "DescribeTargetHealth",
                    target_group,
                    e.code(),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        output
            .target_health_descriptions()
            .iter()
            .filter(|description| !is_draining(description))
            .filter_map(|description| description.target())
            .map(|target| parse_target(target_group, target.id(), target.port()))
            .collect()
    }

    async fn register_targets(&self, target_group: &str, targets: &[Target]) -> Result<()> {
        tracing::info!(
            "Registering {} target(s) in {} [mode: {}]",
            targets.len(),
            target_group,
            self.mode()
        );

        if self.dry_run {
            tracing::warn!(
                "[DRY-RUN] Would send RegisterTargets for {} with targets: {}",
                target_group,
                format_targets(targets)
            );
            return Ok(());
        }

        self.client
            .register_targets()
            .target_group_arn(target_group)
            .set_targets(Some(to_descriptions(targets)))
            .send()
            .await
            .map_err(|e| {
                classify(
                    "RegisterTargets",
                    target_group,
                    e.code(),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(())
    }

    async fn deregister_targets(&self, target_group: &str, targets: &[Target]) -> Result<()> {
        tracing::info!(
            "Deregistering {} target(s) from {} [mode: {}]",
            targets.len(),
            target_group,
            self.mode()
        );

        if self.dry_run {
            tracing::warn!(
                "[DRY-RUN] Would send DeregisterTargets for {} with targets: {}",
                target_group,
                format_targets(targets)
            );
            return Ok(());
        }

        self.client
            .deregister_targets()
            .target_group_arn(target_group)
            .set_targets(Some(to_descriptions(targets)))
            .send()
            .await
            .map_err(|e| {
                classify(
                    "DeregisterTargets",
                    target_group,
                    e.code(),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "elbv2"
    }
}

/// Map an ELBv2 error code onto a core error kind
fn classify(operation: &str, target_group: &str, code: Option<&str>, detail: String) -> Error {
    let message = format!("{} on {} failed: {}", operation, target_group, detail);

    match code {
        Some(
            "AccessDenied" | "AccessDeniedException" | "UnauthorizedOperation"
            | "InvalidClientTokenId" | "ExpiredToken",
        ) => Error::auth(message),
        Some("Throttling" | "ThrottlingException" | "RequestLimitExceeded") => {
            Error::rate_limited(message)
        }
        Some("TargetGroupNotFound") => Error::not_found(message),
        _ => Error::control_plane(message),
    }
}

/// Convert a reported target into a core target
///
/// Instance, Lambda and ALB targets have non-IP ids and cannot be reconciled
/// against DNS.
fn parse_target(target_group: &str, id: Option<&str>, port: Option<i32>) -> Result<Target> {
    let id = id.ok_or_else(|| {
        Error::control_plane(format!(
            "Target group {} reported a target without an id",
            target_group
        ))
    })?;

    let ip: IpAddr = id.parse().map_err(|_| {
        Error::control_plane(format!(
            "Target group {} holds non-IP target '{}'; only ip target groups are supported",
            target_group, id
        ))
    })?;

    Ok(Target::new(ip, port.and_then(|p| u16::try_from(p).ok())))
}

/// Whether ELBv2 is still draining a deregistered target
fn is_draining(description: &TargetHealthDescription) -> bool {
    description.target_health().and_then(|health| health.state())
        == Some(&TargetHealthStateEnum::Draining)
}

fn to_descriptions(targets: &[Target]) -> Vec<TargetDescription> {
    targets
        .iter()
        .map(|target| {
            TargetDescription::builder()
                .id(target.ip.to_string())
                .set_port(target.port.map(i32::from))
                .build()
        })
        .collect()
}

fn format_targets(targets: &[Target]) -> String {
    let joined: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
    format!("[{}]", joined.join(", "))
}

/// Factory for creating ELBv2 control planes
pub struct Elbv2Factory;

#[async_trait]
impl ControlPlaneFactory for Elbv2Factory {
    async fn create(&self, config: &ControlPlaneConfig) -> Result<Box<dyn LoadBalancerControlPlane>> {
        match config {
            ControlPlaneConfig::Elbv2 { region, dry_run } => {
                if *dry_run {
                    tracing::warn!(
                        "ELBv2 control plane running in DRY-RUN mode - no targets will be changed"
                    );
                }

                Ok(Box::new(
                    Elbv2ControlPlane::from_env(region.clone(), *dry_run).await,
                ))
            }
            _ => Err(Error::config("Invalid config for ELBv2 control plane")),
        }
    }
}

/// Register the ELBv2 control plane with a registry
///
/// # Example
///
/// ```rust
/// use tgsync_core::BackendRegistry;
///
/// let registry = BackendRegistry::new();
/// tgsync_elbv2::register(&registry);
/// assert!(registry.has_control_plane("elbv2"));
/// ```
pub fn register(registry: &BackendRegistry) {
    registry.register_control_plane("elbv2", std::sync::Arc::new(Elbv2Factory));
}
