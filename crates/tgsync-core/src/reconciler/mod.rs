//! Target group reconciler
//!
//! The Reconciler is responsible for:
//! - Resolving every configured endpoint to its current IP addresses
//! - Reading the registered targets of each target group
//! - Computing the registered-target delta against DNS truth
//! - Deregistering stale targets and registering missing ones
//!
//! ## Flow
//!
//! ```text
//!  endpoints ──► NameResolver ──► desired IP set ─┐
//!                                                 ├─► diff ─► deregister ─► register
//!  target group ─► LoadBalancerControlPlane ──────┘
//!                  (describe_targets)
//! ```
//!
//! Target groups are processed strictly in configuration order and every
//! network call is awaited before the next one starts. A target group is
//! only mutated once all endpoints mapped to it have resolved, so a partial
//! desired set never reaches the control plane. Groups that converged
//! before a later failure stay converged.

use crate::config::{FailurePolicy, Pairing, ReconcilerConfig};
use crate::error::{Error, Result};
use crate::traits::{LoadBalancerControlPlane, NameResolver, Target};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::net::IpAddr;
use tracing::{debug, error, info};

/// Outcome for one target group and the endpoint(s) that fed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Target group reference
    pub target_group: String,
    /// Endpoints this result covers; a resolution failure names only the failing one
    pub endpoints: Vec<String>,
    /// IPs newly registered
    pub added: Vec<IpAddr>,
    /// IPs deregistered
    pub removed: Vec<IpAddr>,
    /// Whether the pair converged
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
}

impl ReconciliationResult {
    fn succeeded(
        target_group: &str,
        endpoints: Vec<String>,
        diff: &TargetDiff,
        desired: &BTreeSet<IpAddr>,
    ) -> Self {
        let added = diff.registered_ips();
        let removed = diff.deregistered_ips();

        let message = if diff.is_empty() {
            format!(
                "Target group {} already up to date. Current target IPs: {}",
                target_group,
                format_ips(desired.iter())
            )
        } else {
            format!(
                "Target group {} updated. Registered IPs: {}, Deregistered IPs: {}",
                target_group,
                format_ips(added.iter()),
                format_ips(removed.iter())
            )
        };

        Self {
            target_group: target_group.to_string(),
            endpoints,
            added,
            removed,
            success: true,
            message,
        }
    }

    fn failed(target_group: &str, endpoints: Vec<String>, message: String) -> Self {
        Self {
            target_group: target_group.to_string(),
            endpoints,
            added: Vec::new(),
            removed: Vec::new(),
            success: false,
            message,
        }
    }
}

/// Ordered results of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    results: Vec<ReconciliationResult>,
}

impl ReconcileReport {
    fn push(&mut self, result: ReconciliationResult) {
        self.results.push(result);
    }

    /// All results, in processing order
    pub fn results(&self) -> &[ReconciliationResult] {
        &self.results
    }

    /// Consume the report
    pub fn into_results(self) -> Vec<ReconciliationResult> {
        self.results
    }

    /// Whether every recorded result succeeded
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    /// The first failed result, if any
    pub fn first_failure(&self) -> Option<&ReconciliationResult> {
        self.results.iter().find(|r| !r.success)
    }

    /// All failed results
    pub fn failures(&self) -> impl Iterator<Item = &ReconciliationResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Number of failed results
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Number of results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no result was recorded
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Registered-target delta for one target group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetDiff {
    /// Registered targets whose IP is no longer resolved
    pub to_deregister: Vec<Target>,
    /// Resolved IPs with no registration, bound to the configured port
    pub to_register: Vec<Target>,
}

impl TargetDiff {
    /// Whether no mutation is needed
    pub fn is_empty(&self) -> bool {
        self.to_deregister.is_empty() && self.to_register.is_empty()
    }

    fn registered_ips(&self) -> Vec<IpAddr> {
        unique_ips(&self.to_register)
    }

    fn deregistered_ips(&self) -> Vec<IpAddr> {
        unique_ips(&self.to_deregister)
    }
}

/// Compute the delta between registered targets and the desired IP set
///
/// Identity is the IP address alone. A registration on a port other than
/// `port` counts as present, and every registration of a stale IP is
/// deregistered with the port the control plane reported.
pub fn diff_targets(current: &[Target], desired: &BTreeSet<IpAddr>, port: u16) -> TargetDiff {
    let current_ips: HashSet<IpAddr> = current.iter().map(|t| t.ip).collect();

    let mut seen = HashSet::new();
    let to_deregister = current
        .iter()
        .filter(|t| !desired.contains(&t.ip))
        .filter(|t| seen.insert(**t))
        .copied()
        .collect();

    let to_register = desired
        .iter()
        .filter(|ip| !current_ips.contains(*ip))
        .map(|ip| Target::new(*ip, Some(port)))
        .collect();

    TargetDiff {
        to_deregister,
        to_register,
    }
}

/// Target group reconciler
///
/// Holds its two collaborators by injection; nothing is global. One call to
/// [`Reconciler::run`] is one full resolve → diff → update pass with no
/// state carried into the next call.
pub struct Reconciler {
    /// Resolver for endpoint hostnames
    resolver: Box<dyn NameResolver>,

    /// Control plane owning target group membership
    control_plane: Box<dyn LoadBalancerControlPlane>,

    /// Configured target groups
    target_groups: Vec<String>,

    /// Configured endpoints
    endpoints: Vec<String>,

    /// Port bound to newly registered targets
    target_port: u16,

    failure_policy: FailurePolicy,

    pairing: Pairing,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `resolver`: Name resolver implementation
    /// - `control_plane`: Control plane implementation
    /// - `config`: Reconciler configuration (validated here)
    pub fn new(
        resolver: Box<dyn NameResolver>,
        control_plane: Box<dyn LoadBalancerControlPlane>,
        config: ReconcilerConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver,
            control_plane,
            target_groups: config.target_groups,
            endpoints: config.endpoints,
            target_port: config.target_port,
            failure_policy: config.failure_policy,
            pairing: config.pairing,
        })
    }

    /// Active failure policy
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Reconcile the configured target groups against the configured endpoints
    pub async fn run(&self) -> Result<ReconcileReport> {
        self.reconcile(&self.endpoints, &self.target_groups).await
    }

    /// Reconcile `target_groups` against the resolution of `endpoints`
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: Per-group results; failures are recorded, not raised
    /// - `Err(Error)`: Only when the arguments cannot form a plan (empty
    ///   lists, mismatched one-to-one lengths)
    pub async fn reconcile(
        &self,
        endpoints: &[String],
        target_groups: &[String],
    ) -> Result<ReconcileReport> {
        let plans = plan_groups(target_groups, endpoints, self.pairing)?;
        let mut report = ReconcileReport::default();

        for plan in &plans {
            self.reconcile_group(plan, &mut report).await;

            if self.failure_policy == FailurePolicy::FailFast && !report.is_success() {
                debug!("Fail-fast: stopping after failure on target group {}", plan.target_group);
                break;
            }
        }

        if report.is_success() {
            info!("All target group registrations successfully updated");
        } else {
            error!(
                "{} of {} reconciliation(s) failed",
                report.failure_count(),
                report.len()
            );
        }

        Ok(report)
    }

    /// Resolve, diff and apply one target group
    async fn reconcile_group(&self, plan: &GroupPlan<'_>, report: &mut ReconcileReport) {
        info!(
            "Checking target registration for {:?} in target group {}",
            plan.endpoints, plan.target_group
        );

        let mut desired = BTreeSet::new();
        let mut unresolved = false;

        for endpoint in &plan.endpoints {
            match self.resolve_endpoint(endpoint).await {
                Ok(ips) => desired.extend(ips),
                Err(e) => {
                    error!("{}", e);
                    report.push(ReconciliationResult::failed(
                        plan.target_group,
                        vec![endpoint.to_string()],
                        e.to_string(),
                    ));
                    unresolved = true;

                    if self.failure_policy == FailurePolicy::FailFast {
                        return;
                    }
                }
            }
        }

        if unresolved {
            debug!(
                "Target group {} left untouched: not every endpoint resolved",
                plan.target_group
            );
            return;
        }

        let endpoints = plan.endpoints.iter().map(|e| e.to_string()).collect();

        match self.apply(plan.target_group, &desired).await {
            Ok(diff) => {
                let result =
                    ReconciliationResult::succeeded(plan.target_group, endpoints, &diff, &desired);
                info!("{}", result.message);
                report.push(result);
            }
            Err(e) => {
                error!("Error updating target registration: {}", e);
                report.push(ReconciliationResult::failed(
                    plan.target_group,
                    endpoints,
                    format!("Failed to update targets with error: {}", e),
                ));
            }
        }
    }

    /// Resolve one endpoint, treating an empty answer as a failure
    async fn resolve_endpoint(&self, endpoint: &str) -> Result<Vec<IpAddr>> {
        let ips = self.resolver.resolve(endpoint).await.map_err(|e| {
            Error::resolution(format!(
                "Error resolving IP addresses for {} via {}: {}",
                endpoint,
                self.resolver.name(),
                e
            ))
        })?;

        if ips.is_empty() {
            return Err(Error::resolution(format!(
                "No IPs found for endpoint: {}",
                endpoint
            )));
        }

        info!("Resolved IP addresses for {}: {}", endpoint, format_ips(ips.iter()));
        Ok(ips)
    }

    /// Read current membership and push the delta to the control plane
    async fn apply(&self, target_group: &str, desired: &BTreeSet<IpAddr>) -> Result<TargetDiff> {
        let current = self.control_plane.describe_targets(target_group).await?;
        let diff = diff_targets(&current, desired, self.target_port);

        debug!(
            "Target group {}: {} registered, {} to deregister, {} to register",
            target_group,
            current.len(),
            diff.to_deregister.len(),
            diff.to_register.len()
        );

        if !diff.to_deregister.is_empty() {
            info!(
                "Deregistering old target IPs: {}",
                format_ips(diff.deregistered_ips().iter())
            );
            self.control_plane
                .deregister_targets(target_group, &diff.to_deregister)
                .await?;
        }

        if !diff.to_register.is_empty() {
            info!(
                "Registering new target IPs: {}",
                format_ips(diff.registered_ips().iter())
            );
            self.control_plane
                .register_targets(target_group, &diff.to_register)
                .await?;
        }

        Ok(diff)
    }
}

/// One target group and the endpoints that feed it
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupPlan<'a> {
    target_group: &'a str,
    endpoints: Vec<&'a str>,
}

fn plan_groups<'a>(
    target_groups: &'a [String],
    endpoints: &'a [String],
    pairing: Pairing,
) -> Result<Vec<GroupPlan<'a>>> {
    if target_groups.is_empty() {
        return Err(Error::config("No target groups to reconcile"));
    }
    if endpoints.is_empty() {
        return Err(Error::config("No endpoints to reconcile against"));
    }

    match pairing {
        Pairing::CrossProduct => Ok(target_groups
            .iter()
            .map(|tg| GroupPlan {
                target_group: tg,
                endpoints: endpoints.iter().map(String::as_str).collect(),
            })
            .collect()),
        Pairing::OneToOne => {
            if target_groups.len() != endpoints.len() {
                return Err(Error::config(format!(
                    "one_to_one pairing needs as many endpoints as target groups ({} endpoints, {} target groups)",
                    endpoints.len(),
                    target_groups.len()
                )));
            }
            Ok(target_groups
                .iter()
                .zip(endpoints)
                .map(|(tg, endpoint)| GroupPlan {
                    target_group: tg,
                    endpoints: vec![endpoint.as_str()],
                })
                .collect())
        }
    }
}

fn unique_ips(targets: &[Target]) -> Vec<IpAddr> {
    targets
        .iter()
        .map(|t| t.ip)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn format_ips<'a>(ips: impl Iterator<Item = &'a IpAddr>) -> String {
    let joined: Vec<String> = ips.map(|ip| ip.to_string()).collect();
    format!("[{}]", joined.join(", "))
}
