//! Test doubles and common utilities for reconciler contract tests
//!
//! The fakes record every call so tests can assert on exactly which
//! network operations a pass performed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tgsync_core::error::{Error, Result};
use tgsync_core::traits::{LoadBalancerControlPlane, NameResolver, Target};
use tgsync_core::{FailurePolicy, Pairing, ReconcilerConfig};

pub const TG_A: &str =
    "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/db-a/0123456789abcdef";
pub const TG_B: &str =
    "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/db-b/fedcba9876543210";
pub const PROXY_A: &str = "db-a.proxy-c56qui4s6a17.us-east-1.rds.amazonaws.com";
pub const PROXY_B: &str = "db-b.proxy-c56qui4s6a17.us-east-1.rds.amazonaws.com";

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid IP literal")
}

pub fn target(s: &str, port: u16) -> Target {
    Target::new(ip(s), Some(port))
}

#[derive(Clone)]
enum Answer {
    Ips(Vec<IpAddr>),
    Fail(String),
}

/// A resolver whose answers are set by the test
#[derive(Clone, Default)]
pub struct FakeResolver {
    answers: Arc<Mutex<HashMap<String, Answer>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `hostname` resolve to `ips` (empty means an empty answer)
    pub fn set(&self, hostname: &str, ips: &[&str]) {
        self.answers.lock().unwrap().insert(
            hostname.to_string(),
            Answer::Ips(ips.iter().map(|s| ip(s)).collect()),
        );
    }

    /// Make `hostname` fail with a lookup error
    pub fn fail(&self, hostname: &str, message: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(hostname.to_string(), Answer::Fail(message.to_string()));
    }

    /// Hostnames resolved so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NameResolver for FakeResolver {
    async fn resolve(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        self.calls.lock().unwrap().push(hostname.to_string());

        match self.answers.lock().unwrap().get(hostname).cloned() {
            Some(Answer::Ips(ips)) => Ok(ips),
            Some(Answer::Fail(message)) => Err(Error::resolution(message)),
            None => Err(Error::resolution(format!("NXDOMAIN: {}", hostname))),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// A control plane holding membership in memory and counting calls
#[derive(Clone, Default)]
pub struct RecordingControlPlane {
    groups: Arc<Mutex<HashMap<String, Vec<Target>>>>,
    failing: Arc<Mutex<HashMap<String, String>>>,
    describe_calls: Arc<AtomicUsize>,
    register_calls: Arc<AtomicUsize>,
    deregister_calls: Arc<AtomicUsize>,
    registered: Arc<Mutex<Vec<(String, Vec<Target>)>>>,
    deregistered: Arc<Mutex<Vec<(String, Vec<Target>)>>>,
}

impl RecordingControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registered targets of a group
    pub fn seed(&self, target_group: &str, targets: Vec<Target>) {
        self.groups
            .lock()
            .unwrap()
            .insert(target_group.to_string(), targets);
    }

    /// Make every call against `target_group` fail
    pub fn fail_group(&self, target_group: &str, message: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(target_group.to_string(), message.to_string());
    }

    /// Registered IPs of a group, sorted
    pub fn ips(&self, target_group: &str) -> Vec<IpAddr> {
        let mut ips: Vec<IpAddr> = self
            .groups
            .lock()
            .unwrap()
            .get(target_group)
            .map(|targets| targets.iter().map(|t| t.ip).collect())
            .unwrap_or_default();
        ips.sort();
        ips.dedup();
        ips
    }

    /// Registered targets of a group
    pub fn targets(&self, target_group: &str) -> Vec<Target> {
        self.groups
            .lock()
            .unwrap()
            .get(target_group)
            .cloned()
            .unwrap_or_default()
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn deregister_calls(&self) -> usize {
        self.deregister_calls.load(Ordering::SeqCst)
    }

    /// Total number of mutation calls
    pub fn mutation_calls(&self) -> usize {
        self.register_calls() + self.deregister_calls()
    }

    pub fn registered(&self) -> Vec<(String, Vec<Target>)> {
        self.registered.lock().unwrap().clone()
    }

    pub fn deregistered(&self) -> Vec<(String, Vec<Target>)> {
        self.deregistered.lock().unwrap().clone()
    }

    fn check_failing(&self, target_group: &str) -> Result<()> {
        match self.failing.lock().unwrap().get(target_group) {
            Some(message) => Err(Error::control_plane(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl LoadBalancerControlPlane for RecordingControlPlane {
    async fn describe_targets(&self, target_group: &str) -> Result<Vec<Target>> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing(target_group)?;
        Ok(self.targets(target_group))
    }

    async fn register_targets(&self, target_group: &str, targets: &[Target]) -> Result<()> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing(target_group)?;

        self.registered
            .lock()
            .unwrap()
            .push((target_group.to_string(), targets.to_vec()));
        self.groups
            .lock()
            .unwrap()
            .entry(target_group.to_string())
            .or_default()
            .extend_from_slice(targets);
        Ok(())
    }

    async fn deregister_targets(&self, target_group: &str, targets: &[Target]) -> Result<()> {
        self.deregister_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing(target_group)?;

        self.deregistered
            .lock()
            .unwrap()
            .push((target_group.to_string(), targets.to_vec()));
        if let Some(current) = self.groups.lock().unwrap().get_mut(target_group) {
            current.retain(|t| !targets.contains(t));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a config for the given groups and endpoints
pub fn config(
    target_groups: &[&str],
    endpoints: &[&str],
    failure_policy: FailurePolicy,
    pairing: Pairing,
) -> ReconcilerConfig {
    ReconcilerConfig::new(
        target_groups.iter().map(|s| s.to_string()).collect(),
        endpoints.iter().map(|s| s.to_string()).collect(),
    )
    .with_failure_policy(failure_policy)
    .with_pairing(pairing)
}

/// Helper to create a single-group, single-endpoint fail-fast config
pub fn single_config() -> ReconcilerConfig {
    config(&[TG_A], &[PROXY_A], FailurePolicy::FailFast, Pairing::CrossProduct)
}
