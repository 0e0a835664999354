//! Configuration types for tgsync
//!
//! The configuration is an explicit struct validated once at startup.
//! Invalid or missing fields fail construction, before any network call.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;

/// Single target group reference
pub const ENV_TARGET_GROUP_ARN: &str = "TARGET_GROUP_ARN";
/// JSON array of target group references
pub const ENV_TARGET_GROUPS: &str = "TARGET_GROUPS";
/// Single endpoint hostname
pub const ENV_ENDPOINT: &str = "RDS_PROXY_ENDPOINT";
/// JSON array of endpoint hostnames
pub const ENV_ENDPOINTS: &str = "RDS_PROXY_ENDPOINTS";
/// Backend port used when registering targets
pub const ENV_TARGET_PORT: &str = "TARGET_PORT";
/// `fail_fast` or `best_effort`
pub const ENV_RECONCILE_MODE: &str = "RECONCILE_MODE";
/// `cross_product` or `one_to_one`
pub const ENV_RECONCILE_PAIRING: &str = "RECONCILE_PAIRING";
/// `system` or `dns`
pub const ENV_RESOLVER_TYPE: &str = "RESOLVER_TYPE";
/// Comma-separated nameserver IPs for the `dns` resolver
pub const ENV_RESOLVER_NAMESERVERS: &str = "RESOLVER_NAMESERVERS";
/// `v4`, `v6` or `both`
pub const ENV_RESOLVER_IP_FAMILY: &str = "RESOLVER_IP_FAMILY";
/// Control plane backend name
pub const ENV_CONTROL_PLANE_TYPE: &str = "CONTROL_PLANE_TYPE";
/// Region override for the elbv2 control plane
pub const ENV_AWS_REGION: &str = "AWS_REGION";
/// `dry-run` disables mutation calls
pub const ENV_MODE: &str = "TGSYNC_MODE";

/// Default backend port (PostgreSQL)
pub const DEFAULT_TARGET_PORT: u16 = 5432;

/// Main reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Target group references to reconcile, in processing order
    pub target_groups: Vec<String>,

    /// Endpoint hostnames whose resolution is the desired state
    pub endpoints: Vec<String>,

    /// Port bound to newly registered targets
    #[serde(default = "default_target_port")]
    pub target_port: u16,

    /// What to do after a failed (target group, endpoint) pair
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// How endpoints map onto target groups
    #[serde(default)]
    pub pairing: Pairing,

    /// Name resolver backend
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Control plane backend
    #[serde(default)]
    pub control_plane: ControlPlaneConfig,
}

impl ReconcilerConfig {
    /// Create a configuration with defaults for everything but the two lists
    pub fn new(target_groups: Vec<String>, endpoints: Vec<String>) -> Self {
        Self {
            target_groups,
            endpoints,
            target_port: DEFAULT_TARGET_PORT,
            failure_policy: FailurePolicy::default(),
            pairing: Pairing::default(),
            resolver: ResolverConfig::default(),
            control_plane: ControlPlaneConfig::default(),
        }
    }

    /// Set the failure policy
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Set the endpoint pairing
    pub fn with_pairing(mut self, pairing: Pairing) -> Self {
        self.pairing = pairing;
        self
    }

    /// Set the registration port
    pub fn with_target_port(mut self, target_port: u16) -> Self {
        self.target_port = target_port;
        self
    }

    /// Load and validate configuration from the process environment
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load and validate configuration from an arbitrary key lookup
    ///
    /// List variables win over their single-value forms when both are set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_groups = read_list(&lookup, ENV_TARGET_GROUPS, ENV_TARGET_GROUP_ARN)?;
        let endpoints = read_list(&lookup, ENV_ENDPOINTS, ENV_ENDPOINT)?;

        let target_port = match lookup(ENV_TARGET_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                crate::Error::config(format!("{} '{}' is not a valid port: {}", ENV_TARGET_PORT, raw, e))
            })?,
            None => DEFAULT_TARGET_PORT,
        };

        let failure_policy = parse_or_default(&lookup, ENV_RECONCILE_MODE)?;
        let pairing = parse_or_default(&lookup, ENV_RECONCILE_PAIRING)?;
        let ip_family: IpFamily = parse_or_default(&lookup, ENV_RESOLVER_IP_FAMILY)?;

        let resolver_type = lookup(ENV_RESOLVER_TYPE).unwrap_or_else(|| "system".to_string());
        let resolver = match resolver_type.trim() {
            "system" => {
                if lookup(ENV_RESOLVER_NAMESERVERS).is_some_and(|raw| !raw.trim().is_empty()) {
                    return Err(crate::Error::config(format!(
                        "{} is only used with {}=dns; the system resolver reads /etc/resolv.conf",
                        ENV_RESOLVER_NAMESERVERS, ENV_RESOLVER_TYPE
                    )));
                }
                ResolverConfig::System { ip_family }
            }
            "dns" => {
                let nameservers = match lookup(ENV_RESOLVER_NAMESERVERS) {
                    Some(raw) => parse_nameservers(&raw)?,
                    None => Vec::new(),
                };
                ResolverConfig::Dns {
                    nameservers,
                    ip_family,
                }
            }
            other => {
                return Err(crate::Error::config(format!(
                    "{} '{}' is not supported. Supported types: system, dns",
                    ENV_RESOLVER_TYPE, other
                )));
            }
        };

        let control_plane_type =
            lookup(ENV_CONTROL_PLANE_TYPE).unwrap_or_else(|| "elbv2".to_string());
        let dry_run = lookup(ENV_MODE)
            .map(|mode| mode.trim().eq_ignore_ascii_case("dry-run"))
            .unwrap_or(false);
        let control_plane = match control_plane_type.trim() {
            "elbv2" => ControlPlaneConfig::Elbv2 {
                region: lookup(ENV_AWS_REGION).filter(|r| !r.trim().is_empty()),
                dry_run,
            },
            other => {
                return Err(crate::Error::config(format!(
                    "{} '{}' is not supported. Supported types: elbv2",
                    ENV_CONTROL_PLANE_TYPE, other
                )));
            }
        };

        let config = Self {
            target_groups,
            endpoints,
            target_port,
            failure_policy,
            pairing,
            resolver,
            control_plane,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.target_groups.is_empty() {
            return Err(crate::Error::config(format!(
                "No target groups configured. Set {} or {}",
                ENV_TARGET_GROUPS, ENV_TARGET_GROUP_ARN
            )));
        }

        if self.endpoints.is_empty() {
            return Err(crate::Error::config(format!(
                "No endpoints configured. Set {} or {}",
                ENV_ENDPOINTS, ENV_ENDPOINT
            )));
        }

        for target_group in &self.target_groups {
            if target_group.trim().is_empty() {
                return Err(crate::Error::config("Target group reference cannot be empty"));
            }
        }

        for endpoint in &self.endpoints {
            validate_hostname(endpoint)?;
        }

        if self.target_port == 0 {
            return Err(crate::Error::config("Target port must be > 0"));
        }

        if self.pairing == Pairing::OneToOne && self.target_groups.len() != self.endpoints.len() {
            return Err(crate::Error::config(format!(
                "one_to_one pairing needs as many endpoints as target groups ({} endpoints, {} target groups)",
                self.endpoints.len(),
                self.target_groups.len()
            )));
        }

        self.resolver.validate()?;
        self.control_plane.validate()?;

        Ok(())
    }
}

/// Policy applied when a (target group, endpoint) pair fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failed pair
    #[default]
    FailFast,
    /// Attempt every target group and aggregate the results
    BestEffort,
}

impl FromStr for FailurePolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "best_effort" => Ok(Self::BestEffort),
            other => Err(crate::Error::config(format!(
                "{} '{}' is not valid. Valid modes: fail_fast, best_effort",
                ENV_RECONCILE_MODE, other
            ))),
        }
    }
}

/// Mapping between configured endpoints and target groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    /// Every endpoint feeds every target group
    #[default]
    CrossProduct,
    /// `endpoints[i]` feeds `target_groups[i]`
    OneToOne,
}

impl FromStr for Pairing {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cross_product" => Ok(Self::CrossProduct),
            "one_to_one" => Ok(Self::OneToOne),
            other => Err(crate::Error::config(format!(
                "{} '{}' is not valid. Valid pairings: cross_product, one_to_one",
                ENV_RECONCILE_PAIRING, other
            ))),
        }
    }
}

/// Address family kept from resolution results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    /// IPv4 only
    #[default]
    V4,
    /// IPv6 only
    V6,
    /// Both IPv4 and IPv6
    Both,
}

impl IpFamily {
    /// Whether an address belongs to this family
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            IpFamily::V4 => ip.is_ipv4(),
            IpFamily::V6 => ip.is_ipv6(),
            IpFamily::Both => true,
        }
    }
}

impl FromStr for IpFamily {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v4" | "ipv4" => Ok(Self::V4),
            "v6" | "ipv6" => Ok(Self::V6),
            "both" => Ok(Self::Both),
            other => Err(crate::Error::config(format!(
                "{} '{}' is not valid. Valid families: v4, v6, both",
                ENV_RESOLVER_IP_FAMILY, other
            ))),
        }
    }
}

/// Name resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// Operating system resolver (getaddrinfo, honours /etc/hosts)
    System {
        /// Address family to keep
        #[serde(default)]
        ip_family: IpFamily,
    },

    /// trust-dns stub resolver
    Dns {
        /// Nameservers to query; empty means the system configuration
        #[serde(default)]
        nameservers: Vec<IpAddr>,
        /// Address family to keep
        #[serde(default)]
        ip_family: IpFamily,
    },

    /// Custom resolver
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ResolverConfig::Custom { factory, .. } if factory.is_empty() => Err(
                crate::Error::config("Custom resolver factory cannot be empty"),
            ),
            _ => Ok(()),
        }
    }

    /// Get the resolver type name
    pub fn type_name(&self) -> &str {
        match self {
            ResolverConfig::System { .. } => "system",
            ResolverConfig::Dns { .. } => "dns",
            ResolverConfig::Custom { factory, .. } => factory,
        }
    }

    /// Address family kept from lookups
    pub fn ip_family(&self) -> IpFamily {
        match self {
            ResolverConfig::System { ip_family } | ResolverConfig::Dns { ip_family, .. } => {
                *ip_family
            }
            ResolverConfig::Custom { .. } => IpFamily::Both,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::System {
            ip_family: IpFamily::default(),
        }
    }
}

/// Control plane configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlPlaneConfig {
    /// AWS Elastic Load Balancing v2
    Elbv2 {
        /// Region override; the SDK default chain applies when unset
        region: Option<String>,
        /// Perform reads but only log intended writes
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom control plane
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ControlPlaneConfig {
    /// Validate the control plane configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ControlPlaneConfig::Elbv2 {
                region: Some(region),
                ..
            } if region.trim().is_empty() => {
                Err(crate::Error::config("ELBv2 region cannot be empty"))
            }
            ControlPlaneConfig::Custom { factory, .. } if factory.is_empty() => Err(
                crate::Error::config("Custom control plane factory cannot be empty"),
            ),
            _ => Ok(()),
        }
    }

    /// Get the control plane type name
    pub fn type_name(&self) -> &str {
        match self {
            ControlPlaneConfig::Elbv2 { .. } => "elbv2",
            ControlPlaneConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        ControlPlaneConfig::Elbv2 {
            region: None,
            dry_run: false,
        }
    }
}

fn default_target_port() -> u16 {
    DEFAULT_TARGET_PORT
}

/// Read a JSON list variable, falling back to a single-value variable
fn read_list<F>(lookup: &F, list_key: &str, single_key: &str) -> Result<Vec<String>, crate::Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(list_key) {
        let values: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
            crate::Error::config(format!(
                "{} must be a JSON array of strings: {}",
                list_key, e
            ))
        })?;
        return Ok(values.into_iter().map(|v| v.trim().to_string()).collect());
    }

    Ok(lookup(single_key)
        .map(|v| vec![v.trim().to_string()])
        .unwrap_or_default())
}

fn parse_or_default<F, T>(lookup: &F, key: &str) -> Result<T, crate::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr<Err = crate::Error> + Default,
{
    match lookup(key) {
        Some(raw) => raw.parse(),
        None => Ok(T::default()),
    }
}

fn parse_nameservers(raw: &str) -> Result<Vec<IpAddr>, crate::Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>().map_err(|e| {
                crate::Error::config(format!(
                    "{} entry '{}' is not an IP address: {}",
                    ENV_RESOLVER_NAMESERVERS, s, e
                ))
            })
        })
        .collect()
}

/// Validate that a string is a usable DNS hostname
///
/// Basic RFC 1035 checks; a single trailing dot is accepted.
pub fn validate_hostname(hostname: &str) -> Result<(), crate::Error> {
    let name = hostname.strip_suffix('.').unwrap_or(hostname);

    if name.is_empty() {
        return Err(crate::Error::config("Endpoint hostname cannot be empty"));
    }

    if name.len() > 253 {
        return Err(crate::Error::config(format!(
            "Endpoint hostname too long: {} chars (max 253). Got: {}",
            name.len(),
            name
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Endpoint hostname has empty label: '{}'",
                hostname
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Endpoint hostname label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Endpoint hostname label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Endpoint hostname label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TG_A: &str = "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/db-a/0123456789abcdef";
    const TG_B: &str = "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/db-b/fedcba9876543210";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_single_value_variables() {
        let config = ReconcilerConfig::from_lookup(lookup_from(&[
            (ENV_TARGET_GROUP_ARN, TG_A),
            (ENV_ENDPOINT, "db-proxy.proxy-abc123.us-east-1.rds.amazonaws.com"),
        ]))
        .unwrap();

        assert_eq!(config.target_groups, vec![TG_A.to_string()]);
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.target_port, 5432);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.pairing, Pairing::CrossProduct);
        assert_eq!(config.resolver.type_name(), "system");
        assert_eq!(config.resolver.ip_family(), IpFamily::V4);
        assert!(matches!(
            config.control_plane,
            ControlPlaneConfig::Elbv2 { dry_run: false, .. }
        ));
    }

    #[test]
    fn test_list_variables_win_over_single() {
        let groups = format!(r#"["{}", "{}"]"#, TG_A, TG_B);
        let config = ReconcilerConfig::from_lookup(lookup_from(&[
            (ENV_TARGET_GROUPS, groups.as_str()),
            (ENV_TARGET_GROUP_ARN, "ignored"),
            (ENV_ENDPOINTS, r#"["a.example.com", "b.example.com"]"#),
        ]))
        .unwrap();

        assert_eq!(config.target_groups, vec![TG_A.to_string(), TG_B.to_string()]);
        assert_eq!(config.endpoints, vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn test_missing_target_groups() {
        let err = ReconcilerConfig::from_lookup(lookup_from(&[(ENV_ENDPOINT, "a.example.com")]))
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("No target groups"));
    }

    #[test]
    fn test_missing_endpoints() {
        let err = ReconcilerConfig::from_lookup(lookup_from(&[(ENV_TARGET_GROUP_ARN, TG_A)]))
            .unwrap_err();
        assert!(err.to_string().contains("No endpoints"));
    }

    #[test]
    fn test_malformed_json_list() {
        let err = ReconcilerConfig::from_lookup(lookup_from(&[
            (ENV_TARGET_GROUPS, TG_A),
            (ENV_ENDPOINT, "a.example.com"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }

    #[test]
    fn test_invalid_hostname_rejected() {
        let err = ReconcilerConfig::from_lookup(lookup_from(&[
            (ENV_TARGET_GROUP_ARN, TG_A),
            (ENV_ENDPOINT, "bad_host.example.com"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("invalid characters"));
    }

    #[test]
    fn test_optional_settings() {
        let config = ReconcilerConfig::from_lookup(lookup_from(&[
            (ENV_TARGET_GROUP_ARN, TG_A),
            (ENV_ENDPOINT, "a.example.com"),
            (ENV_TARGET_PORT, "3306"),
            (ENV_RECONCILE_MODE, "best-effort"),
            (ENV_RESOLVER_TYPE, "dns"),
            (ENV_RESOLVER_NAMESERVERS, "10.0.0.2, 10.0.0.3"),
            (ENV_RESOLVER_IP_FAMILY, "both"),
            (ENV_AWS_REGION, "eu-west-1"),
            (ENV_MODE, "DRY-RUN"),
        ]))
        .unwrap();

        assert_eq!(config.target_port, 3306);
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
        match &config.resolver {
            ResolverConfig::Dns {
                nameservers,
                ip_family,
            } => {
                assert_eq!(nameservers.len(), 2);
                assert_eq!(*ip_family, IpFamily::Both);
            }
            other => panic!("unexpected resolver config: {:?}", other),
        }
        match &config.control_plane {
            ControlPlaneConfig::Elbv2 { region, dry_run } => {
                assert_eq!(region.as_deref(), Some("eu-west-1"));
                assert!(*dry_run);
            }
            other => panic!("unexpected control plane config: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_enums_and_port() {
        let base = [(ENV_TARGET_GROUP_ARN, TG_A), (ENV_ENDPOINT, "a.example.com")];

        for (key, value) in [
            (ENV_TARGET_PORT, "0"),
            (ENV_TARGET_PORT, "70000"),
            (ENV_RECONCILE_MODE, "sometimes"),
            (ENV_RECONCILE_PAIRING, "zip"),
            (ENV_RESOLVER_TYPE, "mdns"),
            (ENV_RESOLVER_IP_FAMILY, "v5"),
            (ENV_CONTROL_PLANE_TYPE, "nlb"),
        ] {
            let mut pairs = base.to_vec();
            pairs.push((key, value));
            let result = ReconcilerConfig::from_lookup(lookup_from(&pairs));
            assert!(result.is_err(), "{}={} should be rejected", key, value);
        }
    }

    #[test]
    fn test_nameservers_require_dns_resolver() {
        let err = ReconcilerConfig::from_lookup(lookup_from(&[
            (ENV_TARGET_GROUP_ARN, TG_A),
            (ENV_ENDPOINT, "a.example.com"),
            (ENV_RESOLVER_NAMESERVERS, "10.0.0.2"),
        ]))
        .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(ENV_RESOLVER_NAMESERVERS));

        // An empty value is the same as unset
        let config = ReconcilerConfig::from_lookup(lookup_from(&[
            (ENV_TARGET_GROUP_ARN, TG_A),
            (ENV_ENDPOINT, "a.example.com"),
            (ENV_RESOLVER_TYPE, "system"),
            (ENV_RESOLVER_NAMESERVERS, " "),
        ]))
        .unwrap();
        assert_eq!(config.resolver.type_name(), "system");
    }

    #[test]
    fn test_one_to_one_requires_equal_lengths() {
        let config = ReconcilerConfig::new(
            vec![TG_A.to_string(), TG_B.to_string()],
            vec!["a.example.com".to_string()],
        )
        .with_pairing(Pairing::OneToOne);
        assert!(config.validate().is_err());

        let config = config.with_pairing(Pairing::CrossProduct);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_hostname() {
        assert!(validate_hostname("db-proxy.proxy-c56qui4s6a17.us-east-1.rds.amazonaws.com").is_ok());
        assert!(validate_hostname("example.com.").is_ok());
        assert!(validate_hostname("").is_err());
        assert!(validate_hostname("a..b").is_err());
        assert!(validate_hostname("-a.example.com").is_err());
        assert!(validate_hostname(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn test_ip_family_matches() {
        let v4: IpAddr = "10.0.0.1".parse().unwrap();
        let v6: IpAddr = "fd00::1".parse().unwrap();

        assert!(IpFamily::V4.matches(&v4));
        assert!(!IpFamily::V4.matches(&v6));
        assert!(IpFamily::V6.matches(&v6));
        assert!(IpFamily::Both.matches(&v4) && IpFamily::Both.matches(&v6));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ReconcilerConfig = serde_json::from_value(serde_json::json!({
            "target_groups": [TG_A],
            "endpoints": ["a.example.com"],
            "resolver": { "type": "dns", "nameservers": ["1.1.1.1"] },
        }))
        .unwrap();

        assert_eq!(config.target_port, DEFAULT_TARGET_PORT);
        assert_eq!(config.resolver.type_name(), "dns");
        assert_eq!(config.control_plane.type_name(), "elbv2");
        assert!(config.validate().is_ok());
    }
}
