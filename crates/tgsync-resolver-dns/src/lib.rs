// # DNS Name Resolvers
//
// This crate provides the `NameResolver` implementations for tgsync.
//
// ## Resolvers
//
// - **system**: The operating system resolver via getaddrinfo. Honours
//   /etc/hosts and nsswitch, like the libc lookups most schedulers' runtimes use.
// - **dns**: A trust-dns stub resolver. Talks to explicit nameservers when
//   configured, otherwise reads /etc/resolv.conf.
//
// ## Constraints
//
// - One lookup per call, no retry, no caching across calls. The trust-dns
//   cache is disabled so every invocation sees fresh DNS truth.
// - Results are filtered to the configured address family, deduplicated
//   and sorted.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::net::IpAddr;
use tgsync_core::config::{IpFamily, ResolverConfig};
use tgsync_core::traits::{NameResolver, NameResolverFactory};
use tgsync_core::{BackendRegistry, Error, Result};
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{
    NameServerConfigGroup, ResolverConfig as DnsResolverConfig, ResolverOpts,
};

/// Standard DNS port
const DNS_PORT: u16 = 53;

/// Resolver backed by the operating system (getaddrinfo)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver {
    ip_family: IpFamily,
}

impl SystemResolver {
    /// Create a system resolver keeping only `ip_family` addresses
    pub fn new(ip_family: IpFamily) -> Self {
        Self { ip_family }
    }
}

#[async_trait]
impl NameResolver for SystemResolver {
    async fn resolve(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        tracing::debug!("Resolving {} via system resolver", hostname);

        let addrs = tokio::net::lookup_host((hostname, 0))
            .await
            .map_err(|e| Error::resolution(format!("lookup of {} failed: {}", hostname, e)))?;

        Ok(filter_family(addrs.map(|addr| addr.ip()), self.ip_family))
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

/// Resolver backed by trust-dns
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    ip_family: IpFamily,
}

impl std::fmt::Debug for DnsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsResolver")
            .field("ip_family", &self.ip_family)
            .finish()
    }
}

impl DnsResolver {
    /// Create a resolver querying `nameservers`, or the system configuration
    /// when the list is empty
    pub fn new(nameservers: &[IpAddr], ip_family: IpFamily) -> Result<Self> {
        let mut opts = ResolverOpts::default();
        opts.cache_size = 0;

        let resolver = if nameservers.is_empty() {
            let (config, _) = trust_dns_resolver::system_conf::read_system_conf().map_err(|e| {
                Error::config(format!("Failed to read system resolver configuration: {}", e))
            })?;
            TokioAsyncResolver::tokio(config, opts)
        } else {
            let group = NameServerConfigGroup::from_ips_clear(nameservers, DNS_PORT, true);
            TokioAsyncResolver::tokio(DnsResolverConfig::from_parts(None, vec![], group), opts)
        };

        Ok(Self {
            resolver,
            ip_family,
        })
    }
}

#[async_trait]
impl NameResolver for DnsResolver {
    async fn resolve(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        tracing::debug!("Resolving {} via trust-dns", hostname);

        // Fully qualify so search domains never apply
        let fqdn = if hostname.ends_with('.') {
            hostname.to_string()
        } else {
            format!("{}.", hostname)
        };

        let lookup = self
            .resolver
            .lookup_ip(fqdn)
            .await
            .map_err(|e| Error::resolution(format!("lookup of {} failed: {}", hostname, e)))?;

        Ok(filter_family(lookup.iter(), self.ip_family))
    }

    fn name(&self) -> &'static str {
        "dns"
    }
}

/// Keep addresses of one family, deduplicated and sorted
pub fn filter_family(ips: impl Iterator<Item = IpAddr>, ip_family: IpFamily) -> Vec<IpAddr> {
    ips.filter(|ip| ip_family.matches(ip))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Factory for the system resolver
pub struct SystemResolverFactory;

impl NameResolverFactory for SystemResolverFactory {
    fn create(&self, config: &ResolverConfig) -> Result<Box<dyn NameResolver>> {
        match config {
            ResolverConfig::System { ip_family } => Ok(Box::new(SystemResolver::new(*ip_family))),
            _ => Err(Error::config("Invalid config for system resolver")),
        }
    }
}

/// Factory for the trust-dns resolver
pub struct DnsResolverFactory;

impl NameResolverFactory for DnsResolverFactory {
    fn create(&self, config: &ResolverConfig) -> Result<Box<dyn NameResolver>> {
        match config {
            ResolverConfig::Dns {
                nameservers,
                ip_family,
            } => Ok(Box::new(DnsResolver::new(nameservers, *ip_family)?)),
            _ => Err(Error::config("Invalid config for dns resolver")),
        }
    }
}

/// Register both resolvers with a registry
///
/// # Example
///
/// ```rust
/// use tgsync_core::BackendRegistry;
///
/// let registry = BackendRegistry::new();
/// tgsync_resolver_dns::register(&registry);
/// assert!(registry.has_resolver("system"));
/// assert!(registry.has_resolver("dns"));
/// ```
pub fn register(registry: &BackendRegistry) {
    registry.register_resolver("system", Box::new(SystemResolverFactory));
    registry.register_resolver("dns", Box::new(DnsResolverFactory));
}
