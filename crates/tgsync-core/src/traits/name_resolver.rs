// # Name Resolver Trait
//
// Defines the interface for turning an endpoint hostname into the set of
// IP addresses that currently back it.
//
// ## Implementations
//
// - System resolver (getaddrinfo): `tgsync-resolver-dns` crate
// - trust-dns stub resolver with explicit nameservers: `tgsync-resolver-dns` crate
//
// ## Usage
//
// ```rust,ignore
// use tgsync_core::NameResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* NameResolver implementation */;
//
//     let ips = resolver.resolve("db-proxy.proxy-abc.us-east-1.rds.amazonaws.com").await?;
//     println!("resolved: {:?}", ips);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for name resolver implementations
///
/// # Contract
///
/// - Returns every address the name currently resolves to, deduplicated,
///   in a stable order.
/// - May return an empty list; the reconciler treats that as a failure for
///   the endpoint.
/// - Must not retry or cache across calls. Each invocation of the
///   reconciler needs fresh DNS truth.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve a hostname to its current addresses
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<IpAddr>)`: The addresses (possibly empty)
    /// - `Err(Error)`: If the lookup itself failed
    async fn resolve(&self, hostname: &str) -> Result<Vec<IpAddr>, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Helper trait for constructing name resolvers from configuration
pub trait NameResolverFactory: Send + Sync {
    /// Create a NameResolver instance from configuration
    fn create(
        &self,
        config: &crate::config::ResolverConfig,
    ) -> Result<Box<dyn NameResolver>, crate::Error>;
}
