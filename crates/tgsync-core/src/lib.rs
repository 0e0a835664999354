// # tgsync-core
//
// Core library for keeping load-balancer target groups in step with the
// DNS resolution of proxy endpoints.
//
// ## Architecture Overview
//
// - **NameResolver**: Trait for resolving endpoint hostnames to IP addresses
// - **LoadBalancerControlPlane**: Trait for reading and mutating target group membership
// - **Reconciler**: One resolve → diff → deregister/register pass per invocation
// - **handler**: Invocation entry point producing a `{statusCode, body}` response
// - **BackendRegistry**: Plugin-based registry for resolvers and control planes
//
// ## Design Principles
//
// 1. **Stateless**: Desired state is recomputed from DNS on every invocation
// 2. **Injected collaborators**: Backends are passed in, never global
// 3. **Plugin-Based**: Backends are registered by name, no hard-coded if-else
// 4. **Library-First**: The daemon is a thin wrapper around this crate
// 5. **Delta-only mutation**: Only the registered-target difference is touched

pub mod config;
pub mod error;
pub mod handler;
pub mod reconciler;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{
    ControlPlaneConfig, FailurePolicy, IpFamily, Pairing, ReconcilerConfig, ResolverConfig,
};
pub use error::{Error, Result};
pub use handler::InvocationResponse;
pub use reconciler::{ReconcileReport, ReconciliationResult, Reconciler};
pub use registry::BackendRegistry;
pub use traits::{LoadBalancerControlPlane, NameResolver, Target};
