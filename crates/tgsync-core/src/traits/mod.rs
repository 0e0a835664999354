//! Capability traits consumed by the reconciler
//!
//! - [`NameResolver`]: Resolve endpoint hostnames to IP addresses
//! - [`LoadBalancerControlPlane`]: Read and mutate target group membership

pub mod control_plane;
pub mod name_resolver;

pub use control_plane::{ControlPlaneFactory, LoadBalancerControlPlane, Target};
pub use name_resolver::{NameResolver, NameResolverFactory};
