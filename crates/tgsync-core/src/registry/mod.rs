//! Plugin-based backend registry
//!
//! The registry lets name resolvers and control planes be registered by
//! name at startup, so the binary never carries an if-else over backends.
//!
//! ## Registration
//!
//! Backend crates expose a `register` function:
//!
//! ```rust,ignore
//! use tgsync_core::BackendRegistry;
//!
//! // In tgsync-elbv2
//! pub fn register(registry: &BackendRegistry) {
//!     registry.register_control_plane("elbv2", std::sync::Arc::new(Elbv2Factory));
//! }
//! ```

use crate::config::{ControlPlaneConfig, ResolverConfig};
use crate::error::{Error, Result};
use crate::traits::{
    ControlPlaneFactory, LoadBalancerControlPlane, NameResolver, NameResolverFactory,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of resolver and control plane factories
///
/// ## Thread Safety
///
/// Interior mutability with RwLock: concurrent reads, exclusive writes.
#[derive(Default)]
pub struct BackendRegistry {
    /// Registered name resolver factories
    resolvers: RwLock<HashMap<String, Box<dyn NameResolverFactory>>>,

    /// Registered control plane factories
    control_planes: RwLock<HashMap<String, Arc<dyn ControlPlaneFactory>>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name resolver factory
    ///
    /// # Parameters
    ///
    /// - `name`: Resolver type name (e.g., "system", "dns")
    /// - `factory`: Factory object for creating resolver instances
    pub fn register_resolver(&self, name: impl Into<String>, factory: Box<dyn NameResolverFactory>) {
        let mut resolvers = self.resolvers.write().unwrap_or_else(PoisonError::into_inner);
        resolvers.insert(name.into(), factory);
    }

    /// Register a control plane factory
    ///
    /// # Parameters
    ///
    /// - `name`: Control plane type name (e.g., "elbv2")
    /// - `factory`: Factory object for creating control plane instances
    pub fn register_control_plane(
        &self,
        name: impl Into<String>,
        factory: Arc<dyn ControlPlaneFactory>,
    ) {
        let mut control_planes = self
            .control_planes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        control_planes.insert(name.into(), factory);
    }

    /// Create a name resolver from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn NameResolver>)`: Created resolver instance
    /// - `Err(Error)`: If the resolver type is not registered or creation fails
    pub fn create_resolver(&self, config: &ResolverConfig) -> Result<Box<dyn NameResolver>> {
        let resolver_type = config.type_name();
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = resolvers
            .get(resolver_type)
            .ok_or_else(|| Error::config(format!("Unknown resolver type: {}", resolver_type)))?;

        factory.create(config)
    }

    /// Create a control plane from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn LoadBalancerControlPlane>)`: Created control plane instance
    /// - `Err(Error)`: If the control plane type is not registered or creation fails
    pub async fn create_control_plane(
        &self,
        config: &ControlPlaneConfig,
    ) -> Result<Box<dyn LoadBalancerControlPlane>> {
        let control_plane_type = config.type_name();

        // Release the lock before calling async create
        let factory = {
            let control_planes = self
                .control_planes
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            control_planes.get(control_plane_type).cloned().ok_or_else(|| {
                Error::config(format!("Unknown control plane type: {}", control_plane_type))
            })?
        };

        factory.create(config).await
    }

    /// List all registered resolver types
    pub fn list_resolvers(&self) -> Vec<String> {
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);
        resolvers.keys().cloned().collect()
    }

    /// List all registered control plane types
    pub fn list_control_planes(&self) -> Vec<String> {
        let control_planes = self
            .control_planes
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        control_planes.keys().cloned().collect()
    }

    /// Check if a resolver type is registered
    pub fn has_resolver(&self, name: &str) -> bool {
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);
        resolvers.contains_key(name)
    }

    /// Check if a control plane type is registered
    pub fn has_control_plane(&self, name: &str) -> bool {
        let control_planes = self
            .control_planes
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        control_planes.contains_key(name)
    }
}
