//! Error types for tgsync
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for tgsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tgsync
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint resolution failed or produced no usable addresses
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// A describe/register/deregister call failed
    #[error("Control plane error: {0}")]
    ControlPlane(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller lacks permission on the target group
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Control plane throttled the request
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Target group not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a control plane error
    pub fn control_plane(msg: impl Into<String>) -> Self {
        Self::ControlPlane(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether this error came from the configuration layer
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether this error came from endpoint resolution
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }
}
