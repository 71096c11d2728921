//! # Configuration
//!
//! Reconciler configuration loaded from environment variables.
//!
//! All configuration has defaults matching the cluster contract in [`crate::constants`]
//! and can be overridden via environment variables.

mod bootstrap;
mod rbac;

pub use bootstrap::BootstrapConfig;
pub use rbac::RbacConfig;

/// Load configuration from environment variables with defaults
pub fn load_config() -> (RbacConfig, BootstrapConfig) {
    (RbacConfig::from_env(), BootstrapConfig::from_env())
}

/// Read environment variable or return default value
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
