//! # Bootstrap Configuration
//!
//! Retry settings for the startup bootstrap sequence.

use super::env_var_or_default;

/// Bootstrap retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Total attempts (including the first) before the bootstrap fails
    pub max_attempts: u32,
    /// Smallest delay between attempts (seconds)
    pub backoff_min_secs: u64,
    /// Largest delay between attempts (seconds)
    pub backoff_max_secs: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            max_attempts: DEFAULT_BOOTSTRAP_MAX_ATTEMPTS,
            backoff_min_secs: DEFAULT_BOOTSTRAP_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BOOTSTRAP_BACKOFF_MAX_SECS,
        }
    }
}

impl BootstrapConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        use crate::constants::*;
        let max_attempts =
            env_var_or_default("BOOTSTRAP_MAX_ATTEMPTS", DEFAULT_BOOTSTRAP_MAX_ATTEMPTS);
        let backoff_min_secs = env_var_or_default(
            "BOOTSTRAP_BACKOFF_MIN_SECS",
            DEFAULT_BOOTSTRAP_BACKOFF_MIN_SECS,
        );
        let backoff_max_secs = env_var_or_default(
            "BOOTSTRAP_BACKOFF_MAX_SECS",
            DEFAULT_BOOTSTRAP_BACKOFF_MAX_SECS,
        );

        Self {
            // At least one attempt, and a max that is never below the min
            max_attempts: max_attempts.max(1),
            backoff_min_secs,
            backoff_max_secs: backoff_max_secs.max(backoff_min_secs),
        }
    }
}
