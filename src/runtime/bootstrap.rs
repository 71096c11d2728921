//! # Bootstrap
//!
//! Drives the RBAC reconciler at process start. The reconciler never retries;
//! this is where failed attempts are retried with Fibonacci backoff.

use crate::config::BootstrapConfig;
use crate::rbac::{RbacClient, RbacReconciler};
use crate::runtime::backoff::FibonacciBackoff;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Converge the system RBAC objects, retrying failed attempts
///
/// Returns the last error once `max_attempts` attempts have failed.
pub async fn run_bootstrap<C: RbacClient>(
    reconciler: &RbacReconciler<C>,
    config: &BootstrapConfig,
) -> Result<()> {
    let mut backoff = FibonacciBackoff::new(config.backoff_min_secs, config.backoff_max_secs);
    let mut attempt: u32 = 1;

    loop {
        let bootstrap_span = tracing::span!(
            tracing::Level::INFO,
            "rbac.bootstrap.attempt",
            attempt,
            max_attempts = config.max_attempts
        );

        let result = {
            use tracing::Instrument;
            reconciler.ensure_all().instrument(bootstrap_span).await
        };

        match result {
            Ok(()) => {
                info!(attempt, "✅ System RBAC resources converged");
                return Ok(());
            }
            Err(e) if attempt >= config.max_attempts => {
                return Err(e).with_context(|| {
                    format!("System RBAC bootstrap failed after {attempt} attempts")
                });
            }
            Err(e) => {
                let delay_secs = backoff.next_backoff_seconds();
                let next_attempt_time = chrono::TimeDelta::try_seconds(
                    i64::try_from(delay_secs).unwrap_or(i64::MAX),
                )
                .and_then(|delta| chrono::Utc::now().checked_add_signed(delta))
                .map(|t| t.to_rfc3339());

                warn!(
                    attempt,
                    api_code = ?e.api_code(),
                    error = %e,
                    "System RBAC bootstrap attempt failed"
                );
                info!(
                    "🔄 Retrying in {}s (next attempt at {})",
                    delay_secs,
                    next_attempt_time.as_deref().unwrap_or("unknown")
                );

                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}
