//! # System RBAC Reconciler
//!
//! Converges the system RBAC objects once at startup and exits.
//!
//! 1. **ServiceAccount** - created in the system namespace when absent
//! 2. **ClusterRole** - created when absent, never updated
//! 3. **ClusterRoleBinding** - created when absent, otherwise the system
//!    ServiceAccount and administrative group are merged into its subjects
//!    with server-side apply
//!
//! Failed attempts are retried with Fibonacci backoff
//! (`BOOTSTRAP_MAX_ATTEMPTS`, `BOOTSTRAP_BACKOFF_MIN_SECS`, `BOOTSTRAP_BACKOFF_MAX_SECS`).

use anyhow::Result;
use system_rbac_reconciler::runtime::{initialize, run_bootstrap};
use system_rbac_reconciler::{KubeRbacClient, RbacReconciler};

#[tokio::main]
async fn main() -> Result<()> {
    let init_result = initialize("system_rbac_reconciler=info").await?;

    let reconciler = RbacReconciler::new(
        KubeRbacClient::new(init_result.client),
        init_result.rbac_config,
    );

    run_bootstrap(&reconciler, &init_result.bootstrap_config).await
}
