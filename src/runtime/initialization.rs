//! # Initialization
//!
//! Process setup shared by the binaries: rustls crypto provider, tracing,
//! configuration and the Kubernetes client.

use crate::config::{load_config, BootstrapConfig, RbacConfig};
use anyhow::{Context, Result};
use kube::Client;
use tracing::{debug, info};

/// Everything a binary needs to run the reconciler
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// Identity of the managed RBAC objects
    pub rbac_config: RbacConfig,
    /// Retry settings for the bootstrap
    pub bootstrap_config: BootstrapConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("rbac_config", &self.rbac_config)
            .field("bootstrap_config", &self.bootstrap_config)
            .finish_non_exhaustive()
    }
}

/// Install the ring crypto provider for rustls
///
/// Required for rustls 0.23+ before any TLS connection is made.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Install the fmt tracing subscriber, honouring `RUST_LOG`
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

/// Initialize the process: crypto provider, tracing, config, Kubernetes client
pub async fn initialize(default_filter: &str) -> Result<InitializationResult> {
    install_crypto_provider();
    init_tracing(default_filter);

    info!("Starting System RBAC Reconciler v{}", env!("CARGO_PKG_VERSION"));

    let (rbac_config, bootstrap_config) = load_config();
    info!(
        resource.name = %rbac_config.resource_name,
        resource.namespace = %rbac_config.namespace,
        field_manager = %rbac_config.field_manager(),
        "Loaded RBAC configuration"
    );

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig or in-cluster config is available.")?;

    Ok(InitializationResult {
        client,
        rbac_config,
        bootstrap_config,
    })
}
