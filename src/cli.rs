//! # RBACCTL CLI
//!
//! Command-line interface for the system RBAC reconciler.
//!
//! ## Usage
//!
//! ```bash
//! # Converge all three objects once
//! rbacctl ensure
//!
//! # Only merge subjects into the ClusterRoleBinding
//! rbacctl ensure --only binding
//!
//! # Show whether the objects have converged
//! rbacctl status --output yaml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kube::Client;
use system_rbac_reconciler::config::RbacConfig;
use system_rbac_reconciler::rbac::{inspect, RbacStatus};
use system_rbac_reconciler::runtime::{init_tracing, install_crypto_provider};
use system_rbac_reconciler::{KubeRbacClient, RbacReconciler};

/// System RBAC Reconciler CLI
#[derive(Debug, Parser)]
#[command(name = "rbacctl")]
#[command(about = "System RBAC Reconciler CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Namespace of the system ServiceAccount (overrides RBAC_NAMESPACE)
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Name shared by the managed objects (overrides RBAC_RESOURCE_NAME)
    #[arg(long, global = true)]
    name: Option<String>,

    /// Administrative group to bind (overrides RBAC_ADMIN_GROUP)
    #[arg(long, global = true)]
    admin_group: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create or converge the managed RBAC objects once
    Ensure {
        /// Only converge one object
        #[arg(long, value_enum)]
        only: Option<Target>,
    },
    /// Report whether the managed RBAC objects have converged
    Status {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Target {
    Principal,
    Privilege,
    Binding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_crypto_provider();
    init_tracing("rbacctl=info,system_rbac_reconciler=info");

    let cli = Cli::parse();

    let mut config = RbacConfig::from_env();
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }
    if let Some(name) = cli.name {
        config.resource_name = name;
    }
    if let Some(admin_group) = cli.admin_group {
        config.admin_group = admin_group;
    }

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;
    let reconciler = RbacReconciler::new(KubeRbacClient::new(client), config);

    match cli.command {
        Commands::Ensure { only } => ensure_command(&reconciler, only).await,
        Commands::Status { output } => status_command(&reconciler, output).await,
    }
}

async fn ensure_command(
    reconciler: &RbacReconciler<KubeRbacClient>,
    only: Option<Target>,
) -> Result<()> {
    match only {
        None => reconciler.ensure_all().await?,
        Some(Target::Principal) => reconciler.ensure_principal().await?,
        Some(Target::Privilege) => reconciler.ensure_privilege_definition().await?,
        Some(Target::Binding) => reconciler.ensure_binding().await?,
    }
    println!("✅ System RBAC objects '{}' converged", reconciler.config().resource_name);
    Ok(())
}

async fn status_command(
    reconciler: &RbacReconciler<KubeRbacClient>,
    output: OutputFormat,
) -> Result<()> {
    let status = inspect(reconciler.client(), reconciler.config()).await?;

    if output == OutputFormat::Yaml {
        print!("{}", serde_yaml::to_string(&status)?);
        return Ok(());
    }

    print_status(reconciler.config(), &status);
    Ok(())
}

fn print_status(config: &RbacConfig, status: &RbacStatus) {
    let mark = |ok: bool| if ok { "✅" } else { "❌" };

    println!("System RBAC objects '{}'", config.resource_name);
    println!(
        "  {} ServiceAccount {}/{} (present: {}, managed: {})",
        mark(status.service_account.present),
        config.namespace,
        config.resource_name,
        status.service_account.present,
        status.service_account.managed
    );
    println!(
        "  {} ClusterRole {} (present: {}, managed: {})",
        mark(status.cluster_role.present),
        config.resource_name,
        status.cluster_role.present,
        status.cluster_role.managed
    );

    let binding = &status.cluster_role_binding;
    println!(
        "  {} ClusterRoleBinding {} (present: {}, managed: {}, roleRef ok: {}, subjects: {})",
        mark(binding.present && binding.role_ref_matches && binding.missing_subjects.is_empty()),
        config.resource_name,
        binding.present,
        binding.managed,
        binding.role_ref_matches,
        binding.subject_count
    );
    for missing in &binding.missing_subjects {
        println!("      missing subject: {missing}");
    }

    println!(
        "Converged: {}",
        if status.is_converged() { "yes" } else { "no" }
    );
}
