//! # System RBAC Reconciler
//!
//! Converges the system ServiceAccount, ClusterRole and ClusterRoleBinding.
//!
//! - The ServiceAccount and ClusterRole are created when absent and never
//!   touched again.
//! - The ClusterRoleBinding is created when absent. When present, the fields
//!   owned by our field manager are extracted, the required subjects are
//!   merged in by identity, and the result is server-side applied with force.
//!
//! Only a genuine not-found takes the create path. Every other failure is
//! returned to the caller unchanged; retrying is the caller's decision.

use crate::config::RbacConfig;
use crate::rbac::apply::extract_cluster_role_binding;
use crate::rbac::client::RbacClient;
use crate::rbac::error::RbacError;
use crate::rbac::objects;
use crate::rbac::subject::missing_subjects;
use k8s_openapi::api::rbac::v1::PolicyRule;
use tracing::{debug, error, info, instrument};

/// Reconciler for the system RBAC triad
#[derive(Debug)]
pub struct RbacReconciler<C> {
    client: C,
    config: RbacConfig,
    rules: Vec<PolicyRule>,
}

impl<C: RbacClient> RbacReconciler<C> {
    pub fn new(client: C, config: RbacConfig) -> Self {
        Self {
            client,
            config,
            rules: Vec::new(),
        }
    }

    /// Rules written into the ClusterRole when it is first created
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<PolicyRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &RbacConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Ensure the system ServiceAccount exists
    #[instrument(skip(self), fields(resource.kind = "ServiceAccount", resource.name = %self.config.resource_name, resource.namespace = %self.config.namespace))]
    pub async fn ensure_principal(&self) -> Result<(), RbacError> {
        let name = &self.config.resource_name;
        let existing = self
            .client
            .get_service_account(&self.config.namespace, name)
            .await
            .map_err(|source| RbacError::Lookup {
                kind: "ServiceAccount",
                name: name.clone(),
                source,
            })?;

        if existing.is_some() {
            debug!("ServiceAccount already exists");
            return Ok(());
        }

        let service_account = objects::service_account(&self.config);
        self.client
            .create_service_account(
                &self.config.namespace,
                &service_account,
                self.config.field_manager(),
            )
            .await
            .map_err(|source| RbacError::Create {
                kind: "ServiceAccount",
                name: name.clone(),
                source,
            })?;

        info!("✅ Created ServiceAccount {}/{}", self.config.namespace, name);
        Ok(())
    }

    /// Ensure the system ClusterRole exists
    ///
    /// An existing ClusterRole is left alone whatever its rules are.
    #[instrument(skip(self), fields(resource.kind = "ClusterRole", resource.name = %self.config.resource_name))]
    pub async fn ensure_privilege_definition(&self) -> Result<(), RbacError> {
        let name = &self.config.resource_name;
        let existing = self
            .client
            .get_cluster_role(name)
            .await
            .map_err(|source| RbacError::Lookup {
                kind: "ClusterRole",
                name: name.clone(),
                source,
            })?;

        if existing.is_some() {
            debug!("ClusterRole already exists");
            return Ok(());
        }

        let role = objects::cluster_role(&self.config, &self.rules);
        self.client
            .create_cluster_role(&role)
            .await
            .map_err(|source| RbacError::Create {
                kind: "ClusterRole",
                name: name.clone(),
                source,
            })?;

        info!("✅ Created ClusterRole {}", name);
        Ok(())
    }

    /// Ensure the system ClusterRoleBinding exists and binds the required subjects
    ///
    /// On an existing binding this always issues exactly one apply, even when
    /// the subjects have already converged.
    #[instrument(skip(self), fields(resource.kind = "ClusterRoleBinding", resource.name = %self.config.resource_name))]
    pub async fn ensure_binding(&self) -> Result<(), RbacError> {
        let name = &self.config.resource_name;
        let field_manager = self.config.field_manager();

        let existing = self
            .client
            .get_cluster_role_binding(name)
            .await
            .map_err(|source| RbacError::Lookup {
                kind: "ClusterRoleBinding",
                name: name.clone(),
                source,
            })?;

        let Some(observed) = existing else {
            let binding = objects::cluster_role_binding(&self.config);
            self.client
                .create_cluster_role_binding(&binding, field_manager)
                .await
                .map_err(|source| RbacError::Create {
                    kind: "ClusterRoleBinding",
                    name: name.clone(),
                    source,
                })?;

            info!("✅ Created ClusterRoleBinding {}", name);
            return Ok(());
        };

        let required = objects::required_subjects(&self.config);
        let observed_subjects = observed.subjects.clone().unwrap_or_default();
        let missing = missing_subjects(&observed_subjects, &required);

        // subjects is atomic under apply, so the observed entries are carried
        // along to keep subjects written by other managers
        let config = extract_cluster_role_binding(&observed, field_manager)
            .map_err(|source| RbacError::Extract {
                name: name.clone(),
                source,
            })?
            .with_subjects(observed_subjects)
            .with_subjects(required);

        debug!(
            missing = missing.len(),
            subjects = config.subjects.as_ref().map_or(0, Vec::len),
            "Applying ClusterRoleBinding"
        );

        if let Err(source) = self
            .client
            .apply_cluster_role_binding(&config, field_manager, true)
            .await
        {
            error!(error = %source, "Failed to apply ClusterRoleBinding {}", name);
            return Err(RbacError::Apply {
                name: name.clone(),
                source,
            });
        }

        if missing.is_empty() {
            debug!("ClusterRoleBinding subjects already converged");
        } else {
            let added: Vec<String> = missing.iter().map(ToString::to_string).collect();
            info!("✅ Added subjects to ClusterRoleBinding {}: {}", name, added.join(", "));
        }
        Ok(())
    }

    /// Run all three ensure operations: ServiceAccount, ClusterRole, then ClusterRoleBinding
    ///
    /// Stops at the first failure.
    pub async fn ensure_all(&self) -> Result<(), RbacError> {
        self.ensure_principal().await?;
        self.ensure_privilege_definition().await?;
        self.ensure_binding().await
    }
}
