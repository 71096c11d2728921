//! # Cluster Client
//!
//! The cluster operations the reconciler consumes, and their implementation
//! on top of `kube::Client`.

use crate::rbac::apply::ClusterRoleBindingApply;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding};
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;

/// Cluster API operations needed to converge the system RBAC objects
///
/// Lookups return `Ok(None)` when the object does not exist; every other
/// failure is an error.
#[async_trait]
pub trait RbacClient: Send + Sync {
    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceAccount>, kube::Error>;

    async fn create_service_account(
        &self,
        namespace: &str,
        service_account: &ServiceAccount,
        field_manager: &str,
    ) -> Result<ServiceAccount, kube::Error>;

    async fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>, kube::Error>;

    async fn create_cluster_role(&self, role: &ClusterRole) -> Result<ClusterRole, kube::Error>;

    async fn get_cluster_role_binding(
        &self,
        name: &str,
    ) -> Result<Option<ClusterRoleBinding>, kube::Error>;

    async fn create_cluster_role_binding(
        &self,
        binding: &ClusterRoleBinding,
        field_manager: &str,
    ) -> Result<ClusterRoleBinding, kube::Error>;

    /// Server-side apply of a partial ClusterRoleBinding
    async fn apply_cluster_role_binding(
        &self,
        config: &ClusterRoleBindingApply,
        field_manager: &str,
        force: bool,
    ) -> Result<ClusterRoleBinding, kube::Error>;
}

/// [`RbacClient`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeRbacClient {
    client: Client,
}

impl std::fmt::Debug for KubeRbacClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeRbacClient").finish_non_exhaustive()
    }
}

impl KubeRbacClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn post_params(field_manager: Option<&str>) -> PostParams {
        PostParams {
            field_manager: field_manager.map(str::to_string),
            ..PostParams::default()
        }
    }
}

#[async_trait]
impl RbacClient for KubeRbacClient {
    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceAccount>, kube::Error> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await
    }

    async fn create_service_account(
        &self,
        namespace: &str,
        service_account: &ServiceAccount,
        field_manager: &str,
    ) -> Result<ServiceAccount, kube::Error> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        api.create(&Self::post_params(Some(field_manager)), service_account)
            .await
    }

    async fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>, kube::Error> {
        let api: Api<ClusterRole> = Api::all(self.client.clone());
        api.get_opt(name).await
    }

    async fn create_cluster_role(&self, role: &ClusterRole) -> Result<ClusterRole, kube::Error> {
        let api: Api<ClusterRole> = Api::all(self.client.clone());
        api.create(&Self::post_params(None), role).await
    }

    async fn get_cluster_role_binding(
        &self,
        name: &str,
    ) -> Result<Option<ClusterRoleBinding>, kube::Error> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        api.get_opt(name).await
    }

    async fn create_cluster_role_binding(
        &self,
        binding: &ClusterRoleBinding,
        field_manager: &str,
    ) -> Result<ClusterRoleBinding, kube::Error> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        api.create(&Self::post_params(Some(field_manager)), binding)
            .await
    }

    async fn apply_cluster_role_binding(
        &self,
        config: &ClusterRoleBindingApply,
        field_manager: &str,
        force: bool,
    ) -> Result<ClusterRoleBinding, kube::Error> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        let mut params = PatchParams::apply(field_manager);
        if force {
            params = params.force();
        }
        api.patch(&config.metadata.name, &params, &Patch::Apply(config))
            .await
    }
}
