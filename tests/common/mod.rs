//! In-memory cluster used by the integration tests
//!
//! Records every call and emulates the API server closely enough for the
//! reconciler: 404-as-`None` lookups, 409 on create of an existing object,
//! and server-side apply with an atomic `subjects` list and per-manager
//! managedFields bookkeeping.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{FieldsV1, ManagedFieldsEntry, ObjectMeta};
use kube::error::ErrorResponse;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use system_rbac_reconciler::rbac::{ClusterRoleBindingApply, RbacClient, SubjectKind};

/// A call made against the fake cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetServiceAccount { namespace: String, name: String },
    CreateServiceAccount { namespace: String, field_manager: String },
    GetClusterRole { name: String },
    CreateClusterRole,
    GetClusterRoleBinding { name: String },
    CreateClusterRoleBinding { field_manager: String },
    ApplyClusterRoleBinding { field_manager: String, force: bool },
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::CreateServiceAccount { .. }
                | Call::CreateClusterRole
                | Call::CreateClusterRoleBinding { .. }
                | Call::ApplyClusterRoleBinding { .. }
        )
    }
}

#[derive(Debug, Default)]
pub struct State {
    pub service_accounts: BTreeMap<(String, String), ServiceAccount>,
    pub cluster_roles: BTreeMap<String, ClusterRole>,
    pub cluster_role_bindings: BTreeMap<String, ClusterRoleBinding>,
    pub calls: Vec<Call>,
    /// HTTP code returned by every lookup while set
    pub lookup_failure: Option<u16>,
    /// HTTP codes returned by the next apply calls, in order
    pub apply_failures: Vec<u16>,
    /// HTTP codes returned by the next create calls, in order
    pub create_failures: Vec<u16>,
    /// Last apply configuration received
    pub last_apply: Option<ClusterRoleBindingApply>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<State>>,
}

pub fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    })
}

fn failure(code: u16) -> kube::Error {
    let reason = match code {
        403 => "Forbidden",
        409 => "Conflict",
        500 => "InternalError",
        _ => "Unknown",
    };
    api_error(code, reason, "injected failure")
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|&c| pred(c)).count()
    }

    pub fn creates(&self) -> usize {
        self.count(|c| {
            matches!(
                c,
                Call::CreateServiceAccount { .. }
                    | Call::CreateClusterRole
                    | Call::CreateClusterRoleBinding { .. }
            )
        })
    }

    pub fn applies(&self) -> usize {
        self.count(|c| matches!(c, Call::ApplyClusterRoleBinding { .. }))
    }

    pub fn writes(&self) -> usize {
        self.count(Call::is_write)
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn fail_lookups_with(&self, code: Option<u16>) {
        self.state().lookup_failure = code;
    }

    pub fn fail_next_applies_with(&self, codes: Vec<u16>) {
        self.state().apply_failures = codes;
    }

    pub fn fail_next_creates_with(&self, codes: Vec<u16>) {
        self.state().create_failures = codes;
    }

    pub fn binding(&self, name: &str) -> Option<ClusterRoleBinding> {
        self.state().cluster_role_bindings.get(name).cloned()
    }

    pub fn binding_subject_names(&self, name: &str) -> Vec<String> {
        self.binding(name)
            .and_then(|b| b.subjects)
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.name)
            .collect()
    }

    pub fn insert_service_account(&self, sa: ServiceAccount) {
        let key = (
            sa.metadata.namespace.clone().unwrap_or_default(),
            sa.metadata.name.clone().unwrap_or_default(),
        );
        self.state().service_accounts.insert(key, sa);
    }

    pub fn insert_cluster_role(&self, role: ClusterRole) {
        let name = role.metadata.name.clone().unwrap_or_default();
        self.state().cluster_roles.insert(name, role);
    }

    pub fn insert_cluster_role_binding(&self, binding: ClusterRoleBinding) {
        let name = binding.metadata.name.clone().unwrap_or_default();
        self.state().cluster_role_bindings.insert(name, binding);
    }

    fn record(&self, call: Call) -> Result<(), kube::Error> {
        let mut state = self.state();
        let is_lookup = matches!(
            call,
            Call::GetServiceAccount { .. }
                | Call::GetClusterRole { .. }
                | Call::GetClusterRoleBinding { .. }
        );
        let is_create = matches!(
            call,
            Call::CreateServiceAccount { .. }
                | Call::CreateClusterRole
                | Call::CreateClusterRoleBinding { .. }
        );
        state.calls.push(call);
        match state.lookup_failure {
            Some(code) if is_lookup => return Err(failure(code)),
            _ => {}
        }
        if is_create && !state.create_failures.is_empty() {
            let code = state.create_failures.remove(0);
            return Err(failure(code));
        }
        Ok(())
    }
}

/// A ClusterRoleBinding as another actor would have created it
pub fn foreign_binding(name: &str, subjects: Vec<Subject>) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            managed_fields: Some(vec![update_entry("kubectl-create")]),
            ..ObjectMeta::default()
        },
        role_ref: system_rbac_reconciler::rbac::RoleRefKind::ClusterRole.role_ref(name),
        subjects: Some(subjects),
    }
}

pub fn group(name: &str) -> Subject {
    SubjectKind::Group.subject(name, None)
}

fn update_entry(manager: &str) -> ManagedFieldsEntry {
    ManagedFieldsEntry {
        api_version: Some("rbac.authorization.k8s.io/v1".to_string()),
        fields_type: Some("FieldsV1".to_string()),
        fields_v1: Some(FieldsV1(json!({"f:roleRef": {}, "f:subjects": {}}))),
        manager: Some(manager.to_string()),
        operation: Some("Update".to_string()),
        ..ManagedFieldsEntry::default()
    }
}

/// FieldsV1 set describing what an apply configuration specifies
fn apply_fields(config: &ClusterRoleBindingApply) -> Value {
    let mut root = Map::new();
    let mut metadata = Map::new();
    if let Some(labels) = &config.metadata.labels {
        let owned: Map<String, Value> = labels
            .keys()
            .map(|k| (format!("f:{k}"), json!({})))
            .collect();
        metadata.insert("f:labels".to_string(), Value::Object(owned));
    }
    if !metadata.is_empty() {
        root.insert("f:metadata".to_string(), Value::Object(metadata));
    }
    if config.role_ref.is_some() {
        root.insert("f:roleRef".to_string(), json!({}));
    }
    if config.subjects.is_some() {
        root.insert("f:subjects".to_string(), json!({}));
    }
    Value::Object(root)
}

#[async_trait]
impl RbacClient for FakeCluster {
    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceAccount>, kube::Error> {
        self.record(Call::GetServiceAccount {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;
        Ok(self
            .state()
            .service_accounts
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_service_account(
        &self,
        namespace: &str,
        service_account: &ServiceAccount,
        field_manager: &str,
    ) -> Result<ServiceAccount, kube::Error> {
        self.record(Call::CreateServiceAccount {
            namespace: namespace.to_string(),
            field_manager: field_manager.to_string(),
        })?;
        let key = (
            namespace.to_string(),
            service_account.metadata.name.clone().unwrap_or_default(),
        );
        let mut state = self.state();
        if state.service_accounts.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists", "serviceaccounts already exists"));
        }
        state.service_accounts.insert(key, service_account.clone());
        Ok(service_account.clone())
    }

    async fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>, kube::Error> {
        self.record(Call::GetClusterRole {
            name: name.to_string(),
        })?;
        Ok(self.state().cluster_roles.get(name).cloned())
    }

    async fn create_cluster_role(&self, role: &ClusterRole) -> Result<ClusterRole, kube::Error> {
        self.record(Call::CreateClusterRole)?;
        let name = role.metadata.name.clone().unwrap_or_default();
        let mut state = self.state();
        if state.cluster_roles.contains_key(&name) {
            return Err(api_error(409, "AlreadyExists", "clusterroles already exists"));
        }
        state.cluster_roles.insert(name, role.clone());
        Ok(role.clone())
    }

    async fn get_cluster_role_binding(
        &self,
        name: &str,
    ) -> Result<Option<ClusterRoleBinding>, kube::Error> {
        self.record(Call::GetClusterRoleBinding {
            name: name.to_string(),
        })?;
        Ok(self.state().cluster_role_bindings.get(name).cloned())
    }

    async fn create_cluster_role_binding(
        &self,
        binding: &ClusterRoleBinding,
        field_manager: &str,
    ) -> Result<ClusterRoleBinding, kube::Error> {
        self.record(Call::CreateClusterRoleBinding {
            field_manager: field_manager.to_string(),
        })?;
        let name = binding.metadata.name.clone().unwrap_or_default();
        let mut state = self.state();
        if state.cluster_role_bindings.contains_key(&name) {
            return Err(api_error(
                409,
                "AlreadyExists",
                "clusterrolebindings already exists",
            ));
        }
        let mut stored = binding.clone();
        stored.metadata.managed_fields = Some(vec![update_entry(field_manager)]);
        state.cluster_role_bindings.insert(name, stored.clone());
        Ok(stored)
    }

    async fn apply_cluster_role_binding(
        &self,
        config: &ClusterRoleBindingApply,
        field_manager: &str,
        force: bool,
    ) -> Result<ClusterRoleBinding, kube::Error> {
        self.record(Call::ApplyClusterRoleBinding {
            field_manager: field_manager.to_string(),
            force,
        })?;
        let mut state = self.state();
        state.last_apply = Some(config.clone());

        if !state.apply_failures.is_empty() {
            let code = state.apply_failures.remove(0);
            return Err(failure(code));
        }

        let name = config.metadata.name.clone();
        let Some(mut binding) = state.cluster_role_bindings.get(&name).cloned() else {
            return Err(api_error(
                422,
                "Invalid",
                "roleRef: Required value (apply cannot create without roleRef)",
            ));
        };

        if let Some(role_ref) = &config.role_ref {
            if *role_ref != binding.role_ref {
                return Err(api_error(422, "Invalid", "roleRef: Invalid value: cannot change roleRef"));
            }
        }

        // Atomic list: the applied list replaces the live one
        if let Some(subjects) = &config.subjects {
            binding.subjects = Some(subjects.clone());
        }
        if let Some(labels) = &config.metadata.labels {
            binding
                .metadata
                .labels
                .get_or_insert_with(BTreeMap::new)
                .extend(labels.clone());
        }

        let mut managed_fields = binding.metadata.managed_fields.take().unwrap_or_default();
        managed_fields.retain(|e| {
            !(e.manager.as_deref() == Some(field_manager) && e.operation.as_deref() == Some("Apply"))
        });
        managed_fields.push(ManagedFieldsEntry {
            api_version: Some("rbac.authorization.k8s.io/v1".to_string()),
            fields_type: Some("FieldsV1".to_string()),
            fields_v1: Some(FieldsV1(apply_fields(config))),
            manager: Some(field_manager.to_string()),
            operation: Some("Apply".to_string()),
            ..ManagedFieldsEntry::default()
        });
        binding.metadata.managed_fields = Some(managed_fields);

        state.cluster_role_bindings.insert(name, binding.clone());
        Ok(binding)
    }
}
