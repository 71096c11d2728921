//! # RBAC Status
//!
//! Read-only report on whether the system RBAC objects have converged.

use crate::config::RbacConfig;
use crate::rbac::client::RbacClient;
use crate::rbac::error::RbacError;
use crate::rbac::objects;
use crate::rbac::subject::{missing_subjects, RoleRefKind, SubjectIdentity};
use serde::Serialize;

/// Presence and ownership of a managed object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStatus {
    pub present: bool,
    /// Carries the management-ownership label
    pub managed: bool,
}

/// Binding-specific status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingStatus {
    pub present: bool,
    pub managed: bool,
    /// roleRef points at the managed ClusterRole
    pub role_ref_matches: bool,
    /// Required subjects not yet bound, as `Kind/[namespace/]name`
    pub missing_subjects: Vec<String>,
    /// Total subjects on the binding, including those owned by others
    pub subject_count: usize,
}

/// Status of the whole triad
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacStatus {
    pub service_account: ObjectStatus,
    pub cluster_role: ObjectStatus,
    pub cluster_role_binding: BindingStatus,
}

impl RbacStatus {
    /// All objects exist and the binding grants the role to every required subject
    pub fn is_converged(&self) -> bool {
        self.service_account.present
            && self.cluster_role.present
            && self.cluster_role_binding.present
            && self.cluster_role_binding.role_ref_matches
            && self.cluster_role_binding.missing_subjects.is_empty()
    }
}

/// Inspect the system RBAC objects without writing anything
pub async fn inspect<C: RbacClient + ?Sized>(
    client: &C,
    config: &RbacConfig,
) -> Result<RbacStatus, RbacError> {
    let name = &config.resource_name;
    let lookup = |kind: &'static str| {
        move |source: kube::Error| RbacError::Lookup {
            kind,
            name: name.clone(),
            source,
        }
    };

    let service_account = client
        .get_service_account(&config.namespace, name)
        .await
        .map_err(lookup("ServiceAccount"))?
        .map(|sa| ObjectStatus {
            present: true,
            managed: config.is_managed(sa.metadata.labels.as_ref()),
        })
        .unwrap_or_default();

    let cluster_role = client
        .get_cluster_role(name)
        .await
        .map_err(lookup("ClusterRole"))?
        .map(|role| ObjectStatus {
            present: true,
            managed: config.is_managed(role.metadata.labels.as_ref()),
        })
        .unwrap_or_default();

    let required = objects::required_subjects(config);
    let cluster_role_binding = match client
        .get_cluster_role_binding(name)
        .await
        .map_err(lookup("ClusterRoleBinding"))?
    {
        Some(binding) => {
            let subjects = binding.subjects.unwrap_or_default();
            BindingStatus {
                present: true,
                managed: config.is_managed(binding.metadata.labels.as_ref()),
                role_ref_matches: binding.role_ref.kind == RoleRefKind::ClusterRole.as_str()
                    && binding.role_ref.name == *name,
                missing_subjects: missing_subjects(&subjects, &required)
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                subject_count: subjects.len(),
            }
        }
        None => BindingStatus {
            missing_subjects: required
                .iter()
                .map(|s| SubjectIdentity::from(s).to_string())
                .collect(),
            ..BindingStatus::default()
        },
    };

    Ok(RbacStatus {
        service_account,
        cluster_role,
        cluster_role_binding,
    })
}
