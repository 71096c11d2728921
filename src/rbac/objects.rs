//! # Desired Objects
//!
//! Builders for the objects created on first reconciliation.

use crate::config::RbacConfig;
use crate::rbac::subject::{RoleRefKind, SubjectKind};
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// The system ServiceAccount
pub fn service_account(config: &RbacConfig) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(config.resource_name.clone()),
            namespace: Some(config.namespace.clone()),
            labels: Some(config.management_labels()),
            ..ObjectMeta::default()
        },
        ..ServiceAccount::default()
    }
}

/// The system ClusterRole
///
/// Rules are only set at creation; an empty list leaves `rules` unset.
pub fn cluster_role(config: &RbacConfig, rules: &[PolicyRule]) -> ClusterRole {
    ClusterRole {
        metadata: ObjectMeta {
            name: Some(config.resource_name.clone()),
            labels: Some(config.management_labels()),
            ..ObjectMeta::default()
        },
        rules: (!rules.is_empty()).then(|| rules.to_vec()),
        ..ClusterRole::default()
    }
}

/// The system ClusterRoleBinding, bound to both required subjects
pub fn cluster_role_binding(config: &RbacConfig) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(config.resource_name.clone()),
            labels: Some(config.management_labels()),
            ..ObjectMeta::default()
        },
        role_ref: RoleRefKind::ClusterRole.role_ref(&config.resource_name),
        subjects: Some(required_subjects(config).to_vec()),
    }
}

/// The system ServiceAccount as a binding subject
pub fn principal_subject(config: &RbacConfig) -> Subject {
    SubjectKind::ServiceAccount.subject(&config.resource_name, Some(&config.namespace))
}

/// The administrative group as a binding subject
pub fn admin_group_subject(config: &RbacConfig) -> Subject {
    SubjectKind::Group.subject(&config.admin_group, None)
}

/// Subjects every reconciled binding must contain
pub fn required_subjects(config: &RbacConfig) -> [Subject; 2] {
    [principal_subject(config), admin_group_subject(config)]
}
