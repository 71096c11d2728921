//! # RBAC Configuration
//!
//! The identity of the managed RBAC triad as a single value object.
//! The ServiceAccount, ClusterRole and ClusterRoleBinding procedures all read
//! their names and labels from here so they cannot drift apart.

use super::env_var_or_default;
use std::collections::BTreeMap;

/// Names, namespace and ownership label of the managed RBAC objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbacConfig {
    /// Name shared by all three managed objects
    pub resource_name: String,
    /// Namespace of the system ServiceAccount
    pub namespace: String,
    /// Administrative group bound to the ClusterRole
    pub admin_group: String,
    /// Management-ownership label key
    pub managed_by_key: String,
    /// Management-ownership label value, also the field manager
    pub managed_by_value: String,
}

impl Default for RbacConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            resource_name: SYSTEM_RBAC_RESOURCES_NAME.to_string(),
            namespace: SYSTEM_NAMESPACE.to_string(),
            admin_group: ADMIN_GROUP.to_string(),
            managed_by_key: MANAGED_BY_LABEL_KEY.to_string(),
            managed_by_value: MANAGED_BY_LABEL_VALUE.to_string(),
        }
    }
}

impl RbacConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            resource_name: env_var_or_default(
                "RBAC_RESOURCE_NAME",
                SYSTEM_RBAC_RESOURCES_NAME.to_string(),
            ),
            namespace: env_var_or_default("RBAC_NAMESPACE", SYSTEM_NAMESPACE.to_string()),
            admin_group: env_var_or_default("RBAC_ADMIN_GROUP", ADMIN_GROUP.to_string()),
            managed_by_key: env_var_or_default(
                "RBAC_MANAGED_BY_KEY",
                MANAGED_BY_LABEL_KEY.to_string(),
            ),
            managed_by_value: env_var_or_default(
                "RBAC_MANAGED_BY_VALUE",
                MANAGED_BY_LABEL_VALUE.to_string(),
            ),
        }
    }

    /// Field manager identity used for create and server-side apply
    pub fn field_manager(&self) -> &str {
        &self.managed_by_value
    }

    /// Labels stamped on every managed object
    pub fn management_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(self.managed_by_key.clone(), self.managed_by_value.clone())])
    }

    /// Whether the given labels mark an object as managed by this system
    pub fn is_managed(&self, labels: Option<&BTreeMap<String, String>>) -> bool {
        labels
            .and_then(|l| l.get(&self.managed_by_key))
            .is_some_and(|v| *v == self.managed_by_value)
    }
}
