//! # Constants
//!
//! Names and labels shared with anything that looks these objects up by convention.
//! These values must match the deployed cluster literally.

/// Name shared by the ServiceAccount, ClusterRole and ClusterRoleBinding
pub const SYSTEM_RBAC_RESOURCES_NAME: &str = "grafana-system";

/// Label key marking objects this system is authoritative over
pub const MANAGED_BY_LABEL_KEY: &str = "managed-by";

/// Label value marking objects this system is authoritative over.
/// Also used as the server-side apply field manager.
pub const MANAGED_BY_LABEL_VALUE: &str = "grafana-o11y-apiserver";

/// Namespace holding the system ServiceAccount
pub const SYSTEM_NAMESPACE: &str = "default";

/// Administrative group bound alongside the system ServiceAccount
pub const ADMIN_GROUP: &str = "system:masters";

/// API group for RBAC role references and group/user subjects
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Default number of bootstrap attempts before giving up
pub const DEFAULT_BOOTSTRAP_MAX_ATTEMPTS: u32 = 5;

/// Default minimum bootstrap retry backoff (seconds)
pub const DEFAULT_BOOTSTRAP_BACKOFF_MIN_SECS: u64 = 1;

/// Default maximum bootstrap retry backoff (seconds)
pub const DEFAULT_BOOTSTRAP_BACKOFF_MAX_SECS: u64 = 30;
