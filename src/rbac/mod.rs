//! # System RBAC
//!
//! Keeps the system ServiceAccount, ClusterRole and ClusterRoleBinding converged.
//!
//! ## Sub-modules
//!
//! - `reconciler` - The three ensure operations
//! - `apply` - Apply configurations and field-manager extraction
//! - `client` - Cluster operations consumed by the reconciler
//! - `objects` - Objects created on first reconciliation
//! - `subject` - Subject and role reference kinds, subject set-union
//! - `status` - Read-only convergence report
//! - `error` - Error types

pub mod apply;
pub mod client;
pub mod error;
pub mod objects;
pub mod reconciler;
pub mod status;
pub mod subject;

pub use apply::{extract_cluster_role_binding, ApplyMetadata, ClusterRoleBindingApply};
pub use client::{KubeRbacClient, RbacClient};
pub use error::{ExtractError, RbacError};
pub use reconciler::RbacReconciler;
pub use status::{inspect, BindingStatus, ObjectStatus, RbacStatus};
pub use subject::{RoleRefKind, SubjectIdentity, SubjectKind};
