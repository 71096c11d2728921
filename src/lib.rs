//! System RBAC Reconciler Library
//!
//! Establishes and keeps converged the ServiceAccount, ClusterRole and
//! ClusterRoleBinding that give the system component cluster-admin-equivalent
//! privilege. Safe to run on every process start.

pub mod config;
pub mod constants;
pub mod rbac;
pub mod runtime;

pub use rbac::{KubeRbacClient, RbacClient, RbacError, RbacReconciler};
