//! # Subjects and Role References
//!
//! Enumerated kinds for binding subjects and role references, and the
//! set-union used to merge subject lists without dropping entries.

use crate::constants::RBAC_API_GROUP;
use k8s_openapi::api::rbac::v1::{RoleRef, Subject};
use std::fmt;

/// Kinds the API server accepts for a binding subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    ServiceAccount,
    User,
    Group,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::ServiceAccount => "ServiceAccount",
            SubjectKind::User => "User",
            SubjectKind::Group => "Group",
        }
    }

    /// API group the subject kind lives in
    pub fn api_group(&self) -> &'static str {
        match self {
            SubjectKind::ServiceAccount => "",
            SubjectKind::User | SubjectKind::Group => RBAC_API_GROUP,
        }
    }

    /// Build a subject of this kind
    pub fn subject(&self, name: &str, namespace: Option<&str>) -> Subject {
        Subject {
            api_group: Some(self.api_group().to_string()),
            kind: self.as_str().to_string(),
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
        }
    }
}

/// Kinds the API server accepts in a binding's roleRef
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleRefKind {
    ClusterRole,
    Role,
}

impl RoleRefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleRefKind::ClusterRole => "ClusterRole",
            RoleRefKind::Role => "Role",
        }
    }

    pub fn role_ref(&self, name: &str) -> RoleRef {
        RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: self.as_str().to_string(),
            name: name.to_string(),
        }
    }
}

/// Identity of a subject within a binding: (kind, name, namespace)
///
/// `apiGroup` is not part of the identity; the API server defaults it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectIdentity {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

impl From<&Subject> for SubjectIdentity {
    fn from(subject: &Subject) -> Self {
        Self {
            kind: subject.kind.clone(),
            name: subject.name.clone(),
            // Empty and absent namespaces are the same thing on the wire
            namespace: subject.namespace.clone().filter(|ns| !ns.is_empty()),
        }
    }
}

impl fmt::Display for SubjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

/// Union of two subject lists keyed by [`SubjectIdentity`]
///
/// Keeps the order of `existing`, then appends subjects from `additional`
/// whose identity is not already present.
pub fn union_subjects(
    existing: impl IntoIterator<Item = Subject>,
    additional: impl IntoIterator<Item = Subject>,
) -> Vec<Subject> {
    let mut merged: Vec<Subject> = Vec::new();
    for subject in existing.into_iter().chain(additional) {
        let identity = SubjectIdentity::from(&subject);
        if !merged.iter().any(|s| SubjectIdentity::from(s) == identity) {
            merged.push(subject);
        }
    }
    merged
}

/// Identities from `required` that `subjects` does not contain
pub fn missing_subjects(subjects: &[Subject], required: &[Subject]) -> Vec<SubjectIdentity> {
    required
        .iter()
        .map(SubjectIdentity::from)
        .filter(|wanted| !subjects.iter().any(|s| SubjectIdentity::from(s) == *wanted))
        .collect()
}
