//! # RBAC Reconciliation Errors
//!
//! Every failure is returned to the caller with its source attached.
//! Nothing in this module retries.

use thiserror::Error;

/// Failure of a single ensure operation
#[derive(Debug, Error)]
pub enum RbacError {
    /// Reading the object failed for a reason other than absence
    #[error("failed to look up {kind} '{name}': {source}")]
    Lookup {
        kind: &'static str,
        name: String,
        source: kube::Error,
    },
    /// Creating an absent object failed (including create conflicts)
    #[error("failed to create {kind} '{name}': {source}")]
    Create {
        kind: &'static str,
        name: String,
        source: kube::Error,
    },
    /// The observed binding could not be turned into an apply configuration
    #[error("failed to extract apply configuration for ClusterRoleBinding '{name}': {source}")]
    Extract { name: String, source: ExtractError },
    /// Server-side apply of the merged binding failed
    #[error("failed to apply ClusterRoleBinding '{name}': {source}")]
    Apply { name: String, source: kube::Error },
}

impl RbacError {
    /// HTTP status code reported by the API server, if any
    pub fn api_code(&self) -> Option<u16> {
        match self {
            RbacError::Lookup { source, .. }
            | RbacError::Create { source, .. }
            | RbacError::Apply { source, .. } => match source {
                kube::Error::Api(response) => Some(response.code),
                _ => None,
            },
            RbacError::Extract { .. } => None,
        }
    }
}

/// Malformed observed state found while extracting an apply configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("observed object has no metadata.name")]
    MissingName,
    #[error("managed fields of '{manager}' use unsupported fieldsType '{fields_type}'")]
    UnsupportedFieldsType {
        manager: String,
        fields_type: String,
    },
    #[error("managed fields of '{manager}' are malformed: {reason}")]
    MalformedFields { manager: String, reason: String },
}
