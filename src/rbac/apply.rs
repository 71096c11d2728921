//! # ClusterRoleBinding Apply Configuration
//!
//! Partial ClusterRoleBinding documents for server-side apply, and extraction
//! of the fields a given field manager owns on an observed object.
//!
//! Ownership is read from `metadata.managedFields`: the entry written by the
//! field manager with operation `Apply` (and no subresource) lists the owned
//! fields in `FieldsV1` form, e.g.
//!
//! ```json
//! {"f:metadata": {"f:labels": {"f:managed-by": {}}}, "f:subjects": {}}
//! ```
//!
//! Only owned fields are copied into the extracted configuration, so applying
//! it back unchanged is a no-op.

use crate::rbac::error::ExtractError;
use crate::rbac::subject::union_subjects;
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ManagedFieldsEntry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const API_VERSION: &str = "rbac.authorization.k8s.io/v1";
const KIND: &str = "ClusterRoleBinding";
const APPLY_OPERATION: &str = "Apply";
const FIELDS_V1: &str = "FieldsV1";

/// Apply configuration for a ClusterRoleBinding
///
/// Absent fields are not sent, so the apply never claims ownership of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRoleBindingApply {
    pub api_version: String,
    pub kind: String,
    pub metadata: ApplyMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_ref: Option<RoleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Subject>>,
}

/// Metadata subset carried by an apply configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl ClusterRoleBindingApply {
    /// Empty configuration naming the binding and nothing else
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ApplyMetadata {
                name: name.into(),
                labels: None,
                annotations: None,
            },
            role_ref: None,
            subjects: None,
        }
    }

    /// Add subjects, skipping any whose (kind, name, namespace) is already listed
    #[must_use]
    pub fn with_subjects(mut self, subjects: impl IntoIterator<Item = Subject>) -> Self {
        let current = self.subjects.take().unwrap_or_default();
        self.subjects = Some(union_subjects(current, subjects));
        self
    }
}

/// Extract the apply configuration `field_manager` owns on `observed`
///
/// A manager with no `Apply` entry owns nothing; the result then only names
/// the object. Malformed ownership records are an error.
pub fn extract_cluster_role_binding(
    observed: &ClusterRoleBinding,
    field_manager: &str,
) -> Result<ClusterRoleBindingApply, ExtractError> {
    let name = observed
        .metadata
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or(ExtractError::MissingName)?;

    let mut config = ClusterRoleBindingApply::new(name);

    let Some(owned) = owned_fields(observed.metadata.managed_fields.as_deref(), field_manager)?
    else {
        return Ok(config);
    };

    if let Some(metadata) = child(owned, "f:metadata", field_manager)? {
        if let Some(labels) = child(metadata, "f:labels", field_manager)? {
            config.metadata.labels = copy_owned_keys(labels, observed.metadata.labels.as_ref());
        }
        if let Some(annotations) = child(metadata, "f:annotations", field_manager)? {
            config.metadata.annotations =
                copy_owned_keys(annotations, observed.metadata.annotations.as_ref());
        }
    }

    if child(owned, "f:roleRef", field_manager)?.is_some() {
        config.role_ref = Some(observed.role_ref.clone());
    }

    // subjects is an atomic list: owning it means owning every element
    if child(owned, "f:subjects", field_manager)?.is_some() {
        config.subjects = Some(observed.subjects.clone().unwrap_or_default());
    }

    Ok(config)
}

/// Locate the FieldsV1 set recorded for the manager's apply operation
fn owned_fields<'a>(
    entries: Option<&'a [ManagedFieldsEntry]>,
    field_manager: &str,
) -> Result<Option<&'a Map<String, Value>>, ExtractError> {
    let Some(entry) = entries.unwrap_or_default().iter().find(|e| {
        e.manager.as_deref() == Some(field_manager)
            && e.operation.as_deref() == Some(APPLY_OPERATION)
            && e.subresource.as_deref().unwrap_or_default().is_empty()
    }) else {
        return Ok(None);
    };

    if let Some(fields_type) = entry.fields_type.as_deref() {
        if fields_type != FIELDS_V1 {
            return Err(ExtractError::UnsupportedFieldsType {
                manager: field_manager.to_string(),
                fields_type: fields_type.to_string(),
            });
        }
    }

    match entry.fields_v1.as_ref().map(|f| &f.0) {
        None => Ok(None),
        Some(Value::Object(fields)) => Ok(Some(fields)),
        Some(other) => Err(malformed(
            field_manager,
            format!("expected an object at the root, found {}", json_type(other)),
        )),
    }
}

fn child<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
    field_manager: &str,
) -> Result<Option<&'a Map<String, Value>>, ExtractError> {
    match fields.get(key) {
        None => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(other) => Err(malformed(
            field_manager,
            format!("expected an object at '{key}', found {}", json_type(other)),
        )),
    }
}

/// Copy map entries whose `f:<key>` appears in the owned set
fn copy_owned_keys(
    owned: &Map<String, Value>,
    live: Option<&BTreeMap<String, String>>,
) -> Option<BTreeMap<String, String>> {
    let live = live?;
    let copied: BTreeMap<String, String> = owned
        .keys()
        .filter_map(|k| k.strip_prefix("f:"))
        .filter_map(|k| live.get_key_value(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (!copied.is_empty()).then_some(copied)
}

fn malformed(field_manager: &str, reason: String) -> ExtractError {
    ExtractError::MalformedFields {
        manager: field_manager.to_string(),
        reason,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
