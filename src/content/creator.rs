// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content creator configuration: which webform feeds which content type,
//! and how submission values map onto content fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ContentSchemaProvider;
use crate::storage::StorageResult;

/// Source of one content field's value.
///
/// Exactly one source is active: a token template when `custom_check` is
/// set, otherwise the submission property or element named by
/// `webform_field`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// `true` when `webform_field` names a basic submission property
    /// rather than an element.
    #[serde(default, rename = "type")]
    pub is_property: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webform_field: Option<String>,
    #[serde(default)]
    pub custom_check: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_value: Option<String>,
}

impl FieldMapping {
    /// Map from a webform element.
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            webform_field: Some(name.into()),
            ..Self::default()
        }
    }

    /// Map from a basic submission property.
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            is_property: true,
            webform_field: Some(name.into()),
            ..Self::default()
        }
    }

    /// Map from a token template.
    pub fn custom(template: impl Into<String>) -> Self {
        Self {
            custom_check: true,
            custom_value: Some(template.into()),
            ..Self::default()
        }
    }

    fn issue(&self, field_id: &str) -> Option<String> {
        if self.custom_check {
            if self.custom_value.is_none() {
                return Some(format!("Mapping for {field_id} has no custom value"));
            }
        } else if self.webform_field.as_deref().is_none_or(str::is_empty) {
            return Some(format!("Mapping for {field_id} has no webform field"));
        }
        None
    }
}

/// Binding of a webform to a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCreator {
    pub id: String,
    /// Human readable label.
    pub title: String,
    /// Token template for the content title. Defaults to the webform label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_title: Option<String>,
    pub webform: String,
    pub content_type: String,
    /// Content field id → mapping.
    #[serde(default)]
    pub elements: BTreeMap<String, FieldMapping>,
    #[serde(default)]
    pub use_encrypt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_profile: Option<String>,
    /// Re-map linked content when a submission is edited.
    #[serde(default)]
    pub sync_content: bool,
    /// Delete linked content when a submission is deleted.
    #[serde(default)]
    pub sync_content_delete: bool,
    /// Content field holding the id of the source submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_content_node_field: Option<String>,
}

impl ContentCreator {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        webform: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            field_title: None,
            webform: webform.into(),
            content_type: content_type.into(),
            elements: BTreeMap::new(),
            use_encrypt: false,
            encryption_profile: None,
            sync_content: false,
            sync_content_delete: false,
            sync_content_node_field: None,
        }
    }

    pub fn with_mapping(mut self, field_id: impl Into<String>, mapping: FieldMapping) -> Self {
        self.elements.insert(field_id.into(), mapping);
        self
    }

    pub fn with_title_template(mut self, template: impl Into<String>) -> Self {
        self.field_title = Some(template.into());
        self
    }

    pub fn with_encryption(mut self, profile_id: impl Into<String>) -> Self {
        self.use_encrypt = true;
        self.encryption_profile = Some(profile_id.into());
        self
    }

    pub fn with_sync(mut self, field: impl Into<String>, edit: bool, delete: bool) -> Self {
        self.sync_content_node_field = Some(field.into());
        self.sync_content = edit;
        self.sync_content_delete = delete;
        self
    }

    /// Configuration problems that block saving.
    pub fn validate(&self) -> Vec<String> {
        let mut issues: Vec<String> = self
            .elements
            .iter()
            .filter_map(|(field_id, mapping)| mapping.issue(field_id))
            .collect();
        if self.use_encrypt && self.encryption_profile.as_deref().is_none_or(str::is_empty) {
            issues.push("Encryption is enabled but no encryption profile is set".to_string());
        }
        issues
    }

    /// Title template, falling back to the webform label.
    pub fn title_template<'a>(&'a self, webform_label: &'a str) -> &'a str {
        match self.field_title.as_deref() {
            Some(template) if !template.is_empty() => template,
            _ => webform_label,
        }
    }

    /// Configured sync field, if non-empty.
    pub fn sync_field(&self) -> Option<&str> {
        self.sync_content_node_field
            .as_deref()
            .filter(|field| !field.is_empty())
    }

    pub fn equals_webform(&self, webform: &str) -> bool {
        self.webform == webform
    }

    pub fn equals_content_type(&self, content_type: &str) -> bool {
        self.content_type == content_type
    }

    pub fn exists_content_type(&self, schemas: &dyn ContentSchemaProvider) -> StorageResult<bool> {
        Ok(schemas.content_type(&self.content_type)?.is_some())
    }

    /// Message reported after a create or update attempt.
    pub fn status_message(&self, saved: bool) -> String {
        if saved {
            format!("Saved the {} entity.", self.title)
        } else {
            format!("The {} entity was not saved.", self.title)
        }
    }
}
