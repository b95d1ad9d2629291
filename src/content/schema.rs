// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content type definitions.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::storage::StorageResult;

/// Base fields listed alongside `field_*` fields by [`content_field_ids`].
pub const CONTENT_BASIC_FIELDS: &[&str] = &["body", "status", "uid"];

/// Definition of one field of a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub field_type: String,
    /// Maximum length in characters. Absent or zero means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl FieldSchema {
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            max_length: None,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// The length limit to enforce, if any.
    pub fn limit(&self) -> Option<usize> {
        self.max_length.filter(|max| *max > 0)
    }
}

/// Field id → field definition.
pub type ContentSchema = BTreeMap<String, FieldSchema>;

/// A content type and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub fields: ContentSchema,
}

impl ContentType {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            fields: ContentSchema::new(),
        }
    }

    pub fn with_field(mut self, id: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.insert(id.into(), schema);
        self
    }
}

/// Source of content type definitions.
pub trait ContentSchemaProvider: Send + Sync {
    /// `Ok(None)` when no content type has this id.
    fn content_type(&self, id: &str) -> StorageResult<Option<ContentType>>;

    fn content_type_ids(&self) -> StorageResult<Vec<String>>;
}

/// Fields a mapping may target: custom `field_*` fields plus the basic
/// body/status/uid fields.
pub fn content_field_ids(schema: &ContentSchema) -> Vec<String> {
    schema
        .keys()
        .filter(|id| id.starts_with("field_") || CONTENT_BASIC_FIELDS.contains(&id.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
pub struct InMemorySchemaProvider {
    types: Mutex<BTreeMap<String, ContentType>>,
}

impl InMemorySchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, content_type: ContentType) {
        self.types
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(content_type.id.clone(), content_type);
    }

    pub fn with_type(self, content_type: ContentType) -> Self {
        self.insert(content_type);
        self
    }
}

impl ContentSchemaProvider for InMemorySchemaProvider {
    fn content_type(&self, id: &str) -> StorageResult<Option<ContentType>> {
        Ok(self
            .types
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned())
    }

    fn content_type_ids(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .types
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect())
    }
}
