// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content records produced from submissions.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{StorageError, StorageResult};
use crate::submission::SubmissionValue;

/// Value assigned to a content field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Text(String),
    /// Multi-value or composite element copied as a tree.
    Structured(SubmissionValue),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Structured(value) => value.as_scalar(),
            FieldValue::Boolean(_) => None,
        }
    }
}

impl From<SubmissionValue> for FieldValue {
    fn from(value: SubmissionValue) -> Self {
        match value {
            SubmissionValue::Scalar(text) => FieldValue::Text(text),
            other => FieldValue::Structured(other),
        }
    }
}

/// A content entity of some content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Assigned on first save.
    #[serde(default)]
    pub id: Option<String>,
    pub content_type: String,
    pub title: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
}

impl ContentRecord {
    pub fn new(content_type: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            content_type: content_type.into(),
            title: title.into(),
            fields: BTreeMap::new(),
            created: now,
            changed: now,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }
}

/// Result of [`ContentStorage::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    New,
    Updated,
}

/// Persistence for content records.
pub trait ContentStorage: Send + Sync {
    /// Insert or update. Assigns an id to new records and bumps `changed`.
    fn save(&self, record: &mut ContentRecord) -> StorageResult<SaveStatus>;

    fn load(&self, id: &str) -> StorageResult<ContentRecord>;

    fn delete(&self, record: &ContentRecord) -> StorageResult<()>;

    /// Records whose `field` holds `value`, oldest first.
    fn find_by_field(&self, field: &str, value: &str) -> StorageResult<Vec<ContentRecord>>;
}

/// Sort order shared by the content stores.
pub(crate) fn oldest_first(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
}

/// Filter shared by the content stores.
pub(crate) fn holds(record: &ContentRecord, field: &str, value: &str) -> bool {
    record.get(field).and_then(FieldValue::as_text) == Some(value)
}

#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    records: Mutex<BTreeMap<String, ContentRecord>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStorage for InMemoryContentStore {
    fn save(&self, record: &mut ContentRecord) -> StorageResult<SaveStatus> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        record.changed = Utc::now();
        let status = match record.id.as_deref() {
            Some(id) if records.contains_key(id) => SaveStatus::Updated,
            _ => SaveStatus::New,
        };
        let id = record
            .id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();
        records.insert(id, record.clone());
        Ok(status)
    }

    fn load(&self, id: &str) -> StorageResult<ContentRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("Content {id}")))
    }

    fn delete(&self, record: &ContentRecord) -> StorageResult<()> {
        let id = record
            .id
            .as_deref()
            .ok_or_else(|| StorageError::NotFound("Content without id".to_string()))?;
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("Content {id}")))
    }

    fn find_by_field(&self, field: &str, value: &str) -> StorageResult<Vec<ContentRecord>> {
        let mut found: Vec<ContentRecord> = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|record| holds(record, field, value))
            .cloned()
            .collect();
        oldest_first(&mut found);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_assigns_id_then_updates() {
        let store = InMemoryContentStore::new();
        let mut record = ContentRecord::new("article", "Hello");

        assert_eq!(store.save(&mut record).unwrap(), SaveStatus::New);
        let id = record.id.clone().unwrap();

        record.title = "Changed".to_string();
        assert_eq!(store.save(&mut record).unwrap(), SaveStatus::Updated);
        assert_eq!(store.load(&id).unwrap().title, "Changed");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn find_by_field_matches_text_values() {
        let store = InMemoryContentStore::new();
        let mut a = ContentRecord::new("article", "A");
        a.set("field_sid", FieldValue::Text("7".into()));
        let mut b = ContentRecord::new("article", "B");
        b.set("field_sid", FieldValue::Text("8".into()));
        store.save(&mut a).unwrap();
        store.save(&mut b).unwrap();

        let found = store.find_by_field("field_sid", "7").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "A");
        assert!(store.find_by_field("field_sid", "9").unwrap().is_empty());
    }

    #[test]
    fn delete_removes_record() {
        let store = InMemoryContentStore::new();
        let mut record = ContentRecord::new("article", "A");
        store.save(&mut record).unwrap();
        store.delete(&record).unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.delete(&record), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn field_values_serialize_untagged() {
        let mut record = ContentRecord::new("article", "A");
        record.set("status", FieldValue::Boolean(true));
        record.set("field_city", FieldValue::Text("X".into()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fields"]["status"], serde_json::json!(true));
        assert_eq!(json["fields"]["field_city"], serde_json::json!("X"));

        let back: ContentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
