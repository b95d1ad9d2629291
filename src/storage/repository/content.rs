// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content records on the file store, one file per record.
//!
//! `find_by_field` scans every record. There is no secondary index.

use std::path::PathBuf;

use chrono::Utc;

use crate::content::record::{holds, oldest_first};
use crate::content::{ContentRecord, ContentStorage, SaveStatus};

use super::super::{check_id, FileStore, StorageError, StorageResult};

pub struct FileContentStore<'a> {
    storage: &'a FileStore,
}

impl<'a> FileContentStore<'a> {
    pub fn new(storage: &'a FileStore) -> Self {
        Self { storage }
    }

    fn path(&self, content_id: &str) -> StorageResult<PathBuf> {
        check_id("Content", content_id)?;
        Ok(self.storage.paths().content(content_id))
    }

    pub fn exists(&self, content_id: &str) -> bool {
        self.path(content_id).is_ok_and(|path| self.storage.exists(path))
    }

    pub fn list_all(&self) -> StorageResult<Vec<ContentRecord>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().content_dir(), "json")?;
        ids.iter().map(|id| self.load(id)).collect()
    }
}

impl ContentStorage for FileContentStore<'_> {
    fn save(&self, record: &mut ContentRecord) -> StorageResult<SaveStatus> {
        let status = match record.id.as_deref() {
            Some(id) if self.exists(id) => SaveStatus::Updated,
            _ => SaveStatus::New,
        };
        record.changed = Utc::now();
        let id = record
            .id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();
        self.storage.write_json(self.path(&id)?, record)?;
        Ok(status)
    }

    fn load(&self, id: &str) -> StorageResult<ContentRecord> {
        let path = self.path(id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Content {id}")));
        }
        self.storage.read_json(path)
    }

    fn delete(&self, record: &ContentRecord) -> StorageResult<()> {
        let id = record
            .id
            .as_deref()
            .ok_or_else(|| StorageError::NotFound("Content without id".to_string()))?;
        if !self.exists(id) {
            return Err(StorageError::NotFound(format!("Content {id}")));
        }
        self.storage.delete(self.path(id)?)
    }

    fn find_by_field(&self, field: &str, value: &str) -> StorageResult<Vec<ContentRecord>> {
        let mut found: Vec<ContentRecord> = self
            .list_all()?
            .into_iter()
            .filter(|record| holds(record, field, value))
            .collect();
        oldest_first(&mut found);
        Ok(found)
    }
}
