// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content type definitions on the file store.

use std::path::PathBuf;

use crate::content::{ContentSchemaProvider, ContentType};

use super::super::{check_id, FileStore, StorageError, StorageResult};

pub struct ContentTypeRepository<'a> {
    storage: &'a FileStore,
}

impl<'a> ContentTypeRepository<'a> {
    pub fn new(storage: &'a FileStore) -> Self {
        Self { storage }
    }

    fn path(&self, type_id: &str) -> StorageResult<PathBuf> {
        check_id("Content type", type_id)?;
        Ok(self.storage.paths().content_type(type_id))
    }

    pub fn exists(&self, type_id: &str) -> bool {
        self.path(type_id).is_ok_and(|path| self.storage.exists(path))
    }

    pub fn get(&self, type_id: &str) -> StorageResult<ContentType> {
        let path = self.path(type_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Content type {type_id}")));
        }
        self.storage.read_json(path)
    }

    pub fn create(&self, content_type: &ContentType) -> StorageResult<()> {
        if self.exists(&content_type.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Content type {}",
                content_type.id
            )));
        }
        self.storage.write_json(self.path(&content_type.id)?, content_type)
    }

    /// Replace a definition. Existing records keep fields the new
    /// definition drops; mapping simply stops writing them.
    pub fn update(&self, content_type: &ContentType) -> StorageResult<()> {
        if !self.exists(&content_type.id) {
            return Err(StorageError::NotFound(format!(
                "Content type {}",
                content_type.id
            )));
        }
        self.storage.write_json(self.path(&content_type.id)?, content_type)
    }

    pub fn delete(&self, type_id: &str) -> StorageResult<()> {
        if !self.exists(type_id) {
            return Err(StorageError::NotFound(format!("Content type {type_id}")));
        }
        self.storage.delete(self.path(type_id)?)
    }
}

impl ContentSchemaProvider for ContentTypeRepository<'_> {
    fn content_type(&self, id: &str) -> StorageResult<Option<ContentType>> {
        match self.get(id) {
            Ok(content_type) => Ok(Some(content_type)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn content_type_ids(&self) -> StorageResult<Vec<String>> {
        self.storage
            .list_files(self.storage.paths().content_types_dir(), "json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{content_field_ids, FieldSchema};
    use crate::storage::StoragePaths;
    use std::env;
    use std::fs;

    fn test_store() -> FileStore {
        let test_dir = env::temp_dir().join(format!("test-type-repo-{}", uuid::Uuid::new_v4()));
        let mut storage = FileStore::new(StoragePaths::new(&test_dir));
        storage.initialize().expect("Failed to initialize");
        storage
    }

    fn cleanup(storage: &FileStore) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    fn article() -> ContentType {
        ContentType::new("article", "Article")
            .with_field("title", FieldSchema::new("string").with_max_length(255))
            .with_field("field_email", FieldSchema::new("email"))
            .with_field("body", FieldSchema::new("text_long"))
            .with_field("promote", FieldSchema::new("boolean"))
    }

    #[test]
    fn schema_provider_reads_stored_types() {
        let storage = test_store();
        let repo = ContentTypeRepository::new(&storage);
        repo.create(&article()).unwrap();

        let loaded = repo.content_type("article").unwrap().expect("article exists");
        assert_eq!(loaded.fields["title"].limit(), Some(255));
        assert_eq!(content_field_ids(&loaded.fields), vec!["body", "field_email"]);
        assert_eq!(repo.content_type_ids().unwrap(), vec!["article"]);

        cleanup(&storage);
    }

    #[test]
    fn unknown_type_is_none() {
        let storage = test_store();
        let repo = ContentTypeRepository::new(&storage);
        assert!(repo.content_type("page").unwrap().is_none());
        assert!(matches!(repo.get("page"), Err(StorageError::NotFound(_))));
        cleanup(&storage);
    }

    #[test]
    fn update_and_delete() {
        let storage = test_store();
        let repo = ContentTypeRepository::new(&storage);
        repo.create(&article()).unwrap();
        assert!(matches!(repo.create(&article()), Err(StorageError::AlreadyExists(_))));

        repo.update(&ContentType::new("article", "Story")).unwrap();
        assert_eq!(repo.get("article").unwrap().label, "Story");

        repo.delete("article").unwrap();
        assert!(!repo.exists("article"));

        cleanup(&storage);
    }
}
