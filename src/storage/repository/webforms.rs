// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webform definitions and their element encryption settings.

use std::path::PathBuf;

use crate::submission::Webform;

use super::super::{check_id, FileStore, StorageError, StorageResult};

pub struct WebformRepository<'a> {
    storage: &'a FileStore,
}

impl<'a> WebformRepository<'a> {
    pub fn new(storage: &'a FileStore) -> Self {
        Self { storage }
    }

    fn path(&self, webform_id: &str) -> StorageResult<PathBuf> {
        check_id("Webform", webform_id)?;
        Ok(self.storage.paths().webform(webform_id))
    }

    pub fn exists(&self, webform_id: &str) -> bool {
        self.path(webform_id).is_ok_and(|path| self.storage.exists(path))
    }

    pub fn get(&self, webform_id: &str) -> StorageResult<Webform> {
        let path = self.path(webform_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Webform {webform_id}")));
        }
        self.storage.read_json(path)
    }

    pub fn create(&self, webform: &Webform) -> StorageResult<()> {
        if self.exists(&webform.id) {
            return Err(StorageError::AlreadyExists(format!("Webform {}", webform.id)));
        }
        self.storage.write_json(self.path(&webform.id)?, webform)
    }

    pub fn update(&self, webform: &Webform) -> StorageResult<()> {
        if !self.exists(&webform.id) {
            return Err(StorageError::NotFound(format!("Webform {}", webform.id)));
        }
        self.storage.write_json(self.path(&webform.id)?, webform)
    }

    pub fn delete(&self, webform_id: &str) -> StorageResult<()> {
        if !self.exists(webform_id) {
            return Err(StorageError::NotFound(format!("Webform {webform_id}")));
        }
        self.storage.delete(self.path(webform_id)?)
    }

    pub fn list_all(&self) -> StorageResult<Vec<Webform>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().webforms_dir(), "json")?;

        let mut webforms = Vec::new();
        for id in ids {
            if let Ok(webform) = self.get(&id) {
                webforms.push(webform);
            }
        }
        Ok(webforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use crate::submission::FieldEncryptionConfig;
    use std::env;
    use std::fs;

    fn test_store() -> FileStore {
        let test_dir = env::temp_dir().join(format!("test-webform-repo-{}", uuid::Uuid::new_v4()));
        let mut storage = FileStore::new(StoragePaths::new(&test_dir));
        storage.initialize().expect("Failed to initialize");
        storage
    }

    fn cleanup(storage: &FileStore) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    #[test]
    fn encryption_settings_survive_storage() {
        let storage = test_store();
        let repo = WebformRepository::new(&storage);
        let webform = Webform::new("contact", "Contact")
            .with_encryption(FieldEncryptionConfig::new().encrypt("email", "p1"));

        repo.create(&webform).unwrap();
        let loaded = repo.get("contact").unwrap();
        assert_eq!(loaded, webform);
        assert_eq!(loaded.element_encryption.profile_for("email"), Some("p1"));

        cleanup(&storage);
    }

    #[test]
    fn update_requires_existing() {
        let storage = test_store();
        let repo = WebformRepository::new(&storage);
        let webform = Webform::new("contact", "Contact");

        assert!(matches!(repo.update(&webform), Err(StorageError::NotFound(_))));
        repo.create(&webform).unwrap();
        repo.update(&Webform::new("contact", "Renamed")).unwrap();
        assert_eq!(repo.list_all().unwrap()[0].label, "Renamed");

        cleanup(&storage);
    }
}
