// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content creator configurations on the file store.
//!
//! A configuration is validated before every write; invalid ones are
//! rejected with [`StorageError::InvalidConfig`].

use std::path::PathBuf;

use tracing::info;

use crate::content::ContentCreator;

use super::super::{check_id, FileStore, StorageError, StorageResult};

pub struct ContentCreatorRepository<'a> {
    storage: &'a FileStore,
}

impl<'a> ContentCreatorRepository<'a> {
    pub fn new(storage: &'a FileStore) -> Self {
        Self { storage }
    }

    fn path(&self, creator_id: &str) -> StorageResult<PathBuf> {
        check_id("Content creator", creator_id)?;
        Ok(self.storage.paths().creator(creator_id))
    }

    pub fn exists(&self, creator_id: &str) -> bool {
        self.path(creator_id).is_ok_and(|path| self.storage.exists(path))
    }

    pub fn get(&self, creator_id: &str) -> StorageResult<ContentCreator> {
        let path = self.path(creator_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Content creator {creator_id}")));
        }
        self.storage.read_json(path)
    }

    pub fn create(&self, creator: &ContentCreator) -> StorageResult<()> {
        if self.exists(&creator.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Content creator {}",
                creator.id
            )));
        }
        self.write(creator)
    }

    pub fn update(&self, creator: &ContentCreator) -> StorageResult<()> {
        if !self.exists(&creator.id) {
            return Err(StorageError::NotFound(format!(
                "Content creator {}",
                creator.id
            )));
        }
        self.write(creator)
    }

    pub fn delete(&self, creator_id: &str) -> StorageResult<()> {
        if !self.exists(creator_id) {
            return Err(StorageError::NotFound(format!("Content creator {creator_id}")));
        }
        self.storage.delete(self.path(creator_id)?)
    }

    pub fn list_all(&self) -> StorageResult<Vec<ContentCreator>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().creators_dir(), "json")?;
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Creators bound to `webform_id`, in id order.
    pub fn list_for_webform(&self, webform_id: &str) -> StorageResult<Vec<ContentCreator>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|creator| creator.equals_webform(webform_id))
            .collect())
    }

    fn write(&self, creator: &ContentCreator) -> StorageResult<()> {
        let issues = creator.validate();
        if !issues.is_empty() {
            return Err(StorageError::InvalidConfig(issues.join("; ")));
        }
        self.storage.write_json(self.path(&creator.id)?, creator)?;
        info!(creator = %creator.id, "{}", creator.status_message(true));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FieldMapping;
    use crate::storage::StoragePaths;
    use std::env;
    use std::fs;

    fn test_store() -> FileStore {
        let test_dir = env::temp_dir().join(format!("test-creator-repo-{}", uuid::Uuid::new_v4()));
        let mut storage = FileStore::new(StoragePaths::new(&test_dir));
        storage.initialize().expect("Failed to initialize");
        storage
    }

    fn cleanup(storage: &FileStore) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    #[test]
    fn list_for_webform_filters_by_webform() {
        let storage = test_store();
        let repo = ContentCreatorRepository::new(&storage);
        repo.create(&ContentCreator::new("b", "B", "contact", "article"))
            .unwrap();
        repo.create(&ContentCreator::new("a", "A", "contact", "page"))
            .unwrap();
        repo.create(&ContentCreator::new("c", "C", "survey", "article"))
            .unwrap();

        let ids: Vec<String> = repo
            .list_for_webform("contact")
            .unwrap()
            .into_iter()
            .map(|creator| creator.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        cleanup(&storage);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let storage = test_store();
        let repo = ContentCreatorRepository::new(&storage);
        let mut creator = ContentCreator::new("a", "A", "contact", "article")
            .with_mapping("field_x", FieldMapping::default());
        creator.use_encrypt = true;

        match repo.create(&creator) {
            Err(StorageError::InvalidConfig(msg)) => {
                assert!(msg.contains("field_x"));
                assert!(msg.contains("; "));
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
        assert!(!repo.exists("a"));

        cleanup(&storage);
    }

    #[test]
    fn ids_with_path_separators_are_rejected() {
        let storage = test_store();
        let repo = ContentCreatorRepository::new(&storage);

        let creator = ContentCreator::new("../webforms/contact", "A", "contact", "article");
        assert!(matches!(repo.create(&creator), Err(StorageError::InvalidConfig(_))));
        assert!(!storage.paths().webforms_dir().join("contact.json").exists());
        assert!(!repo.exists("../webforms/contact"));
        assert!(matches!(repo.get(".."), Err(StorageError::InvalidConfig(_))));

        cleanup(&storage);
    }

    #[test]
    fn stored_mappings_round_trip() {
        let storage = test_store();
        let repo = ContentCreatorRepository::new(&storage);
        let creator = ContentCreator::new("a", "A", "contact", "article")
            .with_mapping("field_email", FieldMapping::element("email"))
            .with_mapping("field_sid", FieldMapping::property("sid"))
            .with_mapping("body", FieldMapping::custom("[webform_submission:value:message]"))
            .with_encryption("p1")
            .with_sync("field_sid", true, true);

        repo.create(&creator).unwrap();
        assert_eq!(repo.get("a").unwrap(), creator);

        repo.delete("a").unwrap();
        assert!(matches!(repo.update(&creator), Err(StorageError::NotFound(_))));

        cleanup(&storage);
    }
}
