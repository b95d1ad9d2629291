// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key definitions on the file store.
//!
//! Only the definition is stored. Material for `file` and `env` providers
//! stays where the provider points and is read on every use.

use std::path::PathBuf;

use crate::crypto::{EncryptError, EncryptResult, Key, KeyRepository};

use super::super::{check_id, FileStore, StorageError, StorageResult};

/// File-backed [`KeyRepository`]. Owns a handle to the store so it can be
/// shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct KeyStore {
    storage: FileStore,
}

impl KeyStore {
    pub fn new(storage: FileStore) -> Self {
        Self { storage }
    }

    fn path(&self, key_id: &str) -> StorageResult<PathBuf> {
        check_id("Key", key_id)?;
        Ok(self.storage.paths().key(key_id))
    }

    pub fn exists(&self, key_id: &str) -> bool {
        self.path(key_id).is_ok_and(|path| self.storage.exists(path))
    }

    pub fn get(&self, key_id: &str) -> StorageResult<Key> {
        let path = self.path(key_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Key {key_id}")));
        }
        self.storage.read_json(path)
    }

    pub fn create(&self, key: &Key) -> StorageResult<()> {
        if self.exists(&key.id) {
            return Err(StorageError::AlreadyExists(format!("Key {}", key.id)));
        }
        self.storage.write_json(self.path(&key.id)?, key)
    }

    pub fn update(&self, key: &Key) -> StorageResult<()> {
        if !self.exists(&key.id) {
            return Err(StorageError::NotFound(format!("Key {}", key.id)));
        }
        self.storage.write_json(self.path(&key.id)?, key)
    }

    pub fn delete(&self, key_id: &str) -> StorageResult<()> {
        if !self.exists(key_id) {
            return Err(StorageError::NotFound(format!("Key {key_id}")));
        }
        self.storage.delete(self.path(key_id)?)
    }

    pub fn list_all(&self) -> StorageResult<Vec<Key>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().keys_dir(), "json")?;
        ids.iter().map(|id| self.get(id)).collect()
    }
}

impl KeyRepository for KeyStore {
    fn list_keys(&self) -> EncryptResult<Vec<Key>> {
        self.list_all()
            .map_err(|e| EncryptError::Backend(e.to_string()))
    }

    fn get_key(&self, id: &str) -> EncryptResult<Key> {
        match self.get(id) {
            Ok(key) => Ok(key),
            Err(StorageError::NotFound(_)) => Err(EncryptError::not_found("key", id)),
            Err(e) => Err(EncryptError::Backend(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyFilter, KeyProvider, KeyType};
    use crate::storage::StoragePaths;
    use std::env;
    use std::fs;

    fn test_store() -> FileStore {
        let test_dir = env::temp_dir().join(format!("test-key-repo-{}", uuid::Uuid::new_v4()));
        let mut storage = FileStore::new(StoragePaths::new(&test_dir));
        storage.initialize().expect("Failed to initialize");
        storage
    }

    fn cleanup(storage: &FileStore) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    #[test]
    fn create_get_update_delete() {
        let storage = test_store();
        let keys = KeyStore::new(storage.clone());
        let mut key = Key::inline_encryption("k1", "Key one", &[5u8; 32]);

        keys.create(&key).unwrap();
        assert!(matches!(keys.create(&key), Err(StorageError::AlreadyExists(_))));
        assert_eq!(keys.get("k1").unwrap(), key);

        key.label = "Renamed".to_string();
        keys.update(&key).unwrap();
        assert_eq!(keys.get("k1").unwrap().label, "Renamed");

        keys.delete("k1").unwrap();
        assert!(matches!(keys.get("k1"), Err(StorageError::NotFound(_))));

        cleanup(&storage);
    }

    #[test]
    fn repository_queries_read_from_disk() {
        let storage = test_store();
        let keys = KeyStore::new(storage.clone());
        keys.create(&Key::inline_encryption("aes", "AES", &[5u8; 32])).unwrap();
        keys.create(&Key::new(
            "token",
            "Token",
            KeyType::Authentication,
            KeyProvider::Env {
                env_variable: "SOME_TOKEN".to_string(),
                base64_encoded: false,
            },
        ))
        .unwrap();

        assert_eq!(keys.get_key("aes").unwrap().key_value().unwrap().len(), 32);
        assert!(keys.get_key("nope").unwrap_err().is_not_found());
        assert_eq!(keys.get_keys_by_provider("env").unwrap().len(), 1);

        let options = keys
            .key_names_as_options(&KeyFilter {
                key_type: Some("encryption".to_string()),
                ..KeyFilter::default()
            })
            .unwrap();
        assert_eq!(options.get("aes").map(String::as_str), Some("AES"));
        assert_eq!(options.len(), 1);

        cleanup(&storage);
    }
}
