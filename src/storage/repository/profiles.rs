// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encryption profiles on the file store.

use std::path::PathBuf;

use crate::crypto::{EncryptError, EncryptResult, EncryptionProfile, ProfileRepository};

use super::super::{check_id, FileStore, StorageError, StorageResult};

pub struct ProfileStore<'a> {
    storage: &'a FileStore,
}

impl<'a> ProfileStore<'a> {
    pub fn new(storage: &'a FileStore) -> Self {
        Self { storage }
    }

    fn path(&self, profile_id: &str) -> StorageResult<PathBuf> {
        check_id("Encryption profile", profile_id)?;
        Ok(self.storage.paths().profile(profile_id))
    }

    pub fn exists(&self, profile_id: &str) -> bool {
        self.path(profile_id).is_ok_and(|path| self.storage.exists(path))
    }

    pub fn get(&self, profile_id: &str) -> StorageResult<EncryptionProfile> {
        let path = self.path(profile_id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Encryption profile {profile_id}")));
        }
        self.storage.read_json(path)
    }

    pub fn create(&self, profile: &EncryptionProfile) -> StorageResult<()> {
        if self.exists(&profile.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Encryption profile {}",
                profile.id
            )));
        }
        self.storage.write_json(self.path(&profile.id)?, profile)
    }

    pub fn update(&self, profile: &EncryptionProfile) -> StorageResult<()> {
        if !self.exists(&profile.id) {
            return Err(StorageError::NotFound(format!(
                "Encryption profile {}",
                profile.id
            )));
        }
        self.storage.write_json(self.path(&profile.id)?, profile)
    }

    /// Values sealed under a deleted profile no longer decrypt.
    pub fn delete(&self, profile_id: &str) -> StorageResult<()> {
        if !self.exists(profile_id) {
            return Err(StorageError::NotFound(format!("Encryption profile {profile_id}")));
        }
        self.storage.delete(self.path(profile_id)?)
    }

    pub fn list_all(&self) -> StorageResult<Vec<EncryptionProfile>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().profiles_dir(), "json")?;
        ids.iter().map(|id| self.get(id)).collect()
    }
}

impl ProfileRepository for ProfileStore<'_> {
    fn resolve_profile(&self, id: &str) -> EncryptResult<EncryptionProfile> {
        match self.get(id) {
            Ok(profile) => Ok(profile),
            Err(StorageError::NotFound(_)) => {
                Err(EncryptError::not_found("encryption profile", id))
            }
            Err(e) => Err(EncryptError::Backend(e.to_string())),
        }
    }

    fn list_profiles(&self) -> EncryptResult<Vec<EncryptionProfile>> {
        self.list_all()
            .map_err(|e| EncryptError::Backend(e.to_string()))
    }
}
