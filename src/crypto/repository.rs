// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lookup contracts for keys and profiles.
//!
//! Only [`KeyRepository::list_keys`] and [`KeyRepository::get_key`] touch the
//! backend; every other query is derived from them.

use std::collections::BTreeMap;

use super::{EncryptError, EncryptResult, EncryptionProfile, Key};

/// Filter for [`KeyRepository::key_names_as_options`]. Unset fields match
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFilter {
    pub key_type: Option<String>,
    pub key_type_group: Option<String>,
    pub provider: Option<String>,
}

impl KeyFilter {
    fn matches(&self, key: &Key) -> bool {
        self.key_type
            .as_deref()
            .is_none_or(|t| key.key_type.id() == t)
            && self
                .key_type_group
                .as_deref()
                .is_none_or(|g| key.key_type.group() == g)
            && self
                .provider
                .as_deref()
                .is_none_or(|p| key.key_provider.id() == p)
    }
}

pub trait KeyRepository: Send + Sync {
    fn list_keys(&self) -> EncryptResult<Vec<Key>>;

    fn get_key(&self, id: &str) -> EncryptResult<Key> {
        self.list_keys()?
            .into_iter()
            .find(|key| key.id == id)
            .ok_or_else(|| EncryptError::not_found("key", id))
    }

    /// Keys with the given ids. Unknown ids are left out.
    fn get_keys(&self, ids: &[&str]) -> EncryptResult<Vec<Key>> {
        Ok(self
            .list_keys()?
            .into_iter()
            .filter(|key| ids.contains(&key.id.as_str()))
            .collect())
    }

    fn get_keys_by_provider(&self, provider: &str) -> EncryptResult<Vec<Key>> {
        Ok(filter_keys(self.list_keys()?, |key| key.key_provider.id() == provider))
    }

    fn get_keys_by_type(&self, key_type: &str) -> EncryptResult<Vec<Key>> {
        Ok(filter_keys(self.list_keys()?, |key| key.key_type.id() == key_type))
    }

    fn get_keys_by_type_group(&self, group: &str) -> EncryptResult<Vec<Key>> {
        Ok(filter_keys(self.list_keys()?, |key| key.key_type.group() == group))
    }

    /// Key id → label for keys matching `filter`.
    fn key_names_as_options(&self, filter: &KeyFilter) -> EncryptResult<BTreeMap<String, String>> {
        Ok(self
            .list_keys()?
            .into_iter()
            .filter(|key| filter.matches(key))
            .map(|key| (key.id, key.label))
            .collect())
    }
}

fn filter_keys(keys: Vec<Key>, predicate: impl Fn(&Key) -> bool) -> Vec<Key> {
    keys.into_iter().filter(|key| predicate(key)).collect()
}

pub trait ProfileRepository: Send + Sync {
    fn resolve_profile(&self, id: &str) -> EncryptResult<EncryptionProfile>;

    fn list_profiles(&self) -> EncryptResult<Vec<EncryptionProfile>>;
}

// =============================================================================
// In-memory implementations
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyRepository {
    keys: BTreeMap<String, Key>,
}

impl InMemoryKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Key) {
        self.keys.insert(key.id.clone(), key);
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.insert(key);
        self
    }
}

impl KeyRepository for InMemoryKeyRepository {
    fn list_keys(&self) -> EncryptResult<Vec<Key>> {
        Ok(self.keys.values().cloned().collect())
    }

    fn get_key(&self, id: &str) -> EncryptResult<Key> {
        self.keys
            .get(id)
            .cloned()
            .ok_or_else(|| EncryptError::not_found("key", id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: BTreeMap<String, EncryptionProfile>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: EncryptionProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    pub fn remove(&mut self, id: &str) -> Option<EncryptionProfile> {
        self.profiles.remove(id)
    }

    pub fn with_profile(mut self, profile: EncryptionProfile) -> Self {
        self.insert(profile);
        self
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn resolve_profile(&self, id: &str) -> EncryptResult<EncryptionProfile> {
        self.profiles
            .get(id)
            .cloned()
            .ok_or_else(|| EncryptError::not_found("encryption profile", id))
    }

    fn list_profiles(&self) -> EncryptResult<Vec<EncryptionProfile>> {
        Ok(self.profiles.values().cloned().collect())
    }
}
