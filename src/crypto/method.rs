// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pluggable encryption methods.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::{AesGcmMethod, EncryptResult, HmacSha256Method, KeyMaterial};

/// Method options configured on a profile (option name → value).
pub type MethodConfig = BTreeMap<String, String>;

/// A cipher implementation selectable by profiles.
///
/// Implementations must be stateless: all per-profile state arrives through
/// the key and the option map.
pub trait EncryptionMethod: Send + Sync {
    /// Machine name referenced by profiles.
    fn id(&self) -> &'static str;

    /// Human readable name.
    fn label(&self) -> &'static str;

    /// Key type ids this method accepts.
    fn key_types(&self) -> &'static [&'static str];

    /// Whether ciphertext produced by this method can be turned back into
    /// plaintext. One-way methods return `false`.
    fn can_decrypt(&self) -> bool {
        true
    }

    /// Method-specific issues with the text/key/config combination. An empty
    /// list means the operation may proceed.
    fn check_dependencies(&self, text: &str, key: &KeyMaterial, config: &MethodConfig)
        -> Vec<String>;

    fn encrypt(
        &self,
        text: &str,
        key: &KeyMaterial,
        config: &MethodConfig,
    ) -> EncryptResult<String>;

    fn decrypt(
        &self,
        text: &str,
        key: &KeyMaterial,
        config: &MethodConfig,
    ) -> EncryptResult<String>;
}

/// Public description of a registered method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDefinition {
    pub id: String,
    pub label: String,
    pub can_decrypt: bool,
    pub key_types: Vec<String>,
}

/// Registered encryption methods keyed by id.
#[derive(Clone)]
pub struct MethodRegistry {
    methods: BTreeMap<&'static str, Arc<dyn EncryptionMethod>>,
}

impl MethodRegistry {
    /// A registry without any method.
    pub fn empty() -> Self {
        Self {
            methods: BTreeMap::new(),
        }
    }

    /// A registry with the built-in methods.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(AesGcmMethod));
        registry.register(Arc::new(HmacSha256Method));
        registry
    }

    /// Register a method, replacing any method with the same id.
    pub fn register(&mut self, method: Arc<dyn EncryptionMethod>) {
        self.methods.insert(method.id(), method);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn EncryptionMethod>> {
        self.methods.get(id).cloned()
    }

    pub fn definitions(&self) -> Vec<MethodDefinition> {
        self.methods
            .values()
            .map(|method| MethodDefinition {
                id: method.id().to_string(),
                label: method.label().to_string(),
                can_decrypt: method.can_decrypt(),
                key_types: method.key_types().iter().map(|t| t.to_string()).collect(),
            })
            .collect()
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.methods.keys()).finish()
    }
}
