// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scalar encrypt/decrypt under a profile.

use std::sync::Arc;

use tracing::debug;

use super::{
    EncryptError, EncryptResult, EncryptionMethod, EncryptionProfile, Key, KeyMaterial,
    KeyRepository, MethodDefinition, MethodRegistry,
};

/// Encrypts and decrypts single strings under an [`EncryptionProfile`].
///
/// Holds no per-call state; safe to share across threads.
#[derive(Clone)]
pub struct EncryptService {
    methods: MethodRegistry,
    keys: Arc<dyn KeyRepository>,
}

impl EncryptService {
    pub fn new(methods: MethodRegistry, keys: Arc<dyn KeyRepository>) -> Self {
        Self { methods, keys }
    }

    /// Definitions of every registered method.
    pub fn load_encryption_methods(&self) -> Vec<MethodDefinition> {
        self.methods.definitions()
    }

    pub fn encrypt(&self, text: &str, profile: &EncryptionProfile) -> EncryptResult<String> {
        let (method, key, material) = self.resolve(profile)?;
        let issues = self.issues(text, profile, method.as_ref(), &key, &material);
        if !issues.is_empty() {
            return Err(EncryptError::Validation(issues.join("; ")));
        }

        debug!(profile = %profile.id, method = method.id(), "Encrypting value");
        method.encrypt(text, &material, &profile.encryption_method_configuration)
    }

    /// Fails with [`EncryptError::UnsupportedOperation`] before touching the
    /// key when the profile's method is one-way.
    pub fn decrypt(&self, text: &str, profile: &EncryptionProfile) -> EncryptResult<String> {
        let method = self.method(profile)?;
        if !method.can_decrypt() {
            return Err(EncryptError::UnsupportedOperation {
                method: method.id().to_string(),
            });
        }

        let key = self.keys.get_key(&profile.encryption_key)?;
        let material = key.key_value()?;
        let issues = self.issues(text, profile, method.as_ref(), &key, &material);
        if !issues.is_empty() {
            return Err(EncryptError::Validation(issues.join("; ")));
        }

        debug!(profile = %profile.id, method = method.id(), "Decrypting value");
        method.decrypt(text, &material, &profile.encryption_method_configuration)
    }

    /// Issues that would block an operation with this text/profile pair.
    pub fn validate_profile(
        &self,
        text: &str,
        profile: &EncryptionProfile,
    ) -> EncryptResult<Vec<String>> {
        let (method, key, material) = self.resolve(profile)?;
        Ok(self.issues(text, profile, method.as_ref(), &key, &material))
    }

    fn method(&self, profile: &EncryptionProfile) -> EncryptResult<Arc<dyn EncryptionMethod>> {
        self.methods
            .get(&profile.encryption_method)
            .ok_or_else(|| EncryptError::not_found("encryption method", &profile.encryption_method))
    }

    fn resolve(
        &self,
        profile: &EncryptionProfile,
    ) -> EncryptResult<(Arc<dyn EncryptionMethod>, Key, KeyMaterial)> {
        let method = self.method(profile)?;
        let key = self.keys.get_key(&profile.encryption_key)?;
        let material = key.key_value()?;
        Ok((method, key, material))
    }

    fn issues(
        &self,
        text: &str,
        profile: &EncryptionProfile,
        method: &dyn EncryptionMethod,
        key: &Key,
        material: &KeyMaterial,
    ) -> Vec<String> {
        let mut issues = Vec::new();
        if !method.key_types().contains(&key.key_type.id()) {
            issues.push(format!(
                "Key {} has type {}, which method {} does not accept",
                key.id,
                key.key_type.id(),
                method.id()
            ));
        }
        issues.extend(key.key_type.validate_material(material));
        issues.extend(method.check_dependencies(
            text,
            material,
            &profile.encryption_method_configuration,
        ));
        issues
    }
}

impl std::fmt::Debug for EncryptService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptService")
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
