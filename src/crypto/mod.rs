// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encryption Profiles
//!
//! Values are encrypted under a named [`EncryptionProfile`]: a bundle of an
//! encryption method, the method's options and a reference to a [`Key`].
//!
//! ```text
//! EncryptionProfile ──method id──▶ MethodRegistry ──▶ dyn EncryptionMethod
//!         │
//!         └────────key id──────▶ KeyRepository ──▶ Key ──provider──▶ KeyMaterial
//! ```
//!
//! Profiles hold key *references*, never key material. Material is fetched
//! from the key's provider on every use and zeroed on drop.
//!
//! ## Failure Model
//!
//! Resolution is strict: a profile whose method or key cannot be found is an
//! [`EncryptError::NotFound`], never a silent pass-through, since skipping
//! encryption would leave plaintext behind.

pub mod gcm;
pub mod hmac_digest;
pub mod key;
pub mod method;
pub mod profile;
pub mod repository;
pub mod service;

pub use gcm::AesGcmMethod;
pub use hmac_digest::HmacSha256Method;
pub use key::{Key, KeyMaterial, KeyProvider, KeyType};
pub use method::{EncryptionMethod, MethodConfig, MethodDefinition, MethodRegistry};
pub use profile::EncryptionProfile;
pub use repository::{
    InMemoryKeyRepository, InMemoryProfileRepository, KeyFilter, KeyRepository, ProfileRepository,
};
pub use service::EncryptService;

/// Errors raised while encrypting or decrypting.
#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
    /// The text/profile pair failed method validation. Issues are joined
    /// with `"; "`.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("encryption method {method} cannot decrypt")]
    UnsupportedOperation { method: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("key material unavailable: {0}")]
    KeyUnavailable(String),

    #[error("cipher failure: {0}")]
    Cipher(String),

    /// The repository backing a lookup failed for a reason other than a
    /// missing entry.
    #[error("repository error: {0}")]
    Backend(String),
}

impl EncryptError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        EncryptError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EncryptError::NotFound { .. })
    }
}

pub type EncryptResult<T> = Result<T, EncryptError>;
