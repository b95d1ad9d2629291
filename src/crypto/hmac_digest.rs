// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One-way keyed digest. Useful for values that only ever need comparing,
//! never reading back.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{EncryptError, EncryptResult, EncryptionMethod, KeyMaterial, MethodConfig};

type HmacSha256 = Hmac<Sha256>;

pub const METHOD_ID: &str = "hmac_sha256";

/// HMAC-SHA256 digest, base64 encoded. Encrypt-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Method;

impl EncryptionMethod for HmacSha256Method {
    fn id(&self) -> &'static str {
        METHOD_ID
    }

    fn label(&self) -> &'static str {
        "HMAC-SHA256 (one-way)"
    }

    fn key_types(&self) -> &'static [&'static str] {
        &["encryption", "authentication", "authentication_multivalue"]
    }

    fn can_decrypt(&self) -> bool {
        false
    }

    fn check_dependencies(
        &self,
        _text: &str,
        key: &KeyMaterial,
        _config: &MethodConfig,
    ) -> Vec<String> {
        if key.is_empty() {
            vec!["HMAC-SHA256 requires a non-empty key".to_string()]
        } else {
            Vec::new()
        }
    }

    fn encrypt(
        &self,
        text: &str,
        key: &KeyMaterial,
        _config: &MethodConfig,
    ) -> EncryptResult<String> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
            .map_err(|e| EncryptError::Cipher(format!("HMAC key rejected: {e}")))?;
        mac.update(text.as_bytes());
        Ok(Base64::encode_string(&mac.finalize().into_bytes()))
    }

    fn decrypt(
        &self,
        _text: &str,
        _key: &KeyMaterial,
        _config: &MethodConfig,
    ) -> EncryptResult<String> {
        Err(EncryptError::UnsupportedOperation {
            method: METHOD_ID.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_per_key() {
        let key = KeyMaterial::new(b"k".to_vec());
        let config = MethodConfig::new();
        let a = HmacSha256Method.encrypt("value", &key, &config).unwrap();
        let b = HmacSha256Method.encrypt("value", &key, &config).unwrap();
        assert_eq!(a, b);

        let other = KeyMaterial::new(b"k2".to_vec());
        assert_ne!(a, HmacSha256Method.encrypt("value", &other, &config).unwrap());
    }

    #[test]
    fn decrypt_is_unsupported() {
        let key = KeyMaterial::new(b"k".to_vec());
        assert!(matches!(
            HmacSha256Method.decrypt("x", &key, &MethodConfig::new()),
            Err(EncryptError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn empty_key_is_reported() {
        let empty = KeyMaterial::new(Vec::new());
        let issues = HmacSha256Method.check_dependencies("x", &empty, &MethodConfig::new());
        assert_eq!(issues.len(), 1);
    }
}
