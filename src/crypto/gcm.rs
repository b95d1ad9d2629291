// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use base64ct::{Base64, Encoding};

use super::{EncryptError, EncryptResult, EncryptionMethod, KeyMaterial, MethodConfig};

pub const METHOD_ID: &str = "aes_256_gcm";

/// Option binding extra context into the authentication tag. Ciphertext
/// only decrypts under the same value.
pub const ASSOCIATED_DATA: &str = "associated_data";

const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

/// AES-256-GCM with a random 96-bit nonce per value.
///
/// Output: `base64([nonce:12B][ciphertext][tag:16B])`
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmMethod;

impl AesGcmMethod {
    fn cipher(key: &KeyMaterial) -> EncryptResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| {
            EncryptError::Validation(format!(
                "AES-256-GCM requires a {}-bit key, got {} bits",
                KEY_LENGTH * 8,
                key.len() * 8
            ))
        })
    }

    fn associated_data(config: &MethodConfig) -> &[u8] {
        config
            .get(ASSOCIATED_DATA)
            .map(|aad| aad.as_bytes())
            .unwrap_or_default()
    }
}

impl EncryptionMethod for AesGcmMethod {
    fn id(&self) -> &'static str {
        METHOD_ID
    }

    fn label(&self) -> &'static str {
        "AES-256-GCM"
    }

    fn key_types(&self) -> &'static [&'static str] {
        &["encryption"]
    }

    fn check_dependencies(
        &self,
        _text: &str,
        key: &KeyMaterial,
        _config: &MethodConfig,
    ) -> Vec<String> {
        let mut issues = Vec::new();
        if key.len() != KEY_LENGTH {
            issues.push(format!(
                "AES-256-GCM requires a {}-bit key, got {} bits",
                KEY_LENGTH * 8,
                key.len() * 8
            ));
        }
        issues
    }

    fn encrypt(
        &self,
        text: &str,
        key: &KeyMaterial,
        config: &MethodConfig,
    ) -> EncryptResult<String> {
        let cipher = Self::cipher(key)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let payload = Payload {
            msg: text.as_bytes(),
            aad: Self::associated_data(config),
        };

        let ciphertext = cipher
            .encrypt(&nonce, payload)
            .map_err(|e| EncryptError::Cipher(format!("AES-256-GCM encryption failed: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(Base64::encode_string(&sealed))
    }

    fn decrypt(
        &self,
        text: &str,
        key: &KeyMaterial,
        config: &MethodConfig,
    ) -> EncryptResult<String> {
        let sealed = Base64::decode_vec(text.trim())
            .map_err(|e| EncryptError::Cipher(format!("ciphertext is not valid base64: {e}")))?;

        if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(EncryptError::Cipher(
                "ciphertext too short (missing nonce or tag)".to_string(),
            ));
        }

        let cipher = Self::cipher(key)?;
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LENGTH);
        let payload = Payload {
            msg: ciphertext,
            aad: Self::associated_data(config),
        };

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), payload)
            .map_err(|e| EncryptError::Cipher(format!("AES-256-GCM decryption failed: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| EncryptError::Cipher(format!("decrypted value is not UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> KeyMaterial {
        KeyMaterial::new(vec![0x42; KEY_LENGTH])
    }

    #[test]
    fn encrypt_then_decrypt() {
        let method = AesGcmMethod;
        let config = MethodConfig::new();
        let sealed = method.encrypt("Secret message", &key(), &config).unwrap();
        assert_ne!(sealed, "Secret message");
        assert_eq!(method.decrypt(&sealed, &key(), &config).unwrap(), "Secret message");
    }

    #[test]
    fn nonces_differ_per_call() {
        let method = AesGcmMethod;
        let config = MethodConfig::new();
        let a = method.encrypt("same", &key(), &config).unwrap();
        let b = method.encrypt("same", &key(), &config).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn associated_data_must_match() {
        let method = AesGcmMethod;
        let mut config = MethodConfig::new();
        config.insert(ASSOCIATED_DATA.to_string(), "form:contact".to_string());
        let sealed = method.encrypt("value", &key(), &config).unwrap();

        assert_eq!(method.decrypt(&sealed, &key(), &config).unwrap(), "value");
        assert!(matches!(
            method.decrypt(&sealed, &key(), &MethodConfig::new()),
            Err(EncryptError::Cipher(_))
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let method = AesGcmMethod;
        let config = MethodConfig::new();
        let sealed = method.encrypt("value", &key(), &config).unwrap();
        let other = KeyMaterial::new(vec![0x01; KEY_LENGTH]);
        assert!(method.decrypt(&sealed, &other, &config).is_err());
    }

    #[test]
    fn short_or_garbled_ciphertext_is_rejected() {
        let method = AesGcmMethod;
        let config = MethodConfig::new();
        assert!(method.decrypt("AAAA", &key(), &config).is_err());
        assert!(method.decrypt("not base64!", &key(), &config).is_err());
    }

    #[test]
    fn short_key_is_reported() {
        let short = KeyMaterial::new(vec![0; 16]);
        let issues = AesGcmMethod.check_dependencies("x", &short, &MethodConfig::new());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("128 bits"));
    }
}
