// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Keys, key types and key providers.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::{EncryptError, EncryptResult};

// =============================================================================
// Key Material
// =============================================================================

/// Raw key bytes. Zeroed on drop, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED; {} bytes])", self.0.len())
    }
}

// =============================================================================
// Key Type
// =============================================================================

/// What a key is meant for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyType {
    /// Symmetric encryption key of a fixed size in bits.
    Encryption { key_size: u32 },
    Authentication,
    /// Authentication key made of several values.
    AuthenticationMultivalue,
}

impl KeyType {
    /// Machine name of the type.
    pub fn id(&self) -> &'static str {
        match self {
            KeyType::Encryption { .. } => "encryption",
            KeyType::Authentication => "authentication",
            KeyType::AuthenticationMultivalue => "authentication_multivalue",
        }
    }

    /// Group the type belongs to.
    pub fn group(&self) -> &'static str {
        match self {
            KeyType::Encryption { .. } => "encryption",
            KeyType::Authentication | KeyType::AuthenticationMultivalue => "authentication",
        }
    }

    /// Check material against the type's constraints.
    pub fn validate_material(&self, material: &KeyMaterial) -> Vec<String> {
        let mut issues = Vec::new();
        match self {
            KeyType::Encryption { key_size } => {
                let expected = (*key_size / 8) as usize;
                if material.len() != expected {
                    issues.push(format!(
                        "Key size mismatch: the key type declares {key_size} bits but the key value is {} bits",
                        material.len() * 8
                    ));
                }
            }
            KeyType::Authentication | KeyType::AuthenticationMultivalue => {
                if material.is_empty() {
                    issues.push("Authentication key value is empty".to_string());
                }
            }
        }
        issues
    }
}

// =============================================================================
// Key Provider
// =============================================================================

/// Where key material is retrieved from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum KeyProvider {
    /// Material stored inline in the key definition.
    Config {
        key_value: String,
        #[serde(default)]
        base64_encoded: bool,
    },
    /// Material read from a file on every use.
    File {
        file_location: PathBuf,
        #[serde(default)]
        base64_encoded: bool,
        #[serde(default)]
        strip_line_breaks: bool,
    },
    /// Material read from an environment variable on every use.
    Env {
        env_variable: String,
        #[serde(default)]
        base64_encoded: bool,
    },
}

impl KeyProvider {
    /// Machine name of the provider.
    pub fn id(&self) -> &'static str {
        match self {
            KeyProvider::Config { .. } => "config",
            KeyProvider::File { .. } => "file",
            KeyProvider::Env { .. } => "env",
        }
    }

    /// Retrieve the key material.
    pub fn key_value(&self) -> EncryptResult<KeyMaterial> {
        match self {
            KeyProvider::Config {
                key_value,
                base64_encoded,
            } => decode(key_value.as_bytes().to_vec(), *base64_encoded),
            KeyProvider::File {
                file_location,
                base64_encoded,
                strip_line_breaks,
            } => {
                let mut bytes = fs::read(file_location).map_err(|e| {
                    EncryptError::KeyUnavailable(format!(
                        "cannot read key file {}: {e}",
                        file_location.display()
                    ))
                })?;
                if *strip_line_breaks {
                    while matches!(bytes.last(), Some(b'\n') | Some(b'\r')) {
                        bytes.pop();
                    }
                }
                decode(bytes, *base64_encoded)
            }
            KeyProvider::Env {
                env_variable,
                base64_encoded,
            } => {
                let value = std::env::var(env_variable).map_err(|e| {
                    EncryptError::KeyUnavailable(format!(
                        "cannot read environment variable {env_variable}: {e}"
                    ))
                })?;
                decode(value.into_bytes(), *base64_encoded)
            }
        }
    }
}

fn decode(mut raw: Vec<u8>, base64_encoded: bool) -> EncryptResult<KeyMaterial> {
    if !base64_encoded {
        return Ok(KeyMaterial::new(raw));
    }
    let decoded = std::str::from_utf8(&raw)
        .map_err(|e| EncryptError::KeyUnavailable(format!("base64 key is not UTF-8: {e}")))
        .and_then(|text| {
            Base64::decode_vec(text.trim())
                .map_err(|e| EncryptError::KeyUnavailable(format!("invalid base64 key: {e}")))
        });
    raw.zeroize();
    decoded.map(KeyMaterial::new)
}

impl fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyProvider::Config { base64_encoded, .. } => f
                .debug_struct("Config")
                .field("key_value", &"[REDACTED]")
                .field("base64_encoded", base64_encoded)
                .finish(),
            KeyProvider::File {
                file_location,
                base64_encoded,
                strip_line_breaks,
            } => f
                .debug_struct("File")
                .field("file_location", file_location)
                .field("base64_encoded", base64_encoded)
                .field("strip_line_breaks", strip_line_breaks)
                .finish(),
            KeyProvider::Env {
                env_variable,
                base64_encoded,
            } => f
                .debug_struct("Env")
                .field("env_variable", env_variable)
                .field("base64_encoded", base64_encoded)
                .finish(),
        }
    }
}

// =============================================================================
// Key
// =============================================================================

/// A named key definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub key_type: KeyType,
    pub key_provider: KeyProvider,
}

impl Key {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        key_type: KeyType,
        key_provider: KeyProvider,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            key_type,
            key_provider,
        }
    }

    /// An encryption key whose material is stored inline (base64).
    pub fn inline_encryption(
        id: impl Into<String>,
        label: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self::new(
            id,
            label,
            KeyType::Encryption {
                key_size: (bytes.len() * 8) as u32,
            },
            KeyProvider::Config {
                key_value: Base64::encode_string(bytes),
                base64_encoded: true,
            },
        )
    }

    /// Retrieve the key material from the provider.
    pub fn key_value(&self) -> EncryptResult<KeyMaterial> {
        self.key_provider.key_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inline_key_round_trips_material() {
        let key = Key::inline_encryption("k1", "Key 1", &[7u8; 32]);
        assert_eq!(key.key_type, KeyType::Encryption { key_size: 256 });
        assert_eq!(key.key_value().unwrap().as_bytes(), &[7u8; 32]);
    }

    #[test]
    fn debug_output_never_shows_material() {
        let key = Key::new(
            "k1",
            "Key 1",
            KeyType::Authentication,
            KeyProvider::Config {
                key_value: "super-secret".to_string(),
                base64_encoded: false,
            },
        );
        let printed = format!("{key:?} {:?}", key.key_value().unwrap());
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn file_provider_strips_line_breaks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"secret-value\r\n").unwrap();

        let provider = KeyProvider::File {
            file_location: file.path().to_path_buf(),
            base64_encoded: false,
            strip_line_breaks: true,
        };
        assert_eq!(provider.key_value().unwrap().as_bytes(), b"secret-value");
    }

    #[test]
    fn missing_file_is_key_unavailable() {
        let provider = KeyProvider::File {
            file_location: PathBuf::from("/nonexistent/key/file"),
            base64_encoded: false,
            strip_line_breaks: false,
        };
        assert!(matches!(
            provider.key_value(),
            Err(EncryptError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn invalid_base64_is_key_unavailable() {
        let provider = KeyProvider::Config {
            key_value: "***".to_string(),
            base64_encoded: true,
        };
        assert!(matches!(
            provider.key_value(),
            Err(EncryptError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn encryption_type_checks_size() {
        let key_type = KeyType::Encryption { key_size: 256 };
        assert!(key_type.validate_material(&KeyMaterial::new(vec![0u8; 32])).is_empty());
        assert_eq!(
            key_type.validate_material(&KeyMaterial::new(vec![0u8; 16])).len(),
            1
        );
    }

    #[test]
    fn type_groups() {
        assert_eq!(KeyType::Authentication.group(), "authentication");
        assert_eq!(KeyType::AuthenticationMultivalue.group(), "authentication");
        assert_eq!(KeyType::Encryption { key_size: 128 }.group(), "encryption");
        assert_eq!(KeyType::AuthenticationMultivalue.id(), "authentication_multivalue");
    }

    #[test]
    fn key_definition_json_shape() {
        let json = r#"{
            "id": "k1",
            "label": "Key 1",
            "key_type": {"type": "encryption", "key_size": 128},
            "key_provider": {"provider": "env", "env_variable": "K1"}
        }"#;
        let key: Key = serde_json::from_str(json).unwrap();
        assert_eq!(key.key_provider.id(), "env");
        assert_eq!(key.key_type.id(), "encryption");
        assert_eq!(key.description, "");
    }
}
