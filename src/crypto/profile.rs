// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};

use super::MethodConfig;

/// Named bundle of method, method options and key reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionProfile {
    pub id: String,
    pub label: String,
    pub encryption_method: String,
    #[serde(default)]
    pub encryption_method_configuration: MethodConfig,
    /// Id of the key in the key repository.
    pub encryption_key: String,
}

impl EncryptionProfile {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        encryption_method: impl Into<String>,
        encryption_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            encryption_method: encryption_method.into(),
            encryption_method_configuration: MethodConfig::new(),
            encryption_key: encryption_key.into(),
        }
    }

    /// Set a method option.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.encryption_method_configuration
            .insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_defaults_to_empty() {
        let json = r#"{
            "id": "p1",
            "label": "P1",
            "encryption_method": "aes_256_gcm",
            "encryption_key": "k1"
        }"#;
        let profile: EncryptionProfile = serde_json::from_str(json).unwrap();
        assert!(profile.encryption_method_configuration.is_empty());
        assert_eq!(profile, EncryptionProfile::new("p1", "P1", "aes_256_gcm", "k1"));
    }

    #[test]
    fn options_are_recorded() {
        let profile = EncryptionProfile::new("p1", "P1", "aes_256_gcm", "k1")
            .with_option("associated_data", "contact");
        assert_eq!(
            profile.encryption_method_configuration.get("associated_data").map(String::as_str),
            Some("contact")
        );
    }
}
