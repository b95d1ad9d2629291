// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Field-level Submission Encryption
//!
//! Encrypts the elements of a submission that the webform marks for
//! encryption. Every leaf of an encrypted element is sealed on its own and
//! stored as a JSON wrapper naming the profile that produced it:
//!
//! ```text
//! "address": { "city": "X" }
//!        │  encrypt_submission
//!        ▼
//! "address": { "city": "{\"data\":\"<base64>\",\"encrypt_profile\":\"P1\"}" }
//! ```
//!
//! Decryption reads the profile id back out of each wrapper, so values
//! written under an older profile keep decrypting after the element is
//! reconfigured.
//!
//! ## Call discipline
//!
//! `encrypt_submission` must run once per persistence operation. Sealing an
//! already sealed wrapper nests it, and nothing here detects that.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::access::{Account, Permission};
use crate::crypto::{
    EncryptError, EncryptResult, EncryptService, EncryptionProfile, ProfileRepository,
};
use crate::submission::{FieldEncryptionConfig, SubmissionData};

/// Placeholder shown instead of a decrypted value to accounts lacking the
/// `view encrypted values` permission.
pub const REDACTED_VALUE: &str = "[Value Encrypted]";

/// Stored form of one encrypted leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedLeaf {
    /// Ciphertext.
    pub data: String,
    /// Id of the profile that produced `data`.
    pub encrypt_profile: String,
}

impl EncryptedLeaf {
    /// Serialize for storage in a submission leaf.
    pub fn to_stored(&self) -> EncryptResult<String> {
        serde_json::to_string(self)
            .map_err(|e| EncryptError::Cipher(format!("cannot serialize encrypted value: {e}")))
    }

    /// Parse a stored leaf. `None` when the value is not a wrapper.
    pub fn parse(stored: &str) -> Option<Self> {
        serde_json::from_str(stored).ok()
    }
}

/// Applies [`EncryptService`] across a submission data tree.
pub struct SubmissionCipher<'a> {
    service: &'a EncryptService,
    profiles: &'a dyn ProfileRepository,
}

impl<'a> SubmissionCipher<'a> {
    pub fn new(service: &'a EncryptService, profiles: &'a dyn ProfileRepository) -> Self {
        Self { service, profiles }
    }

    /// Return a copy of `data` with every leaf of every encrypted element
    /// sealed. Elements not configured, or configured with `encrypt` off,
    /// are copied unchanged.
    ///
    /// Fails when an element's profile cannot be resolved or a leaf fails
    /// to encrypt; no partially encrypted data is returned.
    pub fn encrypt_submission(
        &self,
        data: &SubmissionData,
        config: &FieldEncryptionConfig,
    ) -> EncryptResult<SubmissionData> {
        let mut sealed = data.clone();
        for (element, value) in sealed.iter_mut() {
            let Some(profile_id) = config.profile_for(element) else {
                continue;
            };
            let profile = self.profiles.resolve_profile(profile_id)?;
            value.try_for_each_leaf_mut(&mut |leaf: &mut String| -> EncryptResult<()> {
                *leaf = self.seal(leaf, &profile)?;
                Ok(())
            })?;
            debug!(element = %element, profile = %profile.id, "Encrypted element");
        }
        Ok(sealed)
    }

    /// Return a copy of `data` with every leaf of every encrypted element
    /// opened.
    ///
    /// With `check_permissions` set and an account lacking
    /// [`Permission::ViewEncryptedValues`], leaves are replaced with
    /// [`REDACTED_VALUE`] without being parsed. A leaf that is not a wrapper
    /// is returned unchanged. A wrapper naming a profile that no longer
    /// exists is an error.
    pub fn decrypt_submission(
        &self,
        data: &SubmissionData,
        config: &FieldEncryptionConfig,
        account: &Account,
        check_permissions: bool,
    ) -> EncryptResult<SubmissionData> {
        let redact = check_permissions && !account.has_permission(Permission::ViewEncryptedValues);
        let mut opened = data.clone();
        for (element, value) in opened.iter_mut() {
            if !config.is_encrypted(element) {
                continue;
            }
            value.try_for_each_leaf_mut(&mut |leaf: &mut String| -> EncryptResult<()> {
                if redact {
                    *leaf = REDACTED_VALUE.to_string();
                    return Ok(());
                }
                match EncryptedLeaf::parse(leaf) {
                    Some(wrapper) => *leaf = self.open(&wrapper)?,
                    None => warn!(
                        element = %element,
                        "Stored value is not an encrypted wrapper, returning it as stored"
                    ),
                }
                Ok(())
            })?;
        }
        Ok(opened)
    }

    /// Decrypt a stored leaf using the profile it names.
    pub fn open(&self, wrapper: &EncryptedLeaf) -> EncryptResult<String> {
        let profile = self.profiles.resolve_profile(&wrapper.encrypt_profile)?;
        self.service.decrypt(&wrapper.data, &profile)
    }

    fn seal(&self, plaintext: &str, profile: &EncryptionProfile) -> EncryptResult<String> {
        EncryptedLeaf {
            data: self.service.encrypt(plaintext, profile)?,
            encrypt_profile: profile.id.clone(),
        }
        .to_stored()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{InMemoryKeyRepository, InMemoryProfileRepository, Key, MethodRegistry};
    use crate::submission::SubmissionValue;
    use std::sync::Arc;

    fn service() -> EncryptService {
        let keys = InMemoryKeyRepository::new()
            .with_key(Key::inline_encryption("k1", "K1", &[1u8; 32]))
            .with_key(Key::inline_encryption("k2", "K2", &[2u8; 32]));
        EncryptService::new(MethodRegistry::with_defaults(), Arc::new(keys))
    }

    fn profiles() -> InMemoryProfileRepository {
        InMemoryProfileRepository::new()
            .with_profile(EncryptionProfile::new("P1", "P1", "aes_256_gcm", "k1"))
            .with_profile(
                EncryptionProfile::new("P2", "P2", "aes_256_gcm", "k2")
                    .with_option("associated_data", "rotated"),
            )
    }

    fn data() -> SubmissionData {
        let mut data = SubmissionData::new();
        data.insert("name".into(), SubmissionValue::scalar("Ada"));
        data.insert(
            "address".into(),
            SubmissionValue::record([("city", "X"), ("zip", "12345")]),
        );
        data.insert(
            "phones".into(),
            SubmissionValue::sequence([
                SubmissionValue::scalar("555-0100"),
                SubmissionValue::sequence(["555-0101"]),
            ]),
        );
        data
    }

    fn config() -> FieldEncryptionConfig {
        FieldEncryptionConfig::new()
            .encrypt("address", "P1")
            .encrypt("phones", "P1")
    }

    fn viewer() -> Account {
        Account::anonymous().with_permission(Permission::ViewEncryptedValues)
    }

    #[test]
    fn nested_leaves_are_wrapped_independently() {
        let service = service();
        let profiles = profiles();
        let cipher = SubmissionCipher::new(&service, &profiles);

        let sealed = cipher.encrypt_submission(&data(), &config()).unwrap();

        assert_eq!(sealed["name"], SubmissionValue::scalar("Ada"));
        for path in [["address", "city"], ["address", "zip"]] {
            let leaf = sealed[path[0]].get_path(&path[1..]).unwrap().as_scalar().unwrap();
            let wrapper = EncryptedLeaf::parse(leaf).unwrap();
            assert_eq!(wrapper.encrypt_profile, "P1");
            assert_ne!(wrapper.data, "X");
        }
    }

    #[test]
    fn round_trip_restores_structure() {
        let service = service();
        let profiles = profiles();
        let cipher = SubmissionCipher::new(&service, &profiles);

        let sealed = cipher.encrypt_submission(&data(), &config()).unwrap();
        let opened = cipher
            .decrypt_submission(&sealed, &config(), &Account::anonymous(), false)
            .unwrap();
        assert_eq!(opened, data());
    }

    #[test]
    fn disabled_and_unconfigured_elements_pass_through() {
        let service = service();
        let profiles = profiles();
        let cipher = SubmissionCipher::new(&service, &profiles);
        let mut config = FieldEncryptionConfig::new();
        config.set(
            "name",
            crate::submission::ElementEncryption {
                encrypt: false,
                encrypt_profile: "P1".into(),
            },
        );

        let sealed = cipher.encrypt_submission(&data(), &config).unwrap();
        assert_eq!(sealed, data());
    }

    #[test]
    fn redacts_without_permission() {
        let service = service();
        let profiles = profiles();
        let cipher = SubmissionCipher::new(&service, &profiles);

        let sealed = cipher.encrypt_submission(&data(), &config()).unwrap();
        let redacted = cipher
            .decrypt_submission(&sealed, &config(), &Account::anonymous(), true)
            .unwrap();

        assert_eq!(
            redacted["address"].get_path(&["zip"]),
            Some(&SubmissionValue::scalar(REDACTED_VALUE))
        );
        assert_eq!(redacted["name"], SubmissionValue::scalar("Ada"));

        let opened = cipher
            .decrypt_submission(&sealed, &config(), &viewer(), true)
            .unwrap();
        assert_eq!(opened, data());
    }

    #[test]
    fn malformed_wrapper_is_returned_unchanged() {
        let service = service();
        let profiles = profiles();
        let cipher = SubmissionCipher::new(&service, &profiles);

        let mut stored = SubmissionData::new();
        stored.insert("address".into(), SubmissionValue::scalar("legacy plaintext"));
        let opened = cipher
            .decrypt_submission(&stored, &config(), &viewer(), true)
            .unwrap();
        assert_eq!(opened, stored);
    }

    #[test]
    fn embedded_profile_wins_over_current_config() {
        let service = service();
        let profiles = profiles();
        let cipher = SubmissionCipher::new(&service, &profiles);

        let old = cipher.encrypt_submission(&data(), &config()).unwrap();
        let rotated = FieldEncryptionConfig::new()
            .encrypt("address", "P2")
            .encrypt("phones", "P2");

        let opened = cipher
            .decrypt_submission(&old, &rotated, &viewer(), true)
            .unwrap();
        assert_eq!(opened, data());
    }

    #[test]
    fn missing_profile_fails() {
        let service = service();
        let mut profiles = profiles();
        let sealed = SubmissionCipher::new(&service, &profiles)
            .encrypt_submission(&data(), &config())
            .unwrap();

        profiles.remove("P1");
        let cipher = SubmissionCipher::new(&service, &profiles);
        let err = cipher
            .decrypt_submission(&sealed, &config(), &viewer(), true)
            .unwrap_err();
        assert!(err.is_not_found());

        assert!(cipher.encrypt_submission(&data(), &config()).unwrap_err().is_not_found());
    }
}
