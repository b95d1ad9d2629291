// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-disk layout of the data store.
//!
//! ```text
//! {root}/
//!   keys/{key_id}.json
//!   encryption_profiles/{profile_id}.json
//!   webforms/{webform_id}.json
//!   submissions/{webform_id}/{sid}.json     # encrypted elements sealed
//!   content_types/{type_id}.json
//!   content/{content_id}.json
//!   content_creators/{creator_id}.json
//! ```

use std::path::{Path, PathBuf};

/// Default root, relative to the working directory.
pub const DATA_ROOT: &str = "./data";

/// Whether `id` maps to exactly one file name inside its entity directory.
///
/// Ids are joined into paths unchanged, so separators, parent references
/// and NUL are refused.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && !id.contains("..")
        && !id.contains(['/', '\\', '\0'])
}

#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Encryption Paths ==========

    pub fn keys_dir(&self) -> PathBuf {
        self.root.join("keys")
    }

    pub fn key(&self, key_id: &str) -> PathBuf {
        self.keys_dir().join(format!("{key_id}.json"))
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("encryption_profiles")
    }

    pub fn profile(&self, profile_id: &str) -> PathBuf {
        self.profiles_dir().join(format!("{profile_id}.json"))
    }

    // ========== Webform Paths ==========

    pub fn webforms_dir(&self) -> PathBuf {
        self.root.join("webforms")
    }

    pub fn webform(&self, webform_id: &str) -> PathBuf {
        self.webforms_dir().join(format!("{webform_id}.json"))
    }

    pub fn submissions_dir(&self) -> PathBuf {
        self.root.join("submissions")
    }

    /// Directory holding the submissions of one webform.
    pub fn webform_submissions_dir(&self, webform_id: &str) -> PathBuf {
        self.submissions_dir().join(webform_id)
    }

    pub fn submission(&self, webform_id: &str, sid: &str) -> PathBuf {
        self.webform_submissions_dir(webform_id)
            .join(format!("{sid}.json"))
    }

    // ========== Content Paths ==========

    pub fn content_types_dir(&self) -> PathBuf {
        self.root.join("content_types")
    }

    pub fn content_type(&self, type_id: &str) -> PathBuf {
        self.content_types_dir().join(format!("{type_id}.json"))
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    pub fn content(&self, content_id: &str) -> PathBuf {
        self.content_dir().join(format!("{content_id}.json"))
    }

    pub fn creators_dir(&self) -> PathBuf {
        self.root.join("content_creators")
    }

    pub fn creator(&self, creator_id: &str) -> PathBuf {
        self.creators_dir().join(format!("{creator_id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_plain_file_names() {
        for id in ["k1", "contact_to_article", "c-1", "17", "a.b"] {
            assert!(is_valid_id(id), "{id} should be accepted");
        }
        for id in ["", ".", "..", "../x", "a/b", "a\\b", "a\0b", "x..y", "/etc/passwd"] {
            assert!(!is_valid_id(id), "{id:?} should be rejected");
        }
    }

    #[test]
    fn default_paths_use_data_root() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new("./data"));
    }

    #[test]
    fn encryption_paths_are_correct() {
        let paths = StoragePaths::new("/srv/vault");
        assert_eq!(paths.key("k1"), PathBuf::from("/srv/vault/keys/k1.json"));
        assert_eq!(
            paths.profile("p1"),
            PathBuf::from("/srv/vault/encryption_profiles/p1.json")
        );
    }

    #[test]
    fn submission_paths_nest_under_webform() {
        let paths = StoragePaths::new("/srv/vault");
        assert_eq!(
            paths.webform_submissions_dir("contact"),
            PathBuf::from("/srv/vault/submissions/contact")
        );
        assert_eq!(
            paths.submission("contact", "17"),
            PathBuf::from("/srv/vault/submissions/contact/17.json")
        );
    }

    #[test]
    fn content_paths_are_correct() {
        let paths = StoragePaths::new("/srv/vault");
        assert_eq!(
            paths.content_type("article"),
            PathBuf::from("/srv/vault/content_types/article.json")
        );
        assert_eq!(paths.content("c-1"), PathBuf::from("/srv/vault/content/c-1.json"));
        assert_eq!(
            paths.creator("contact_to_article"),
            PathBuf::from("/srv/vault/content_creators/contact_to_article.json")
        );
    }
}
