// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permissions of the acting account.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::submission::{FieldEncryptionConfig, SubmissionData};

/// Permissions recognised by the pipeline.
///
/// - `ViewEncryptedValues` - may read decrypted values of encrypted elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewEncryptedValues,
}

impl Permission {
    /// Parse a permission from its machine name or its human label
    /// (case-insensitive).
    pub fn parse(s: &str) -> Option<Permission> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "view_encrypted_values" => Some(Permission::ViewEncryptedValues),
            _ => None,
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::ViewEncryptedValues => write!(f, "view encrypted values"),
        }
    }
}

/// The account on whose behalf the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<String>,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

impl Account {
    /// An account without any permission.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The account internal hooks run as, able to read encrypted values
    /// regardless of who triggered them.
    pub fn system() -> Self {
        Self {
            id: Some("system".to_string()),
            permissions: BTreeSet::from([Permission::ViewEncryptedValues]),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Parse a comma-separated permission list. Unknown names are ignored.
    pub fn from_permission_list(id: Option<String>, list: &str) -> Self {
        Self {
            id,
            permissions: list.split(',').filter_map(Permission::parse).collect(),
        }
    }
}

/// Whether `account` may edit a submission holding `data`.
///
/// Editing is refused when any element present in the data is configured
/// for encryption and the account cannot view encrypted values, since the
/// edit form would otherwise be populated with redacted placeholders.
pub fn can_update_submission(
    account: &Account,
    data: &SubmissionData,
    config: &FieldEncryptionConfig,
) -> bool {
    if account.has_permission(Permission::ViewEncryptedValues) {
        return true;
    }
    !data.keys().any(|element| config.is_encrypted(element))
}
