// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Submission persistence with element encryption.
//!
//! ```text
//! save(plaintext) ──encrypt once──▶ submissions/{webform}/{sid}.json
//!       ▲                                      │
//!       └── caller keeps plaintext             ▼
//!                             load(account) ──decrypt (redact if needed)
//! ```
//!
//! The encrypted copy is the only thing written. The caller's in-memory
//! submission is never replaced with ciphertext.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, warn};

use crate::access::{can_update_submission, Account};
use crate::field_crypt::SubmissionCipher;
use crate::submission::{Submission, Webform};

use super::super::{check_id, FileStore, StorageError, StorageResult};

pub struct SubmissionRepository<'a> {
    storage: &'a FileStore,
    cipher: SubmissionCipher<'a>,
}

impl<'a> SubmissionRepository<'a> {
    pub fn new(storage: &'a FileStore, cipher: SubmissionCipher<'a>) -> Self {
        Self { storage, cipher }
    }

    fn path(&self, webform_id: &str, sid: &str) -> StorageResult<PathBuf> {
        check_id("Webform", webform_id)?;
        check_id("Submission", sid)?;
        Ok(self.storage.paths().submission(webform_id, sid))
    }

    pub fn exists(&self, webform_id: &str, sid: &str) -> bool {
        self.path(webform_id, sid).is_ok_and(|path| self.storage.exists(path))
    }

    /// Persist a new or edited submission.
    ///
    /// `account` is checked against [`can_update_submission`] when a stored
    /// copy already exists. `submission.changed` is bumped; its data stays
    /// plaintext.
    pub fn save(
        &self,
        webform: &Webform,
        submission: &mut Submission,
        account: &Account,
    ) -> StorageResult<()> {
        if submission.webform_id != webform.id {
            return Err(StorageError::InvalidConfig(format!(
                "Submission {} belongs to webform {}, not {}",
                submission.sid, submission.webform_id, webform.id
            )));
        }
        let path = self.path(&webform.id, &submission.sid)?;

        if self.storage.exists(&path) {
            let stored = self.load_raw(&webform.id, &submission.sid)?;
            if !can_update_submission(account, &stored.data, &webform.element_encryption) {
                warn!(
                    webform = %webform.id,
                    sid = %submission.sid,
                    "Account may not update a submission holding encrypted values"
                );
                return Err(StorageError::PermissionDenied {
                    user_id: account.id.clone().unwrap_or_else(|| "anonymous".to_string()),
                    resource: format!("submission {}", submission.sid),
                });
            }
        }

        submission.changed = Utc::now();
        let mut sealed = submission.clone();
        sealed.data = self
            .cipher
            .encrypt_submission(&submission.data, &webform.element_encryption)?;

        self.storage.write_json(path, &sealed)?;
        debug!(webform = %webform.id, sid = %submission.sid, "Saved submission");
        Ok(())
    }

    /// Load and decrypt, redacting encrypted elements for accounts that
    /// cannot view them.
    pub fn load(
        &self,
        webform: &Webform,
        sid: &str,
        account: &Account,
    ) -> StorageResult<Submission> {
        let mut submission = self.load_raw(&webform.id, sid)?;
        submission.data = self.cipher.decrypt_submission(
            &submission.data,
            &webform.element_encryption,
            account,
            true,
        )?;
        Ok(submission)
    }

    /// Load exactly as stored, encrypted elements still sealed.
    pub fn load_raw(&self, webform_id: &str, sid: &str) -> StorageResult<Submission> {
        let path = self.path(webform_id, sid)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Submission {webform_id}/{sid}")));
        }
        self.storage.read_json(path)
    }

    pub fn delete(&self, webform_id: &str, sid: &str) -> StorageResult<()> {
        let path = self.path(webform_id, sid)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Submission {webform_id}/{sid}")));
        }
        self.storage.delete(path)
    }

    /// Submission ids of a webform, sorted.
    pub fn list_ids(&self, webform_id: &str) -> StorageResult<Vec<String>> {
        check_id("Webform", webform_id)?;
        self.storage.list_files(
            self.storage.paths().webform_submissions_dir(webform_id),
            "json",
        )
    }
}
