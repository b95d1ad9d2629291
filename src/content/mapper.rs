// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Submission → Content Mapping
//!
//! [`ContentSync`] turns a submission into a content record following a
//! [`ContentCreator`], and keeps that record in step when the submission is
//! edited or deleted.
//!
//! ```text
//! Submission ──▶ title template ──▶ ContentRecord.title
//!     │
//!     └──▶ for each (field, mapping):
//!            custom_check  → token template (tokens decrypted)
//!            is_property   → submission property
//!            element       → data[element] (decrypted)
//!          then truncate to the field's max_length
//! ```
//!
//! ## Failure Model
//!
//! Mapping is lenient: missing schema fields, elements and properties are
//! skipped, and a value that fails to decrypt is used as stored.
//! Persistence failures are logged and reported as [`SyncOutcome::Failed`];
//! nothing here returns an error.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, error, info, warn};

use super::{
    scan, ContentCreator, ContentRecord, ContentSchema, ContentSchemaProvider, ContentStorage,
    FieldMapping, FieldValue, TokenResolver, WEBFORM_SUBMISSION,
};
use crate::crypto::{EncryptService, EncryptionProfile, ProfileRepository};
use crate::field_crypt::{EncryptedLeaf, SubmissionCipher};
use crate::submission::{Submission, SubmissionValue, Webform};

/// Operation that triggered an update sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Edit,
    Delete,
}

impl FromStr for SyncOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(SyncOperation::Edit),
            "delete" => Ok(SyncOperation::Delete),
            other => Err(format!("unknown sync operation: {other}")),
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::Edit => write!(f, "edit"),
            SyncOperation::Delete => write!(f, "delete"),
        }
    }
}

/// Result of a create or update sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Created(String),
    Updated(String),
    Deleted(String),
    /// Nothing to do under the current configuration.
    Skipped(String),
    Failed(String),
}

impl SyncOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(
            self,
            SyncOutcome::Created(_) | SyncOutcome::Updated(_) | SyncOutcome::Deleted(_)
        )
    }
}

/// Maps submissions onto content records.
pub struct ContentSync<'a> {
    service: &'a EncryptService,
    profiles: &'a dyn ProfileRepository,
    schemas: &'a dyn ContentSchemaProvider,
    storage: &'a dyn ContentStorage,
    tokens: &'a dyn TokenResolver,
}

impl<'a> ContentSync<'a> {
    pub fn new(
        service: &'a EncryptService,
        profiles: &'a dyn ProfileRepository,
        schemas: &'a dyn ContentSchemaProvider,
        storage: &'a dyn ContentStorage,
        tokens: &'a dyn TokenResolver,
    ) -> Self {
        Self {
            service,
            profiles,
            schemas,
            storage,
            tokens,
        }
    }

    /// Create a content record from a submission.
    pub fn create_content(
        &self,
        creator: &ContentCreator,
        webform: &Webform,
        submission: &Submission,
    ) -> SyncOutcome {
        if submission.data.is_empty() {
            debug!(creator = %creator.id, sid = %submission.sid, "Submission has no data, nothing to create");
            return SyncOutcome::Skipped("submission has no data".to_string());
        }

        let profile = self.creator_profile(creator);
        let schema = match self.schema(creator) {
            Ok(schema) => schema,
            Err(reason) => return SyncOutcome::Failed(reason),
        };

        let title = self.render_template(
            creator.title_template(&webform.label),
            submission,
            profile.as_ref(),
        );
        let mut record = ContentRecord::new(&creator.content_type, title);
        truncate_title(&mut record, &schema);
        self.map_to_record(&creator.elements, submission, &schema, profile.as_ref(), &mut record);

        if let Some(field) = creator.sync_field() {
            if schema.contains_key(field) && record.get(field).is_none() {
                record.set(field, FieldValue::Text(submission.sid.clone()));
            }
        }

        match self.storage.save(&mut record) {
            Ok(_) => {
                let id = record.id.unwrap_or_default();
                info!(creator = %creator.id, sid = %submission.sid, content_id = %id, "Created content from submission");
                SyncOutcome::Created(id)
            }
            Err(e) => {
                error!(creator = %creator.id, sid = %submission.sid, error = %e, "A problem occurred when creating content");
                SyncOutcome::Failed(e.to_string())
            }
        }
    }

    /// Propagate an edit or delete of a submission to its linked record.
    ///
    /// Only the oldest linked record is touched. A delete with delete-sync
    /// disabled is handled like an edit.
    pub fn update_content(
        &self,
        creator: &ContentCreator,
        webform: &Webform,
        submission: &Submission,
        operation: SyncOperation,
    ) -> SyncOutcome {
        let Some(sync_field) = creator.sync_field() else {
            return SyncOutcome::Skipped("no sync field configured".to_string());
        };

        let schema = match self.schema(creator) {
            Ok(schema) => schema,
            Err(reason) => return SyncOutcome::Failed(reason),
        };
        if !schema.contains_key(sync_field) {
            return SyncOutcome::Failed(format!(
                "sync field {sync_field} is not a field of {}",
                creator.content_type
            ));
        }

        if submission.data.is_empty() {
            return SyncOutcome::Skipped("submission has no data".to_string());
        }

        let profile = self.creator_profile(creator);

        let linked = match self.storage.find_by_field(sync_field, &submission.sid) {
            Ok(linked) => linked,
            Err(e) => {
                error!(creator = %creator.id, sid = %submission.sid, error = %e, "Cannot look up linked content");
                return SyncOutcome::Failed(e.to_string());
            }
        };
        debug!(creator = %creator.id, sid = %submission.sid, matches = linked.len(), "Linked content lookup");
        let Some(mut record) = linked.into_iter().next() else {
            return SyncOutcome::Skipped("no linked content".to_string());
        };
        let id = record.id.clone().unwrap_or_default();

        if operation == SyncOperation::Delete && creator.sync_content_delete {
            return match self.storage.delete(&record) {
                Ok(()) => {
                    info!(creator = %creator.id, sid = %submission.sid, content_id = %id, "Deleted linked content");
                    SyncOutcome::Deleted(id)
                }
                Err(e) => {
                    error!(creator = %creator.id, content_id = %id, error = %e, "A problem occurred while deleting content");
                    SyncOutcome::Failed(e.to_string())
                }
            };
        }

        if !creator.sync_content {
            return SyncOutcome::Skipped("content sync on edit is disabled".to_string());
        }

        record.title = self.render_template(
            creator.title_template(&webform.label),
            submission,
            profile.as_ref(),
        );
        truncate_title(&mut record, &schema);
        self.map_to_record(&creator.elements, submission, &schema, profile.as_ref(), &mut record);

        match self.storage.save(&mut record) {
            Ok(_) => {
                info!(creator = %creator.id, sid = %submission.sid, content_id = %id, "Updated linked content");
                SyncOutcome::Updated(id)
            }
            Err(e) => {
                error!(creator = %creator.id, content_id = %id, error = %e, "A problem occurred while updating content");
                SyncOutcome::Failed(e.to_string())
            }
        }
    }

    /// Apply every mapping to `record`. Fields absent from `schema`, and
    /// elements or properties absent from the submission, leave the record
    /// untouched.
    pub fn map_to_record(
        &self,
        mappings: &std::collections::BTreeMap<String, FieldMapping>,
        submission: &Submission,
        schema: &ContentSchema,
        profile: Option<&EncryptionProfile>,
        record: &mut ContentRecord,
    ) {
        for (field_id, mapping) in mappings {
            let Some(field) = schema.get(field_id) else {
                debug!(field = %field_id, "Field no longer in content type, skipping");
                continue;
            };
            let Some(value) = self.field_value(mapping, submission, profile) else {
                debug!(field = %field_id, "No source value, skipping");
                continue;
            };

            let value = match (value, field.limit()) {
                (FieldValue::Text(text), Some(max)) if text.chars().count() > max => {
                    info!(field = %field_id, max_length = max, "Field's max length exceeded, value truncated");
                    FieldValue::Text(text.chars().take(max).collect())
                }
                (value, _) => value,
            };
            record.set(field_id.clone(), value);
        }
    }

    fn field_value(
        &self,
        mapping: &FieldMapping,
        submission: &Submission,
        profile: Option<&EncryptionProfile>,
    ) -> Option<FieldValue> {
        if mapping.custom_check {
            let template = mapping.custom_value.as_deref().unwrap_or_default();
            let text = self.render_template(template, submission, profile);
            return Some(if text == "true" || text == "TRUE" {
                FieldValue::Boolean(true)
            } else {
                FieldValue::Text(text)
            });
        }

        let source = mapping.webform_field.as_deref()?;
        if mapping.is_property {
            return submission.property(source).map(FieldValue::Text);
        }
        let raw = submission.data.get(source)?;
        Some(self.decrypt_value(raw, profile).into())
    }

    /// Substitute every `webform_submission` token in `template`, decrypting
    /// resolved values when a profile applies. Unresolved tokens and tokens
    /// of other namespaces stay in place.
    pub fn render_template(
        &self,
        template: &str,
        submission: &Submission,
        profile: Option<&EncryptionProfile>,
    ) -> String {
        if template.is_empty() {
            return String::new();
        }

        let mut rendered = template.to_string();
        for token in scan(template) {
            if token.namespace != WEBFORM_SUBMISSION {
                continue;
            }
            if let Some(value) = self.tokens.resolve(&token, submission) {
                let value = self.decrypt_value(&value, profile).render();
                rendered = rendered.replace(&token.raw, &value);
            }
        }
        rendered
    }

    /// Decrypt every leaf of `value`. Without a profile the value is
    /// returned as is.
    pub fn decrypt_value(
        &self,
        value: &SubmissionValue,
        profile: Option<&EncryptionProfile>,
    ) -> SubmissionValue {
        let mut value = value.clone();
        let Some(profile) = profile else {
            return value;
        };
        value.for_each_leaf_mut(&mut |leaf: &mut String| {
            *leaf = self.decrypt_leaf(leaf, profile);
        });
        value
    }

    /// A stored wrapper is opened with the profile it names; anything else
    /// is decrypted with `profile`. Failures fall back to the stored value.
    fn decrypt_leaf(&self, stored: &str, profile: &EncryptionProfile) -> String {
        if stored.is_empty() {
            return String::new();
        }
        let result = match EncryptedLeaf::parse(stored) {
            Some(wrapper) => SubmissionCipher::new(self.service, self.profiles).open(&wrapper),
            None => self.service.decrypt(stored, profile),
        };
        result.unwrap_or_else(|e| {
            debug!(profile = %profile.id, error = %e, "Value not decryptable, using it as stored");
            stored.to_string()
        })
    }

    fn creator_profile(&self, creator: &ContentCreator) -> Option<EncryptionProfile> {
        if !creator.use_encrypt {
            return None;
        }
        let id = creator.encryption_profile.as_deref().unwrap_or_default();
        match self.profiles.resolve_profile(id) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(creator = %creator.id, profile = %id, error = %e, "Encryption profile unavailable, values will not be decrypted");
                None
            }
        }
    }

    fn schema(&self, creator: &ContentCreator) -> Result<ContentSchema, String> {
        match self.schemas.content_type(&creator.content_type) {
            Ok(Some(content_type)) if !content_type.fields.is_empty() => Ok(content_type.fields),
            Ok(Some(_)) => Err(format!("content type {} has no fields", creator.content_type)),
            Ok(None) => Err(format!("content type {} does not exist", creator.content_type)),
            Err(e) => {
                error!(creator = %creator.id, error = %e, "Cannot load content type");
                Err(e.to_string())
            }
        }
    }
}

fn truncate_title(record: &mut ContentRecord, schema: &ContentSchema) {
    let Some(max) = schema.get("title").and_then(|field| field.limit()) else {
        return;
    };
    if record.title.chars().count() > max {
        info!(field = "title", max_length = max, "Field's max length exceeded, value truncated");
        record.title = record.title.chars().take(max).collect();
    }
}
