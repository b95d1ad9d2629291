// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Content Creation
//!
//! Builds content records out of webform submissions. A
//! [`ContentCreator`] names the webform, the target content type and a
//! [`FieldMapping`] per content field; [`ContentSync`] applies it.
//!
//! ```text
//! ContentCreator ──▶ ContentSync ──▶ ContentSchemaProvider (field limits)
//!                        │      └──▶ TokenResolver (templates)
//!                        ▼
//!                  ContentStorage
//! ```

pub mod creator;
pub mod mapper;
pub mod record;
pub mod schema;
pub mod token;

pub use creator::{ContentCreator, FieldMapping};
pub use mapper::{ContentSync, SyncOperation, SyncOutcome};
pub use record::{ContentRecord, ContentStorage, FieldValue, InMemoryContentStore, SaveStatus};
pub use schema::{
    content_field_ids, ContentSchema, ContentSchemaProvider, ContentType, FieldSchema,
    InMemorySchemaProvider, CONTENT_BASIC_FIELDS,
};
pub use token::{scan, SubmissionTokenResolver, Token, TokenResolver, WEBFORM_SUBMISSION};
