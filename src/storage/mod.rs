// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage as plain JSON files under a data root
//! (`DATA_DIR`, default `./data`).
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//!   keys/                  # Key definitions (material for file/env providers lives elsewhere)
//!   encryption_profiles/
//!   webforms/              # Webform + element encryption settings
//!   submissions/{webform}/ # Encrypted elements stored sealed
//!   content_types/
//!   content/
//!   content_creators/
//! ```
//!
//! ## Important Notes
//!
//! - Encrypted elements never reach disk in plaintext: the submission
//!   repository seals them before writing.
//! - Inline (`config` provider) key material IS written to `keys/`. Use the
//!   `file` or `env` provider to keep material out of the data root.

pub mod file_store;
pub mod paths;
pub mod repository;

pub use file_store::{check_id, FileStore, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    ContentCreatorRepository, ContentTypeRepository, FileContentStore, KeyStore, ProfileStore,
    SubmissionRepository, WebformRepository,
};
