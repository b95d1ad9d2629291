// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webform Vault - encrypted webform submissions and content creation
//!
//! This crate stores webform submissions with selected elements encrypted
//! under named encryption profiles, and turns submissions into content
//! records through configurable field mappings.
//!
//! ## Modules
//!
//! - `crypto` - Keys, encryption methods, profiles and the encryption service
//! - `field_crypt` - Per-element encryption of submission data
//! - `content` - Content creators, token templates and submission → content mapping
//! - `storage` - JSON file store and repositories
//! - `submission` / `access` - Submission data model and permissions

pub mod access;
pub mod config;
pub mod content;
pub mod crypto;
pub mod error;
pub mod field_crypt;
pub mod logging;
pub mod storage;
pub mod submission;
