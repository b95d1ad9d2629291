// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the file store.
//!
//! Each repository offers CRUD for one entity type. The key, profile,
//! content type and content repositories also implement the lookup traits
//! the encryption and content modules are written against.

pub mod content;
pub mod content_types;
pub mod creators;
pub mod keys;
pub mod profiles;
pub mod submissions;
pub mod webforms;

pub use content::FileContentStore;
pub use content_types::ContentTypeRepository;
pub use creators::ContentCreatorRepository;
pub use keys::KeyStore;
pub use profiles::ProfileStore;
pub use submissions::SubmissionRepository;
pub use webforms::WebformRepository;
