// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Submission Data Model
//!
//! A webform submission carries a tree of element values. Leaves are plain
//! strings; multi-value elements are sequences and composite elements
//! (addresses, names, ...) are records keyed by sub-element name.
//!
//! ```text
//! {
//!   "name":    "Ada",                          Scalar
//!   "phones":  ["555-0100", "555-0101"],       Sequence
//!   "address": { "city": "X", "zip": "12345" } Record
//! }
//! ```
//!
//! The per-element encryption settings of a webform live in
//! [`FieldEncryptionConfig`], attached to the [`Webform`] definition.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Submission Values
// =============================================================================

/// A node in a submission data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionValue {
    /// A leaf value.
    Scalar(String),
    /// A composite element keyed by sub-element name.
    Record(BTreeMap<String, SubmissionValue>),
    /// A multi-value element.
    Sequence(Vec<SubmissionValue>),
}

/// Element name → value, the top level of a submission.
pub type SubmissionData = BTreeMap<String, SubmissionValue>;

impl SubmissionValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        SubmissionValue::Scalar(value.into())
    }

    /// Build a record from `(key, value)` pairs.
    pub fn record<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<SubmissionValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        SubmissionValue::Record(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sequence from values.
    pub fn sequence<V, I>(values: I) -> Self
    where
        V: Into<SubmissionValue>,
        I: IntoIterator<Item = V>,
    {
        SubmissionValue::Sequence(values.into_iter().map(Into::into).collect())
    }

    /// The leaf string, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            SubmissionValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// True for records and sequences.
    pub fn is_container(&self) -> bool {
        !matches!(self, SubmissionValue::Scalar(_))
    }

    /// True for an empty string or a container without children.
    pub fn is_empty(&self) -> bool {
        match self {
            SubmissionValue::Scalar(value) => value.is_empty(),
            SubmissionValue::Record(entries) => entries.is_empty(),
            SubmissionValue::Sequence(values) => values.is_empty(),
        }
    }

    /// Walk into the tree. Record segments are keys, sequence segments
    /// are zero-based positions.
    pub fn get_path(&self, path: &[&str]) -> Option<&SubmissionValue> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        let child = match self {
            SubmissionValue::Record(entries) => entries.get(*head)?,
            SubmissionValue::Sequence(values) => values.get(head.parse::<usize>().ok()?)?,
            SubmissionValue::Scalar(_) => return None,
        };
        child.get_path(rest)
    }

    /// All leaves in depth-first order.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            SubmissionValue::Scalar(value) => out.push(value),
            SubmissionValue::Record(entries) => {
                for value in entries.values() {
                    value.collect_leaves(out);
                }
            }
            SubmissionValue::Sequence(values) => {
                for value in values {
                    value.collect_leaves(out);
                }
            }
        }
    }

    /// Render as text: a scalar as itself, a container as its non-empty
    /// leaves joined with `", "`.
    pub fn render(&self) -> String {
        match self {
            SubmissionValue::Scalar(value) => value.clone(),
            _ => self
                .leaves()
                .into_iter()
                .filter(|leaf| !leaf.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Apply `f` to every leaf, depth-unbounded, stopping at the first error.
    pub fn try_for_each_leaf_mut<E, F>(&mut self, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&mut String) -> Result<(), E>,
    {
        match self {
            SubmissionValue::Scalar(value) => f(value),
            SubmissionValue::Record(entries) => {
                for value in entries.values_mut() {
                    value.try_for_each_leaf_mut(f)?;
                }
                Ok(())
            }
            SubmissionValue::Sequence(values) => {
                for value in values.iter_mut() {
                    value.try_for_each_leaf_mut(f)?;
                }
                Ok(())
            }
        }
    }

    /// Rewrite every leaf in place.
    pub fn for_each_leaf_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut String),
    {
        match self {
            SubmissionValue::Scalar(value) => f(value),
            SubmissionValue::Record(entries) => {
                for value in entries.values_mut() {
                    value.for_each_leaf_mut(f);
                }
            }
            SubmissionValue::Sequence(values) => {
                for value in values.iter_mut() {
                    value.for_each_leaf_mut(f);
                }
            }
        }
    }
}

impl From<&str> for SubmissionValue {
    fn from(value: &str) -> Self {
        SubmissionValue::Scalar(value.to_string())
    }
}

impl From<String> for SubmissionValue {
    fn from(value: String) -> Self {
        SubmissionValue::Scalar(value)
    }
}

/// Lossy conversion from arbitrary JSON: numbers and booleans become their
/// textual form, `null` becomes an empty leaf.
impl From<serde_json::Value> for SubmissionValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => SubmissionValue::Scalar(String::new()),
            Value::Bool(b) => SubmissionValue::Scalar(b.to_string()),
            Value::Number(n) => SubmissionValue::Scalar(n.to_string()),
            Value::String(s) => SubmissionValue::Scalar(s),
            Value::Array(values) => {
                SubmissionValue::Sequence(values.into_iter().map(Self::from).collect())
            }
            Value::Object(entries) => SubmissionValue::Record(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for SubmissionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SubmissionValue::Scalar(value) => serializer.serialize_str(value),
            SubmissionValue::Record(entries) => entries.serialize(serializer),
            SubmissionValue::Sequence(values) => values.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SubmissionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

// =============================================================================
// Element Encryption Settings
// =============================================================================

/// Encryption setting of a single webform element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementEncryption {
    #[serde(default)]
    pub encrypt: bool,
    #[serde(default)]
    pub encrypt_profile: String,
}

/// Element name → encryption setting.
///
/// Read at encrypt/decrypt time, never mutated by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldEncryptionConfig(BTreeMap<String, ElementEncryption>);

impl FieldEncryptionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable encryption of `element` under `profile_id`.
    pub fn encrypt(mut self, element: impl Into<String>, profile_id: impl Into<String>) -> Self {
        self.0.insert(
            element.into(),
            ElementEncryption {
                encrypt: true,
                encrypt_profile: profile_id.into(),
            },
        );
        self
    }

    pub fn set(&mut self, element: impl Into<String>, setting: ElementEncryption) {
        self.0.insert(element.into(), setting);
    }

    pub fn get(&self, element: &str) -> Option<&ElementEncryption> {
        self.0.get(element)
    }

    /// True when the element is configured and its `encrypt` flag is set.
    pub fn is_encrypted(&self, element: &str) -> bool {
        self.0.get(element).is_some_and(|setting| setting.encrypt)
    }

    /// Profile id for an element that is configured for encryption.
    pub fn profile_for(&self, element: &str) -> Option<&str> {
        self.0
            .get(element)
            .filter(|setting| setting.encrypt)
            .map(|setting| setting.encrypt_profile.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ElementEncryption)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Webform & Submission
// =============================================================================

/// The form definition a submission belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webform {
    pub id: String,
    pub label: String,
    /// Per-element encryption settings.
    #[serde(default)]
    pub element_encryption: FieldEncryptionConfig,
}

impl Webform {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            element_encryption: FieldEncryptionConfig::default(),
        }
    }

    pub fn with_encryption(mut self, config: FieldEncryptionConfig) -> Self {
        self.element_encryption = config;
        self
    }
}

/// Basic submission properties addressable by name. These are never
/// encrypted.
pub const SUBMISSION_PROPERTIES: &[&str] = &[
    "sid",
    "uuid",
    "webform_id",
    "created",
    "changed",
    "uid",
    "langcode",
    "remote_addr",
    "in_draft",
];

fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_langcode() -> String {
    "en".to_string()
}

/// A stored webform submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Submission id.
    pub sid: String,
    #[serde(default = "new_uuid")]
    pub uuid: String,
    pub webform_id: String,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub changed: DateTime<Utc>,
    /// Submitting user, if authenticated.
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default = "default_langcode")]
    pub langcode: String,
    #[serde(default)]
    pub remote_addr: Option<String>,
    #[serde(default)]
    pub in_draft: bool,
    #[serde(default)]
    pub data: SubmissionData,
}

impl Submission {
    pub fn new(
        sid: impl Into<String>,
        webform_id: impl Into<String>,
        data: SubmissionData,
    ) -> Self {
        let now = Utc::now();
        Self {
            sid: sid.into(),
            uuid: new_uuid(),
            webform_id: webform_id.into(),
            created: now,
            changed: now,
            uid: None,
            langcode: default_langcode(),
            remote_addr: None,
            in_draft: false,
            data,
        }
    }

    /// Read a basic property by name.
    ///
    /// Returns `None` for unknown names; optional properties that are unset
    /// read as an empty string.
    pub fn property(&self, name: &str) -> Option<String> {
        let value = match name {
            "sid" => self.sid.clone(),
            "uuid" => self.uuid.clone(),
            "webform_id" | "webform" => self.webform_id.clone(),
            "created" => self.created.timestamp().to_string(),
            "changed" => self.changed.timestamp().to_string(),
            "uid" => self.uid.clone().unwrap_or_default(),
            "langcode" => self.langcode.clone(),
            "remote_addr" => self.remote_addr.clone().unwrap_or_default(),
            "in_draft" => (if self.in_draft { "1" } else { "0" }).to_string(),
            _ => return None,
        };
        Some(value)
    }
}
