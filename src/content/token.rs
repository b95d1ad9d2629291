// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `[namespace:token]` placeholders in mapping templates.
//!
//! A namespace has no whitespace, `:`, `[` or `]`. The token part is
//! non-empty and has no brackets; it may contain further `:` separators.
//!
//! ```text
//! "Hello [webform_submission:value:address:city]"
//!         └── namespace ──┘ └──── name ───────┘
//! ```

use crate::submission::{Submission, SubmissionValue};

/// Namespace of tokens resolved against a submission.
pub const WEBFORM_SUBMISSION: &str = "webform_submission";

/// A placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub namespace: String,
    pub name: String,
    /// The placeholder as written, brackets included.
    pub raw: String,
}

/// Find every distinct token in `text`, in order of first appearance.
pub fn scan(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let candidate = &rest[open + 1..];
        let Some(close) = candidate.find(|c: char| c == '[' || c == ']') else {
            break;
        };
        if candidate.as_bytes()[close] == b'[' {
            rest = &candidate[close..];
            continue;
        }

        let inner = &candidate[..close];
        if let Some(token) = parse_inner(inner) {
            if !tokens.iter().any(|t| t.raw == token.raw) {
                tokens.push(token);
            }
        }
        rest = &candidate[close + 1..];
    }
    tokens
}

fn parse_inner(inner: &str) -> Option<Token> {
    let (namespace, name) = inner.split_once(':')?;
    if namespace.is_empty() || name.is_empty() || namespace.chars().any(char::is_whitespace) {
        return None;
    }
    Some(Token {
        namespace: namespace.to_string(),
        name: name.to_string(),
        raw: format!("[{inner}]"),
    })
}

/// Resolves tokens to the raw values they stand for.
pub trait TokenResolver: Send + Sync {
    /// `None` when the token is unknown; the placeholder then stays in the
    /// text.
    fn resolve(&self, token: &Token, submission: &Submission) -> Option<SubmissionValue>;
}

/// Resolver for the `webform_submission` namespace.
///
/// Supports the basic submission properties plus
/// `value:<element>[:<sub>...]` (alias `values:`), where sub keys index
/// records by key and sequences by position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionTokenResolver;

impl TokenResolver for SubmissionTokenResolver {
    fn resolve(&self, token: &Token, submission: &Submission) -> Option<SubmissionValue> {
        if token.namespace != WEBFORM_SUBMISSION {
            return None;
        }

        let mut parts = token.name.split(':');
        match parts.next()? {
            "value" | "values" => {
                let element = parts.next()?;
                let path: Vec<&str> = parts.collect();
                submission.data.get(element)?.get_path(&path).cloned()
            }
            property if !token.name.contains(':') => {
                submission.property(property).map(SubmissionValue::Scalar)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::SubmissionData;

    fn submission() -> Submission {
        let mut data = SubmissionData::new();
        data.insert("test_field".into(), SubmissionValue::scalar("World"));
        data.insert(
            "address".into(),
            SubmissionValue::record([("city", "X"), ("zip", "12345")]),
        );
        data.insert("tags".into(), SubmissionValue::sequence(["a", "b"]));
        Submission::new("42", "contact", data)
    }

    fn token(name: &str) -> Token {
        scan(&format!("[webform_submission:{name}]")).remove(0)
    }

    #[test]
    fn scan_finds_distinct_tokens_in_order() {
        let tokens = scan("[site:name] says [webform_submission:sid] and [site:name] again");
        let raws: Vec<_> = tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(raws, vec!["[site:name]", "[webform_submission:sid]"]);
        assert_eq!(tokens[1].namespace, "webform_submission");
        assert_eq!(tokens[1].name, "sid");
    }

    #[test]
    fn scan_rejects_malformed_placeholders() {
        assert!(scan("no tokens here").is_empty());
        assert!(scan("[missing colon]").is_empty());
        assert!(scan("[bad ns:x]").is_empty());
        assert!(scan("[ns:]").is_empty());
        assert!(scan("[unterminated:token").is_empty());
        let nested = scan("[[ns:inner]]");
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].raw, "[ns:inner]");
    }

    #[test]
    fn resolves_properties() {
        let submission = submission();
        let resolver = SubmissionTokenResolver;
        assert_eq!(
            resolver.resolve(&token("sid"), &submission),
            Some(SubmissionValue::scalar("42"))
        );
        assert_eq!(
            resolver.resolve(&token("webform"), &submission),
            Some(SubmissionValue::scalar("contact"))
        );
        assert_eq!(resolver.resolve(&token("unknown"), &submission), None);
    }

    #[test]
    fn resolves_element_values_and_paths() {
        let submission = submission();
        let resolver = SubmissionTokenResolver;
        assert_eq!(
            resolver.resolve(&token("value:test_field"), &submission),
            Some(SubmissionValue::scalar("World"))
        );
        assert_eq!(
            resolver.resolve(&token("values:address:city"), &submission),
            Some(SubmissionValue::scalar("X"))
        );
        assert_eq!(
            resolver.resolve(&token("value:tags:1"), &submission),
            Some(SubmissionValue::scalar("b"))
        );
        assert_eq!(
            resolver
                .resolve(&token("value:address"), &submission)
                .map(|v| v.render()),
            Some("X, 12345".to_string())
        );
        assert_eq!(resolver.resolve(&token("value:missing"), &submission), None);
    }

    #[test]
    fn other_namespaces_are_not_resolved() {
        let tokens = scan("[site:name]");
        assert_eq!(SubmissionTokenResolver.resolve(&tokens[0], &submission()), None);
    }
}
