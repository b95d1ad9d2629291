// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, their defaults, and [`AppConfig`], which
//! reads them once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory of the JSON data store | `./data` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |
//! | `WEBFORM_VAULT_ACCOUNT_PERMISSIONS` | Comma-separated permissions of the acting account | empty |
//! | `WEBFORM_VAULT_ACCOUNT_ID` | Id of the acting account | unset |

use std::path::PathBuf;
use std::str::FromStr;

use crate::access::Account;
use crate::storage::paths::DATA_ROOT;

/// Environment variable name for the data store root.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Standard tracing filter variable.
pub const RUST_LOG_ENV: &str = "RUST_LOG";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Permissions granted to the account the binary acts as.
///
/// Accepts permission labels (`view encrypted values`) or machine names
/// (`view_encrypted_values`). Unknown entries are ignored.
pub const ACCOUNT_PERMISSIONS_ENV: &str = "WEBFORM_VAULT_ACCOUNT_PERMISSIONS";

/// Id of the acting account, used in permission errors.
pub const ACCOUNT_ID_ENV: &str = "WEBFORM_VAULT_ACCOUNT_ID";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {variable}: {value:?} (expected {expected})")]
    InvalidValue {
        variable: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::InvalidValue {
                variable: LOG_FORMAT_ENV,
                value: s.to_string(),
                expected: "json or pretty",
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub account: Account,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let log_format = match var(LOG_FORMAT_ENV) {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            data_dir: PathBuf::from(var(DATA_DIR_ENV).unwrap_or_else(|| DATA_ROOT.to_string())),
            log_format,
            log_filter: var(RUST_LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            account: Account::from_permission_list(
                var(ACCOUNT_ID_ENV),
                &var(ACCOUNT_PERMISSIONS_ENV).unwrap_or_default(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Permission;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.log_filter, "info");
        assert!(config.account.permissions.is_empty());
        assert!(config.account.id.is_none());
    }

    #[test]
    fn values_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATA_DIR", "/srv/vault"),
            ("LOG_FORMAT", "JSON"),
            ("RUST_LOG", "debug"),
            ("WEBFORM_VAULT_ACCOUNT_ID", "editor"),
            ("WEBFORM_VAULT_ACCOUNT_PERMISSIONS", "view encrypted values, bogus"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/vault"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.account.id.as_deref(), Some("editor"));
        assert!(config.account.has_permission(Permission::ViewEncryptedValues));
        assert_eq!(config.account.permissions.len(), 1);
    }

    #[test]
    fn invalid_log_format_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                variable: "LOG_FORMAT",
                ..
            }
        ));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config =
            AppConfig::from_lookup(lookup(&[("DATA_DIR", ""), ("LOG_FORMAT", " ")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }
}
