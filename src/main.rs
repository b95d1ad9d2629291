// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `webform-vault` command line.
//!
//! ```text
//! webform-vault health
//! webform-vault methods
//! webform-vault ingest <submission.json>
//! webform-vault sync <webform_id> <sid> [edit|delete]
//! ```
//!
//! Results are printed to stdout as JSON lines; logs go to stderr.

use std::env;
use std::fs;
use std::process;
use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};

use webform_vault::access::Account;
use webform_vault::config::AppConfig;
use webform_vault::content::{ContentSync, SubmissionTokenResolver, SyncOperation, SyncOutcome};
use webform_vault::crypto::{EncryptService, MethodRegistry};
use webform_vault::error::{Error, Result};
use webform_vault::field_crypt::SubmissionCipher;
use webform_vault::logging::init_tracing;
use webform_vault::storage::{
    ContentCreatorRepository, ContentTypeRepository, FileContentStore, FileStore, KeyStore,
    ProfileStore, StoragePaths, SubmissionRepository, WebformRepository,
};
use webform_vault::submission::Submission;

const USAGE: &str = "webform-vault <health | methods | ingest <submission.json> | sync <webform_id> <sid> [edit|delete]>";

fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Err(e) = init_tracing(config.log_format, &config.log_filter) {
        eprintln!("{}", Error::Logging(e.to_string()));
        process::exit(1);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&config, &args) {
        error!(error = %e, "Command failed");
        eprintln!("{e}");
        process::exit(e.exit_code());
    }
}

fn run(config: &AppConfig, args: &[String]) -> Result<()> {
    let mut storage = FileStore::new(StoragePaths::new(&config.data_dir));
    storage.initialize()?;

    let service = EncryptService::new(
        MethodRegistry::with_defaults(),
        Arc::new(KeyStore::new(storage.clone())),
    );

    match args.first().map(String::as_str) {
        Some("health") => {
            storage.health_check()?;
            let data_dir = config.data_dir.display().to_string();
            println!("{}", json!({ "status": "ok", "data_dir": data_dir }));
            Ok(())
        }
        Some("methods") => {
            for definition in service.load_encryption_methods() {
                println!("{}", serde_json::to_string(&definition)?);
            }
            Ok(())
        }
        Some("ingest") => {
            let path = args
                .get(1)
                .ok_or_else(|| Error::Usage(USAGE.to_string()))?;
            ingest(&storage, &service, &config.account, path)
        }
        Some("sync") => {
            let (Some(webform_id), Some(sid)) = (args.get(1), args.get(2)) else {
                return Err(Error::Usage(USAGE.to_string()));
            };
            let operation = match args.get(3) {
                Some(op) => op
                    .parse::<SyncOperation>()
                    .map_err(|e| Error::Usage(format!("{e}; {USAGE}")))?,
                None => SyncOperation::Edit,
            };
            sync(&storage, &service, webform_id, sid, operation)
        }
        _ => Err(Error::Usage(USAGE.to_string())),
    }
}

/// Persist a submission, then create content through every creator bound
/// to its webform.
fn ingest(
    storage: &FileStore,
    service: &EncryptService,
    account: &Account,
    path: &str,
) -> Result<()> {
    let raw = fs::read_to_string(path).map_err(|source| Error::Input {
        path: path.to_string(),
        source,
    })?;
    let mut submission: Submission = serde_json::from_str(&raw)?;

    let profiles = ProfileStore::new(storage);
    let webform = WebformRepository::new(storage).get(&submission.webform_id)?;
    let submissions = SubmissionRepository::new(storage, SubmissionCipher::new(service, &profiles));
    submissions.save(&webform, &mut submission, account)?;
    info!(webform = %webform.id, sid = %submission.sid, "Stored submission");

    let schemas = ContentTypeRepository::new(storage);
    let content = FileContentStore::new(storage);
    let sync = ContentSync::new(service, &profiles, &schemas, &content, &SubmissionTokenResolver);

    for creator in ContentCreatorRepository::new(storage).list_for_webform(&webform.id)? {
        let outcome = sync.create_content(&creator, &webform, &submission);
        report(&creator.id, &creator.status_message(outcome.succeeded()), &outcome);
    }
    Ok(())
}

/// Propagate an edit or delete of a stored submission to linked content.
/// A delete also removes the stored submission.
fn sync(
    storage: &FileStore,
    service: &EncryptService,
    webform_id: &str,
    sid: &str,
    operation: SyncOperation,
) -> Result<()> {
    let profiles = ProfileStore::new(storage);
    let webform = WebformRepository::new(storage).get(webform_id)?;
    let submissions = SubmissionRepository::new(storage, SubmissionCipher::new(service, &profiles));
    let submission = submissions.load(&webform, sid, &Account::system())?;

    let schemas = ContentTypeRepository::new(storage);
    let content = FileContentStore::new(storage);
    let sync = ContentSync::new(service, &profiles, &schemas, &content, &SubmissionTokenResolver);

    for creator in ContentCreatorRepository::new(storage).list_for_webform(webform_id)? {
        let outcome = sync.update_content(&creator, &webform, &submission, operation);
        report(&creator.id, &creator.status_message(outcome.succeeded()), &outcome);
    }

    if operation == SyncOperation::Delete {
        submissions.delete(webform_id, sid)?;
        info!(webform = %webform_id, sid = %sid, "Deleted submission");
    }
    Ok(())
}

fn report(creator_id: &str, message: &str, outcome: &SyncOutcome) {
    let (status, detail) = match outcome {
        SyncOutcome::Created(id) => ("created", id),
        SyncOutcome::Updated(id) => ("updated", id),
        SyncOutcome::Deleted(id) => ("deleted", id),
        SyncOutcome::Skipped(reason) => ("skipped", reason),
        SyncOutcome::Failed(reason) => ("failed", reason),
    };
    println!(
        "{}",
        json!({
            "creator": creator_id,
            "status": status,
            "detail": detail,
            "message": message,
        })
    );
}
