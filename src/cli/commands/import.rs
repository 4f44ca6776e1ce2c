//! Import command implementation.
//!
//! Every local check runs before the first upload: arguments, hash options,
//! the data file itself, and password accounts against the chosen algorithm.

use std::time::Duration;

use colored::Colorize;
use serde::Serialize;

use crate::api::HttpAccountApi;
use crate::cli::ImportArgs;
use crate::config::{self, Overrides};
use crate::error::{Result, ValidationError};
use crate::sync::{into_batches, read_document_file, read_row_file, ImportReport, Importer, RejectedRow};
use crate::validate::{
    check_password_users, resolve_format, validate_batch_size, validate_hash_options, FileFormat,
};

#[derive(Serialize)]
struct SkippedRow {
    line: u64,
    message: String,
}

impl From<&RejectedRow> for SkippedRow {
    fn from(row: &RejectedRow) -> Self {
        Self {
            line: row.line,
            message: row.error.to_string(),
        }
    }
}

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if any local check fails or settings are missing.
/// Per-account and per-batch upload failures are reported, not returned.
pub fn execute(args: &ImportArgs, overrides: &Overrides, timeout: Duration, json: bool) -> Result<()> {
    let format = resolve_format(args.data_file.as_deref(), args.format.as_deref())?;
    let batch_size = validate_batch_size(args.batch_size)?;
    let hash_options = validate_hash_options(&args.raw_hash_options())?;
    let path = args
        .data_file
        .as_deref()
        .ok_or(ValidationError::MissingDataFile)?;

    let (records, rejected) = match format {
        FileFormat::Csv => {
            let parsed = read_row_file(path)?;
            (parsed.records, parsed.rejected)
        }
        FileFormat::Json => (read_document_file(path)?, Vec::new()),
    };
    check_password_users(&records, &hash_options)?;

    let skipped: Vec<SkippedRow> = rejected.iter().map(SkippedRow::from).collect();

    if records.is_empty() {
        if json {
            let output = serde_json::json!({
                "success": true,
                "report": ImportReport::default(),
                "skipped": skipped,
            });
            println!("{}", serde_json::to_string(&output)?);
        } else {
            print_skipped(&skipped);
            println!("No accounts to import from {}.", path.display());
        }
        return Ok(());
    }

    let settings = config::load_settings(overrides)?;
    let api = HttpAccountApi::new(&settings.api_origin, &settings.access_token, timeout)?;

    let batches = into_batches(records, batch_size);
    let importer = Importer::new(&api, settings.project.as_str(), hash_options);
    let rt = super::runtime()?;
    let report = rt.block_on(importer.import_batches(&batches));

    if json {
        let output = serde_json::json!({
            "success": report.is_success() && skipped.is_empty(),
            "project": settings.project,
            "file": path.display().to_string(),
            "report": report,
            "skipped": skipped,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    print_skipped(&skipped);
    for err in &report.errors {
        let target = match (&err.local_id, err.index) {
            (Some(id), _) => format!("account {id}"),
            (None, Some(index)) => format!("entry {index}"),
            (None, None) => "whole batch".to_string(),
        };
        println!(
            "  {} batch {} {}: {}",
            "✗".red(),
            err.batch,
            target.bold(),
            err.message
        );
    }

    let mark = if report.is_success() {
        "✓".green()
    } else {
        "!".yellow()
    };
    println!(
        "{mark} Imported {} of {} account(s) into {} in {} batch(es)",
        report.imported().to_string().bold(),
        report.accounts,
        settings.project,
        report.batches
    );

    Ok(())
}

fn print_skipped(skipped: &[SkippedRow]) {
    for row in skipped {
        println!("  {} line {}: {}", "skipped".yellow(), row.line, row.message);
    }
}
