//! Export command implementation.
//!
//! Arguments and settings are checked before the output file is created, so
//! a bad invocation never truncates an existing file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Duration;

use colored::Colorize;

use crate::api::HttpAccountApi;
use crate::cli::ExportArgs;
use crate::config::{self, Overrides};
use crate::error::{Result, ValidationError};
use crate::sync::{close_document, open_document, Exporter, RecordWriter};
use crate::validate::{resolve_format, validate_batch_size, FileFormat};

/// Execute the export command.
///
/// # Errors
///
/// Returns an error on invalid arguments, missing settings, an unwritable
/// output file, or a failed export.
pub fn execute(args: &ExportArgs, overrides: &Overrides, timeout: Duration, json: bool) -> Result<()> {
    let format = resolve_format(args.data_file.as_deref(), args.format.as_deref())?;
    let page_size = validate_batch_size(args.batch_size)?;
    let path = args
        .data_file
        .as_deref()
        .ok_or(ValidationError::MissingDataFile)?;

    let settings = config::load_settings(overrides)?;
    let api = HttpAccountApi::new(&settings.api_origin, &settings.access_token, timeout)?;

    let mut out = BufWriter::new(File::create(path)?);
    if format == FileFormat::Json {
        open_document(&mut out)?;
    }

    let rt = super::runtime()?;
    let mut exporter = Exporter::new(&api, settings.project.as_str(), RecordWriter::new(out, format))
        .with_page_size(page_size);
    let result = rt.block_on(exporter.export());

    // Close the frame even after a failure so the partial file stays readable.
    let mut out = exporter.into_writer().into_inner();
    if format == FileFormat::Json {
        close_document(&mut out)?;
    }
    out.flush()?;

    let stats = result?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "project": settings.project,
            "file": path.display().to_string(),
            "format": format.as_str(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if stats.is_empty() {
        println!("No accounts to export in {}.", settings.project);
    } else {
        println!(
            "{} Exported {} account(s) from {} to {}",
            "✓".green(),
            stats.accounts.to_string().bold(),
            settings.project,
            path.display()
        );
        if stats.retries > 0 {
            println!("  {}", format!("{} timed-out request(s) retried", stats.retries).dimmed());
        }
    }

    Ok(())
}
