//! Data file reading and writing.
//!
//! Row files hold one comma-delimited line per account. Document files
//! hold a `{"users": [...]}` object; a bare array is also read.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde_json::Value;

use crate::codec::{decode_row, encode_document, encode_row, format_row};
use crate::error::ValidationError;
use crate::model::UserRecord;
use crate::sync::types::{RejectedRow, SyncError, SyncResult};
use crate::validate::{validate_record, FileFormat};

/// Host line ending used between written records.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

const DOCUMENT_OPEN: &str = "{\"users\": [";
const DOCUMENT_CLOSE: &str = "]}";

/// Streams encoded records to a writer in one of the file formats.
///
/// Document output is only the comma-separated body of the `users` array;
/// see [`open_document`] and [`close_document`] for the framing.
pub struct RecordWriter<W: Write> {
    inner: W,
    format: FileFormat,
    is_first_written: bool,
}

impl<W: Write> RecordWriter<W> {
    #[must_use]
    pub const fn new(inner: W, format: FileFormat) -> Self {
        Self {
            inner,
            format,
            is_first_written: false,
        }
    }

    /// Encode and append one record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub fn write_record(&mut self, record: &UserRecord) -> SyncResult<()> {
        match self.format {
            FileFormat::Csv => {
                let line = format_row(&encode_row(record));
                self.inner.write_all(line.as_bytes())?;
                self.inner.write_all(LINE_ENDING.as_bytes())?;
            }
            FileFormat::Json => {
                if self.is_first_written {
                    write!(self.inner, ",{LINE_ENDING}")?;
                }
                serde_json::to_writer_pretty(&mut self.inner, &encode_document(record))?;
            }
        }
        self.is_first_written = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the underlying flush fails.
    pub fn flush(&mut self) -> SyncResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Write the opening of a document file.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn open_document<W: Write>(writer: &mut W) -> SyncResult<()> {
    write!(writer, "{DOCUMENT_OPEN}{LINE_ENDING}")?;
    Ok(())
}

/// Write the closing of a document file.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn close_document<W: Write>(writer: &mut W) -> SyncResult<()> {
    write!(writer, "{LINE_ENDING}{DOCUMENT_CLOSE}{LINE_ENDING}")?;
    Ok(())
}

/// Rows read from a row-format file.
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub records: Vec<UserRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Decode row-format input. Lines that fail to decode are collected in
/// `rejected` rather than failing the whole read.
///
/// # Errors
///
/// Returns an error only for unreadable input.
pub fn read_rows<R: Read>(input: R) -> SyncResult<ParsedRows> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut parsed = ParsedRows::default();
    for (i, result) in reader.records().enumerate() {
        let row = result?;
        let line = row.position().map_or(i as u64 + 1, csv::Position::line);
        let fields: Vec<&str> = row.iter().collect();

        match decode_row(&fields) {
            Ok(record) => parsed.records.push(record),
            Err(error) => {
                tracing::warn!(line, "Skipping row: {error}");
                parsed.rejected.push(RejectedRow { line, error });
            }
        }
    }
    Ok(parsed)
}

/// Read a row-format data file.
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable.
pub fn read_row_file(path: &Path) -> SyncResult<ParsedRows> {
    read_rows(open(path)?)
}

/// Decode and validate document-format input.
///
/// # Errors
///
/// Returns the first validation failure, tagged with its position in the
/// `users` array.
pub fn read_documents<R: Read>(input: R) -> SyncResult<Vec<UserRecord>> {
    let value: Value = serde_json::from_reader(input)?;
    let users = match value {
        Value::Array(users) => users,
        Value::Object(mut map) => match map.remove("users") {
            Some(Value::Array(users)) => users,
            _ => {
                return Err(ValidationError::InvalidFormat(
                    "expected an object with a `users` array".to_string(),
                )
                .into());
            }
        },
        _ => {
            return Err(ValidationError::InvalidFormat(
                "expected an object with a `users` array".to_string(),
            )
            .into());
        }
    };

    users
        .iter()
        .enumerate()
        .map(|(i, user)| validate_record(user).map_err(|e| SyncError::from(e.at_record(i))))
        .collect()
}

/// Read a document-format data file.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or any record fails
/// validation.
pub fn read_document_file(path: &Path) -> SyncResult<Vec<UserRecord>> {
    read_documents(open(path)?)
}

fn open(path: &Path) -> SyncResult<BufReader<File>> {
    if !path.exists() {
        return Err(SyncError::FileNotFound(path.display().to_string()));
    }
    Ok(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::model::{EncodedBlob, ProviderLink, ProviderId};
    use tempfile::TempDir;

    fn sample(id: &str) -> UserRecord {
        UserRecord {
            email: Some(format!("{id}@test.org")),
            display_name: Some("Doe, Jane".to_string()),
            ..UserRecord::new(id)
        }
    }

    #[test]
    fn test_csv_writer_one_line_per_record() {
        let mut writer = RecordWriter::new(Vec::new(), FileFormat::Csv);
        writer.write_record(&sample("1")).unwrap();
        writer.write_record(&sample("2")).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1,1@test.org,false,,,\"Doe, Jane\","));
    }

    #[test]
    fn test_json_writer_separates_records() {
        let mut buf = Vec::new();
        open_document(&mut buf).unwrap();
        let mut writer = RecordWriter::new(buf, FileFormat::Json);
        writer.write_record(&sample("1")).unwrap();
        writer.write_record(&sample("2")).unwrap();
        let mut buf = writer.into_inner();
        close_document(&mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(&format!("}},{LINE_ENDING}{{")));
        assert!(text.contains("\n  \"localId\": \"1\""));

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["users"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["users"][1]["localId"], "2");
    }

    #[test]
    fn test_empty_document_is_valid_json() {
        let mut buf = Vec::new();
        open_document(&mut buf).unwrap();
        close_document(&mut buf).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["users"], serde_json::json!([]));
    }

    #[test]
    fn test_written_rows_read_back() {
        let mut record = sample("9");
        record.password_hash = Some(EncodedBlob::new("aGFzaA=="));
        record.provider_links = vec![ProviderLink {
            email: Some("g@test.org".to_string()),
            ..ProviderLink::new(ProviderId::Google, "g-9")
        }];

        let mut writer = RecordWriter::new(Vec::new(), FileFormat::Csv);
        writer.write_record(&record).unwrap();
        let parsed = read_rows(writer.into_inner().as_slice()).unwrap();

        assert!(parsed.rejected.is_empty());
        assert_eq!(parsed.records, vec![record]);
    }

    /// Only values containing the delimiter are quoted on write, and embedded
    /// quotes or line breaks are never escaped. Such values do not survive a
    /// read back through the CSV reader.
    #[test]
    fn test_unescaped_quotes_and_line_breaks_do_not_read_back() {
        let quoted = UserRecord {
            display_name: Some("\"Nick\"".to_string()),
            ..UserRecord::new("6")
        };
        let multiline = UserRecord {
            display_name: Some("Ann\nLee".to_string()),
            ..UserRecord::new("7")
        };

        let mut writer = RecordWriter::new(Vec::new(), FileFormat::Csv);
        writer.write_record(&quoted).unwrap();
        writer.write_record(&multiline).unwrap();
        let parsed = read_rows(writer.into_inner().as_slice()).unwrap();

        let ids: Vec<&str> = parsed.records.iter().map(|r| r.local_id.as_str()).collect();
        assert_eq!(ids, vec!["6", "7", "Lee"]);
        assert_eq!(parsed.records[0].display_name.as_deref(), Some("Nick"));
        assert_eq!(parsed.records[1].display_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_rows_with_trailing_comma_and_bad_lines() {
        let input = "1,a@test.org,true,,,,,,,,,,,,,,,,,,,,,,,,,\n\
                     2,b@test.org,false,not base64!\n\
                     ,missing@test.org\n\
                     3\n";
        let parsed = read_rows(input.as_bytes()).unwrap();

        let ids: Vec<&str> = parsed.records.iter().map(|r| r.local_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(parsed.records[0].email_verified);
        assert_eq!(parsed.rejected.len(), 2);
        assert_eq!(parsed.rejected[0].line, 2);
        assert_eq!(parsed.rejected[0].error, DecodeError::InvalidPasswordHash);
        assert_eq!(parsed.rejected[1].error, DecodeError::MissingLocalId);
    }

    #[test]
    fn test_documents_wrapper_and_bare_array() {
        let wrapped = r#"{"users": [{"localId": "a"}, {"localId": "b", "email": "b@test.org"}]}"#;
        let bare = r#"[{"localId": "c"}]"#;

        assert_eq!(read_documents(wrapped.as_bytes()).unwrap().len(), 2);
        assert_eq!(read_documents(bare.as_bytes()).unwrap()[0].local_id, "c");
    }

    #[test]
    fn test_documents_report_failing_position() {
        let input = r#"{"users": [{"localId": "a"}, {"localId": "b", "nickname": "x"}]}"#;
        let err = read_documents(input.as_bytes()).unwrap_err();
        match err {
            SyncError::Validation(ValidationError::AtRecord { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(
                    *source,
                    ValidationError::UnknownFields(vec!["nickname".to_string()])
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_documents_reject_other_shapes() {
        let err = read_documents(r#"{"accounts": []}"#.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Validation(ValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_row_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, SyncError::FileNotFound(_)));
    }

    #[test]
    fn test_read_document_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"users": [{"localId": "x", "disabled": true}]}"#).unwrap();

        let records = read_document_file(&path).unwrap();
        assert!(records[0].disabled);
    }
}
