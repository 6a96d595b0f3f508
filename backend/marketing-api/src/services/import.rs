// Spreadsheet import - turns an uploaded CSV/JSON/workbook file into contacts for a list
use calamine::{open_workbook_auto_from_rs, Reader};
use std::collections::HashMap;
use std::io::Cursor;
use validator::ValidateEmail;

use crate::error::{AppError, Result};
use crate::models::{normalize_segments, NewContact, SocialHandles};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
    /// Excel (xlsx, xlsm, xls) or OpenDocument workbook; the first sheet is read.
    Workbook,
}

impl ImportFormat {
    /// Picks the parser from the file name, then the content type, then the
    /// leading bytes of the payload.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>, data: &[u8]) -> Self {
        let extension = file_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => return ImportFormat::Json,
            Some("csv") | Some("txt") => return ImportFormat::Csv,
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => {
                return ImportFormat::Workbook
            }
            _ => {}
        }

        if let Some(content_type) = content_type {
            if content_type.contains("spreadsheetml")
                || content_type.contains("ms-excel")
                || content_type.contains("opendocument.spreadsheet")
            {
                return ImportFormat::Workbook;
            }
            if content_type.contains("json") {
                return ImportFormat::Json;
            }
            if content_type.contains("csv") {
                return ImportFormat::Csv;
            }
        }

        if data.starts_with(ZIP_MAGIC) || data.starts_with(CFB_MAGIC) {
            return ImportFormat::Workbook;
        }
        match data.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'[') => ImportFormat::Json,
            _ => ImportFormat::Csv,
        }
    }
}

/// One spreadsheet row keyed by canonical column name.
pub type Row = HashMap<String, String>;

/// A non-blank row with its 1-based position among the data rows of the file.
pub type NumberedRow = (usize, Row);

/// Maps a spreadsheet header to the field it feeds.
fn canonical_column(header: &str) -> String {
    let key = header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace(['-', '_'], " ");

    match key.as_str() {
        "name" | "full name" | "contact name" | "contact" => "name",
        "email" | "e mail" | "email address" | "mail" => "email",
        "phone" | "phone number" | "mobile" | "telephone" | "tel" => "phone",
        "facebook" | "facebook url" | "fb" => "facebook",
        "instagram" | "instagram handle" | "ig" => "instagram",
        "linkedin" | "linkedin url" | "linkedin profile" => "linkedin",
        "twitter" | "x" | "twitter handle" => "twitter",
        "segment" | "segments" | "tags" | "tag" => "segments",
        other => return other.to_string(),
    }
    .to_string()
}

/// Zips header keys with cell values, dropping empty cells.
fn build_row(headers: &[String], cells: impl Iterator<Item = String>) -> Row {
    headers
        .iter()
        .zip(cells)
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.clone(), value))
        .collect()
}

fn parse_csv(data: &[u8]) -> Result<Vec<NumberedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::BadRequest(format!("Unreadable spreadsheet header: {}", e)))?
        .iter()
        .map(canonical_column)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::BadRequest(format!("Unreadable spreadsheet row {}: {}", index + 1, e))
        })?;
        // The header sits on line 1, so data row N is on line N + 1.
        let number = record
            .position()
            .map_or(index + 1, |pos| (pos.line() as usize).saturating_sub(1).max(1));

        let row = build_row(&headers, record.iter().map(str::to_string));
        if !row.is_empty() {
            rows.push((number, row));
        }
    }

    Ok(rows)
}

fn json_cell(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(json_cell)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

fn parse_json(data: &[u8]) -> Result<Vec<NumberedRow>> {
    let items: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_slice(data)
        .map_err(|e| AppError::BadRequest(format!("Expected a JSON array of objects: {}", e)))?;

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let row = item
                .iter()
                .filter_map(|(key, value)| {
                    json_cell(value)
                        .filter(|v| !v.is_empty())
                        .map(|v| (canonical_column(key), v))
                })
                .collect::<Row>();
            (index + 1, row)
        })
        .filter(|(_, row)| !row.is_empty())
        .collect())
}

fn parse_workbook(data: &[u8]) -> Result<Vec<NumberedRow>> {
    let unreadable =
        |e: calamine::Error| AppError::BadRequest(format!("Unreadable spreadsheet: {}", e));

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data)).map_err(unreadable)?;
    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::BadRequest("The spreadsheet has no sheets".to_string()))?
        .map_err(unreadable)?;

    let mut lines = sheet.rows();
    let headers: Vec<String> = match lines.next() {
        Some(header) => header
            .iter()
            .map(|cell| canonical_column(&cell.to_string()))
            .collect(),
        None => return Ok(Vec::new()),
    };

    Ok(lines
        .enumerate()
        .map(|(index, cells)| {
            let values = cells.iter().map(|cell| cell.to_string().trim().to_string());
            (index + 1, build_row(&headers, values))
        })
        .filter(|(_, row)| !row.is_empty())
        .collect())
}

pub fn parse_rows(format: ImportFormat, data: &[u8]) -> Result<Vec<NumberedRow>> {
    match format {
        ImportFormat::Csv => parse_csv(data),
        ImportFormat::Json => parse_json(data),
        ImportFormat::Workbook => parse_workbook(data),
    }
}

fn row_to_contact(row_number: usize, mut row: Row) -> Result<NewContact> {
    let name = row.remove("name").unwrap_or_default();
    let email = row.remove("email").unwrap_or_default();

    if name.is_empty() && email.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Row {}: a name or an email is required",
            row_number
        )));
    }
    if !email.is_empty() && !email.validate_email() {
        return Err(AppError::BadRequest(format!(
            "Row {}: '{}' is not a valid email address",
            row_number, email
        )));
    }

    let name = if name.is_empty() {
        email.split('@').next().unwrap_or_default().to_string()
    } else {
        name
    };

    let segments = row
        .remove("segments")
        .map(|cell| normalize_segments(cell.split([',', ';', '|'])))
        .unwrap_or_default();

    Ok(NewContact {
        list_id: None,
        name,
        email,
        phone: row.remove("phone"),
        social: SocialHandles {
            facebook: row.remove("facebook"),
            instagram: row.remove("instagram"),
            linkedin: row.remove("linkedin"),
            twitter: row.remove("twitter"),
        },
        segments,
    })
}

pub struct SpreadsheetImporter {
    max_rows: usize,
}

impl SpreadsheetImporter {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// Parses an upload into contacts. Fails as a whole when the file is empty,
    /// exceeds the row cap, or any row is invalid.
    pub fn contacts_from_upload(
        &self,
        format: ImportFormat,
        data: &[u8],
        extra_segment: Option<&str>,
    ) -> Result<Vec<NewContact>> {
        let rows = parse_rows(format, data)?;

        if rows.is_empty() {
            return Err(AppError::BadRequest("The uploaded file has no data rows".to_string()));
        }
        if rows.len() > self.max_rows {
            return Err(AppError::ImportLimit(format!(
                "File has {} rows; at most {} rows can be imported at once",
                rows.len(),
                self.max_rows
            )));
        }

        rows.into_iter()
            .map(|(number, row)| {
                let mut contact = row_to_contact(number, row)?;
                if let Some(segment) = extra_segment {
                    contact.segments =
                        normalize_segments(contact.segments.iter().map(String::as_str).chain([segment]));
                }
                Ok(contact)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_with_rows(n: usize) -> String {
        let mut csv = String::from("Name,Email\n");
        for i in 0..n {
            csv.push_str(&format!("Contact {i},contact{i}@example.com\n"));
        }
        csv
    }

    #[test]
    fn detects_format_from_name_type_and_content() {
        assert_eq!(ImportFormat::detect(Some("leads.JSON"), None, b""), ImportFormat::Json);
        assert_eq!(
            ImportFormat::detect(None, Some("text/csv"), b"[not json"),
            ImportFormat::Csv
        );
        assert_eq!(ImportFormat::detect(None, None, b"  [{\"a\":1}]"), ImportFormat::Json);
        assert_eq!(ImportFormat::detect(None, None, b"name,email"), ImportFormat::Csv);
    }

    #[test]
    fn detects_workbooks() {
        assert_eq!(ImportFormat::detect(Some("leads.xlsx"), None, b""), ImportFormat::Workbook);
        assert_eq!(ImportFormat::detect(Some("old.XLS"), None, b""), ImportFormat::Workbook);
        assert_eq!(
            ImportFormat::detect(
                None,
                Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
                b""
            ),
            ImportFormat::Workbook
        );
        assert_eq!(
            ImportFormat::detect(Some("upload"), None, b"PK\x03\x04rest"),
            ImportFormat::Workbook
        );
    }

    #[test]
    fn corrupt_workbook_is_reported_as_unreadable() {
        let err = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Workbook, b"PK\x03\x04 not a workbook", None)
            .unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.starts_with("Unreadable spreadsheet"), "{}", msg)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn csv_headers_are_normalised() {
        let data = "Full Name, E-mail ,Phone Number,Tags\nAda Lovelace,ADA@Example.com,555-0100,vip; beta\n";
        let contacts = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Csv, data.as_bytes(), None)
            .unwrap();

        assert_eq!(contacts.len(), 1);
        let ada = &contacts[0];
        assert_eq!(ada.name, "Ada Lovelace");
        assert_eq!(ada.email, "ADA@Example.com");
        assert_eq!(ada.phone.as_deref(), Some("555-0100"));
        assert_eq!(ada.segments, vec!["vip".to_string(), "beta".to_string()]);
    }

    #[test]
    fn json_rows_accept_arrays_and_numbers() {
        let data = r#"[
            {"name": "Grace", "email": "grace@example.com", "phone": 5550101, "tags": ["navy", "cobol"]},
            {"email": "linus@example.com", "linkedin": "in/linus"}
        ]"#;
        let contacts = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Json, data.as_bytes(), Some("imported"))
            .unwrap();

        assert_eq!(contacts[0].phone.as_deref(), Some("5550101"));
        assert_eq!(contacts[0].segments, vec!["navy", "cobol", "imported"]);
        assert_eq!(contacts[1].name, "linus");
        assert_eq!(contacts[1].social.linkedin.as_deref(), Some("in/linus"));
    }

    #[test]
    fn exactly_the_cap_is_accepted() {
        let contacts = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Csv, csv_with_rows(100).as_bytes(), None)
            .unwrap();
        assert_eq!(contacts.len(), 100);
    }

    #[test]
    fn one_row_over_the_cap_is_rejected() {
        let err = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Csv, csv_with_rows(101).as_bytes(), None)
            .unwrap_err();
        assert!(matches!(err, AppError::ImportLimit(_)));
    }

    #[test]
    fn blank_rows_do_not_count() {
        let data = "name,email\nAda,ada@example.com\n,\n\nGrace,grace@example.com\n";
        let contacts = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Csv, data.as_bytes(), None)
            .unwrap();
        assert_eq!(contacts.len(), 2);
    }

    #[test]
    fn invalid_row_rejects_whole_file() {
        let data = "name,email\nAda,ada@example.com\nBroken,not-an-email\n";
        let err = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Csv, data.as_bytes(), None)
            .unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.starts_with("Row 2"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn row_numbers_count_blank_rows() {
        let data = "name,email\nAda,ada@example.com\n,\nBroken,not-an-email\n";
        let err = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Csv, data.as_bytes(), None)
            .unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.starts_with("Row 3:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }

        let json = r#"[{"name": "Ada"}, {}, {"email": "nope"}]"#;
        let err = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Json, json.as_bytes(), None)
            .unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.starts_with("Row 3:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = SpreadsheetImporter::new(100)
            .contacts_from_upload(ImportFormat::Csv, b"name,email\n", None)
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
