//! In-memory document loaders, one per supported file type.

use std::io::Cursor;
use std::path::Path;

use calamine::{Reader, Xls, XlsError, Xlsx, XlsxError, open_workbook_from_rs};
use serde_json::{Map, Value, json};

use crate::error::IngestError;
use crate::store::Document;

/// A supported upload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Plain UTF-8 text.
    Text,
    /// PDF document.
    Pdf,
    /// Comma-separated values with a header row.
    Csv,
    /// Office Open XML spreadsheet.
    Xlsx,
    /// Legacy Excel spreadsheet.
    Xls,
}

impl FileKind {
    /// Maps a lower-cased extension (with leading dot) to a kind.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".txt" => Some(Self::Text),
            ".pdf" => Some(Self::Pdf),
            ".csv" => Some(Self::Csv),
            ".xlsx" => Some(Self::Xlsx),
            ".xls" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Resolves the kind of `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFileType`] carrying the extension
    /// (empty if there is none).
    pub fn for_filename(filename: &str) -> Result<Self, IngestError> {
        let ext = extension(filename);
        Self::from_extension(&ext).ok_or(IngestError::UnsupportedFileType(ext))
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

/// Lower-cased extension of `filename` including the dot, or `""`.
#[must_use]
pub fn extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Loads `bytes` as `kind`, tagging every document with `source`.
///
/// # Errors
///
/// Returns [`IngestError::Load`] if the content cannot be parsed.
pub fn load(kind: FileKind, filename: &str, bytes: &[u8]) -> Result<Vec<Document>, IngestError> {
    let fail = |message: String| IngestError::Load {
        kind: kind.label(),
        message,
    };

    let mut docs = match kind {
        FileKind::Text => vec![Document::new(String::from_utf8_lossy(bytes).into_owned())],
        FileKind::Pdf => {
            let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| fail(e.to_string()))?;
            vec![Document::new(text)]
        }
        FileKind::Csv => load_csv(bytes).map_err(|e| fail(e.to_string()))?,
        FileKind::Xlsx => {
            let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
                .map_err(|e: XlsxError| fail(e.to_string()))?;
            load_workbook(workbook).map_err(fail)?
        }
        FileKind::Xls => {
            let workbook: Xls<_> = open_workbook_from_rs(Cursor::new(bytes))
                .map_err(|e: XlsError| fail(e.to_string()))?;
            load_workbook(workbook).map_err(fail)?
        }
    };

    for doc in &mut docs {
        doc.metadata
            .insert("source".to_string(), Value::String(filename.to_string()));
    }
    Ok(docs)
}

/// One document per data row: `header: value` lines, tagged with `row`.
fn load_csv(bytes: &[u8]) -> Result<Vec<Document>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut docs = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let content = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| format!("{}: {}", h.trim(), v.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        let mut meta = Map::new();
        meta.insert("row".to_string(), json!(row));
        docs.push(Document::with_metadata(content, meta));
    }
    Ok(docs)
}

/// One document per sheet: rows of tab-separated cells, tagged with `sheet`.
fn load_workbook<RS, R>(mut workbook: R) -> Result<Vec<Document>, String>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let mut docs = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(|e| e.to_string())?;
        let content = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n");
        let mut meta = Map::new();
        meta.insert("sheet".to_string(), Value::String(name));
        docs.push(Document::with_metadata(content, meta));
    }
    Ok(docs)
}
