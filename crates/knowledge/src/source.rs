//! Text sources for the ingest path.
//!
//! A source yields one string: the full text to be chunked. PDFs are read
//! with lopdf, page by page in page order. The relational variant reads the
//! first row of a single text column from a SQLite table.

use async_trait::async_trait;
use lopdf::Document;
use pdfqa_core::{AppError, AppResult};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};

/// Anything the ingest path can read text from.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Human-readable description recorded with the index (path, table, ...).
    fn describe(&self) -> String;

    /// Load the full text. Blocks the caller until done.
    async fn load_text(&self) -> AppResult<String>;
}

/// A PDF file on disk.
#[derive(Debug, Clone)]
pub struct PdfSource {
    path: PathBuf,
}

impl PdfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TextSource for PdfSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load_text(&self) -> AppResult<String> {
        if !self.path.exists() {
            return Err(AppError::NotFound(format!(
                "PDF file not found: {}",
                self.path.display()
            )));
        }

        tracing::info!("Extracting text from PDF {:?}", self.path);

        // lopdf parsing is CPU-bound and synchronous
        let path = self.path.clone();
        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&path))
            .await
            .map_err(|e| AppError::Extraction(format!("PDF extraction task failed: {}", e)))??;

        tracing::info!(chars = text.chars().count(), "Extracted PDF text");
        Ok(text)
    }
}

/// Concatenate the text of every page, in page order.
pub fn extract_pdf_text(path: &Path) -> AppResult<String> {
    let doc = Document::load(path).map_err(|e| {
        AppError::Extraction(format!("Failed to read PDF {}: {}", path.display(), e))
    })?;

    // get_pages is keyed by 1-based page number, so iteration is in page order
    let pages = doc.get_pages();
    let mut text = String::new();

    for page_number in pages.keys() {
        let page_text = doc.extract_text(&[*page_number]).map_err(|e| {
            AppError::Extraction(format!(
                "Failed to extract text from page {} of {}: {}",
                page_number,
                path.display(),
                e
            ))
        })?;
        tracing::debug!(page = page_number, chars = page_text.len(), "Extracted page");
        text.push_str(&page_text);
    }

    Ok(text)
}

/// The first row of one text column in a SQLite table.
#[derive(Debug, Clone)]
pub struct TableSource {
    db_path: PathBuf,
    table: String,
    column: String,
}

impl TableSource {
    /// Table and column are interpolated into SQL, so both must be plain identifiers.
    pub fn new(
        db_path: impl Into<PathBuf>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> AppResult<Self> {
        let table = table.into();
        let column = column.into();
        check_identifier(&table)?;
        check_identifier(&column)?;

        Ok(Self {
            db_path: db_path.into(),
            table,
            column,
        })
    }
}

#[async_trait]
impl TextSource for TableSource {
    fn describe(&self) -> String {
        format!("{}:{}.{}", self.db_path.display(), self.table, self.column)
    }

    async fn load_text(&self) -> AppResult<String> {
        if !self.db_path.exists() {
            return Err(AppError::NotFound(format!(
                "Database not found: {}",
                self.db_path.display()
            )));
        }

        tracing::info!("Reading {}.{} from {:?}", self.table, self.column, self.db_path);

        let source = self.clone();
        tokio::task::spawn_blocking(move || source.read_first_row())
            .await
            .map_err(|e| AppError::Extraction(format!("Database read task failed: {}", e)))?
    }
}

impl TableSource {
    fn read_first_row(&self) -> AppResult<String> {
        let conn = Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| AppError::Extraction(format!("Failed to open database: {}", e)))?;

        let sql = format!("SELECT {} FROM {} LIMIT 1", self.column, self.table);
        let value: Option<Option<String>> = conn
            .query_row(&sql, [], |row| row.get(0))
            .optional()
            .map_err(|e| AppError::Extraction(format!("Failed to query {}: {}", self.table, e)))?;

        match value.flatten() {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(AppError::Extraction(
                "No content found in the database".to_string(),
            )),
        }
    }
}

fn check_identifier(name: &str) -> AppResult<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppError::Config(format!("Invalid SQL identifier: {:?}", name)))
    }
}
