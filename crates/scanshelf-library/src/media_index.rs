// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Media index backed by SQLite.
//
// Mirrors a platform media store: one row per saved file with its display
// name, MIME type, root-relative folder, modification time (in seconds) and
// absolute path. The catalog queries it per format with the same path and
// MIME predicates a shared media store would be queried with.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::{debug, info, instrument};

use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::types::{BASE_FOLDER, DocumentFormat, OutputDocument};

/// SQLite schema for the media table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS media (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        display_name TEXT NOT NULL,
        mime_type TEXT NOT NULL,
        relative_path TEXT NOT NULL,
        date_modified INTEGER NOT NULL DEFAULT 0,
        data TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS media_mime ON media (mime_type);
"#;

/// One row of the media table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    pub display_name: String,
    pub mime_type: String,
    /// Root-relative folder, e.g. `Documents/ScannedDocuments/PDF/`.
    pub relative_path: String,
    /// Seconds since the Unix epoch, as media stores record it.
    pub date_modified: i64,
    /// Absolute path of the file.
    pub data: PathBuf,
}

impl MediaEntry {
    /// Entry for a freshly written output, stamped with the current time.
    pub fn for_output(output: &OutputDocument) -> Self {
        Self {
            display_name: output.display_name.clone(),
            mime_type: output.mime_type().to_string(),
            relative_path: output.relative_path.clone(),
            date_modified: Utc::now().timestamp(),
            data: output.path.clone(),
        }
    }
}

/// Persistent media index.
///
/// Methods are synchronous; wrap calls in `tokio::task::spawn_blocking`
/// from async code.
pub struct MediaIndex {
    conn: Connection,
}

impl MediaIndex {
    /// Open (or create) the index database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())
            .map_err(|e| ScanshelfError::StorageAccess(format!("open media index: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| ScanshelfError::StorageAccess(format!("WAL pragma: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| ScanshelfError::StorageAccess(format!("create table: {e}")))?;

        info!("media index opened");
        Ok(Self { conn })
    }

    /// Open an in-memory index (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ScanshelfError::StorageAccess(format!("open in-memory: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| ScanshelfError::StorageAccess(format!("create table: {e}")))?;

        debug!("in-memory media index opened");
        Ok(Self { conn })
    }

    /// Insert a row and return its id.
    #[instrument(skip(self, entry), fields(display_name = %entry.display_name))]
    pub fn insert(&self, entry: &MediaEntry) -> Result<i64> {
        insert_row(&self.conn, entry)
    }

    /// Register a written output so the next catalog scan sees it.
    pub fn register(&self, output: &OutputDocument) -> Result<i64> {
        self.insert(&MediaEntry::for_output(output))
    }

    /// Register several outputs in one transaction: either every row is
    /// inserted or none is.
    #[instrument(skip_all, fields(count = outputs.len()))]
    pub fn register_all(&mut self, outputs: &[OutputDocument]) -> Result<Vec<i64>> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| ScanshelfError::StorageAccess(format!("begin transaction: {e}")))?;

        let mut ids = Vec::with_capacity(outputs.len());
        for output in outputs {
            // Dropping `tx` on error rolls back the rows inserted so far.
            ids.push(insert_row(&tx, &MediaEntry::for_output(output))?);
        }

        tx.commit()
            .map_err(|e| ScanshelfError::StorageAccess(format!("commit media rows: {e}")))?;
        Ok(ids)
    }

    /// All rows belonging to `format`'s collection, newest first.
    #[instrument(skip(self), fields(format = %format))]
    pub fn query(&self, format: DocumentFormat) -> Result<Vec<MediaEntry>> {
        let folder_pattern = format!("%{BASE_FOLDER}/{}%", format.folder_name());
        let (mime_predicate, mime_value) = match format {
            DocumentFormat::Pdf | DocumentFormat::Docx => {
                ("mime_type = ?2", format.mime_type().to_string())
            }
            DocumentFormat::Jpeg => ("mime_type LIKE ?2", "image/%jpeg%".to_string()),
            DocumentFormat::Png => ("mime_type LIKE ?2", "image/%png%".to_string()),
        };
        let sql = format!(
            "SELECT display_name, mime_type, relative_path, date_modified, data
             FROM media
             WHERE relative_path LIKE ?1 AND {mime_predicate}
             ORDER BY date_modified DESC"
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| ScanshelfError::StorageAccess(format!("prepare query: {e}")))?;

        let rows = stmt
            .query_map(params![folder_pattern, mime_value], |row| {
                Ok(MediaEntry {
                    display_name: row.get(0)?,
                    mime_type: row.get(1)?,
                    relative_path: row.get(2)?,
                    date_modified: row.get(3)?,
                    data: PathBuf::from(row.get::<_, String>(4)?),
                })
            })
            .map_err(|e| ScanshelfError::StorageAccess(format!("query media: {e}")))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ScanshelfError::StorageAccess(format!("read media row: {e}")))
    }

    /// Total number of rows.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))
            .map_err(|e| ScanshelfError::StorageAccess(format!("count media: {e}")))?;
        Ok(count as u64)
    }

    /// Make every insert of `display_name` fail, to exercise rollback paths.
    #[cfg(test)]
    pub(crate) fn reject_display_name(&self, display_name: &str) {
        let sql = format!(
            "CREATE TRIGGER reject_{n} BEFORE INSERT ON media
             WHEN NEW.display_name = '{display_name}'
             BEGIN SELECT RAISE(ABORT, 'insert rejected'); END;",
            n = display_name.replace(|c: char| !c.is_ascii_alphanumeric(), "_")
        );
        self.conn.execute_batch(&sql).expect("create trigger");
    }
}

fn insert_row(conn: &Connection, entry: &MediaEntry) -> Result<i64> {
    conn.execute(
        "INSERT INTO media (display_name, mime_type, relative_path, date_modified, data)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.display_name,
            entry.mime_type,
            entry.relative_path,
            entry.date_modified,
            entry.data.to_string_lossy().into_owned(),
        ],
    )
    .map_err(|e| ScanshelfError::StorageAccess(format!("insert media: {e}")))?;

    let id = conn.last_insert_rowid();
    debug!(id, "media row inserted");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanshelf_core::types::StorageLayout;

    fn entry(name: &str, format: DocumentFormat, date_modified: i64) -> MediaEntry {
        MediaEntry {
            display_name: name.to_string(),
            mime_type: format.mime_type().to_string(),
            relative_path: StorageLayout::relative_path(format),
            date_modified,
            data: PathBuf::from(format!("/storage/{name}")),
        }
    }

    #[test]
    fn insert_and_query_by_format() {
        let index = MediaIndex::open_in_memory().expect("open");
        index.insert(&entry("a.pdf", DocumentFormat::Pdf, 100)).expect("insert");
        index.insert(&entry("b.pdf", DocumentFormat::Pdf, 300)).expect("insert");
        index.insert(&entry("c.docx", DocumentFormat::Docx, 200)).expect("insert");
        index.insert(&entry("d.jpg", DocumentFormat::Jpeg, 50)).expect("insert");

        let pdfs = index.query(DocumentFormat::Pdf).expect("query");
        let names: Vec<_> = pdfs.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["b.pdf", "a.pdf"]);
        assert_eq!(index.query(DocumentFormat::Docx).expect("query").len(), 1);
        assert_eq!(index.query(DocumentFormat::Jpeg).expect("query").len(), 1);
        assert!(index.query(DocumentFormat::Png).expect("query").is_empty());
        assert_eq!(index.count().expect("count"), 4);
    }

    #[test]
    fn rows_outside_scanned_folders_are_ignored() {
        let index = MediaIndex::open_in_memory().expect("open");
        let mut stray = entry("holiday.pdf", DocumentFormat::Pdf, 10);
        stray.relative_path = "Documents/Downloads/".to_string();
        index.insert(&stray).expect("insert");
        assert!(index.query(DocumentFormat::Pdf).expect("query").is_empty());
    }

    #[test]
    fn image_mime_match_is_by_pattern() {
        let index = MediaIndex::open_in_memory().expect("open");
        let mut progressive = entry("scan.jpg", DocumentFormat::Jpeg, 10);
        progressive.mime_type = "image/pjpeg".to_string();
        index.insert(&progressive).expect("insert");
        assert_eq!(index.query(DocumentFormat::Jpeg).expect("query").len(), 1);
    }

    #[test]
    fn register_records_output_metadata() {
        let index = MediaIndex::open_in_memory().expect("open");
        let output = OutputDocument {
            format: DocumentFormat::Docx,
            display_name: "report.docx".to_string(),
            path: PathBuf::from("/docs/ScannedDocuments/DOCX/report.docx"),
            relative_path: StorageLayout::relative_path(DocumentFormat::Docx),
        };
        index.register(&output).expect("register");

        let rows = index.query(DocumentFormat::Docx).expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mime_type, DocumentFormat::Docx.mime_type());
        assert_eq!(rows[0].data, output.path);
        assert!(rows[0].date_modified > 0);
    }

    fn png_output(name: &str) -> OutputDocument {
        OutputDocument {
            format: DocumentFormat::Png,
            display_name: name.to_string(),
            path: PathBuf::from(format!("/pics/ScannedDocuments/PNG/{name}")),
            relative_path: StorageLayout::relative_path(DocumentFormat::Png),
        }
    }

    #[test]
    fn register_all_inserts_every_output() {
        let mut index = MediaIndex::open_in_memory().expect("open");
        let ids = index
            .register_all(&[png_output("scan_1.png"), png_output("scan_2.png")])
            .expect("register");
        assert_eq!(ids.len(), 2);
        assert_eq!(index.query(DocumentFormat::Png).expect("query").len(), 2);
    }

    #[test]
    fn register_all_is_all_or_nothing() {
        let mut index = MediaIndex::open_in_memory().expect("open");
        index.insert(&entry("old.png", DocumentFormat::Png, 1)).expect("insert");
        index.reject_display_name("scan_2.png");

        let result = index.register_all(&[
            png_output("scan_1.png"),
            png_output("scan_2.png"),
            png_output("scan_3.png"),
        ]);
        assert!(matches!(result, Err(ScanshelfError::StorageAccess(_))));
        assert_eq!(index.count().expect("count"), 1);
    }

    #[test]
    fn file_backed_index_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("index").join("media.db");
        {
            let index = MediaIndex::open(&path).expect("open");
            index.insert(&entry("a.png", DocumentFormat::Png, 1)).expect("insert");
        }
        let index = MediaIndex::open(&path).expect("reopen");
        assert_eq!(index.query(DocumentFormat::Png).expect("query").len(), 1);
    }
}
