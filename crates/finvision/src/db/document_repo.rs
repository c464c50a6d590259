//! Document repository for operations on the `documents` table.

use rusqlite::{params, Connection, Row};

use super::{Database, DatabaseError};
use crate::ledger::{DocumentRecord, DocumentStatus};

/// A raw document row from the database.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub id: String,
    pub name: String,
    pub upload_date: String,
    pub status: String,
    pub file_size: i64,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            upload_date: row.get("upload_date")?,
            status: row.get("status")?,
            file_size: row.get("file_size")?,
        })
    }
}

impl From<&DocumentRecord> for DocumentRow {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.name.clone(),
            upload_date: doc.upload_date.clone(),
            status: doc.status.as_str().to_string(),
            file_size: i64::try_from(doc.file_size).unwrap_or(i64::MAX),
        }
    }
}

impl TryFrom<DocumentRow> for DocumentRecord {
    type Error = DatabaseError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let status =
            DocumentStatus::parse(&row.status).ok_or_else(|| DatabaseError::InvalidValue {
                column: "status",
                value: row.status.clone(),
            })?;

        Ok(DocumentRecord {
            id: row.id,
            name: row.name,
            upload_date: row.upload_date,
            status,
            file_size: u64::try_from(row.file_size).unwrap_or(0),
        })
    }
}

/// Inserts a document row on an already locked connection.
pub(crate) fn insert_on(conn: &Connection, doc: &DocumentRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (id, name, upload_date, status, file_size)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![doc.id, doc.name, doc.upload_date, doc.status, doc.file_size],
    )?;
    Ok(())
}

/// Inserts a new document.
pub fn insert(db: &Database, doc: &DocumentRecord) -> Result<(), DatabaseError> {
    let row = DocumentRow::from(doc);
    db.with_conn(|conn| insert_on(conn, &row))
}

/// Finds a document by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<DocumentRecord>, DatabaseError> {
    let row = db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], DocumentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })?;

    row.map(DocumentRecord::try_from).transpose()
}

/// Lists all documents, newest upload first.
pub fn list(db: &Database) -> Result<Vec<DocumentRecord>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM documents ORDER BY upload_date DESC, rowid DESC")?;
        let rows = stmt
            .query_map([], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    rows.into_iter().map(DocumentRecord::try_from).collect()
}
