//! Transaction repository for operations on the `transactions` table.

use chrono::Utc;
use rusqlite::{params, Connection, Row};

use super::document_repo::{self, DocumentRow};
use super::{Database, DatabaseError};
use crate::ledger::{DocumentRecord, Transaction, TransactionType};

/// A raw transaction row from the database.
#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub vendor: String,
    pub amount: f64,
    pub tax: f64,
    pub category: String,
    pub currency: String,
    pub kind: String,
    pub document_id: String,
    pub document_data: Option<String>,
    pub mime_type: Option<String>,
}

impl TransactionRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            vendor: row.get("vendor")?,
            amount: row.get("amount")?,
            tax: row.get("tax")?,
            category: row.get("category")?,
            currency: row.get("currency")?,
            kind: row.get("type")?,
            document_id: row.get("document_id")?,
            document_data: row.get("document_data")?,
            mime_type: row.get("mime_type")?,
        })
    }
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id.clone(),
            date: t.date.clone(),
            vendor: t.vendor.clone(),
            amount: t.amount,
            tax: t.tax,
            category: t.category.clone(),
            currency: t.currency.clone(),
            kind: t.kind.as_str().to_string(),
            document_id: t.document_id.clone(),
            document_data: t.document_data.clone(),
            mime_type: t.mime_type.clone(),
        }
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DatabaseError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind: TransactionType = row.kind.parse().map_err(|_| DatabaseError::InvalidValue {
            column: "type",
            value: row.kind.clone(),
        })?;

        Ok(Transaction {
            id: row.id,
            date: row.date,
            vendor: row.vendor,
            amount: row.amount,
            tax: row.tax,
            category: row.category,
            currency: row.currency,
            kind,
            document_id: row.document_id,
            document_data: row.document_data,
            mime_type: row.mime_type,
        })
    }
}

fn insert_on(conn: &Connection, t: &TransactionRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO transactions (id, date, vendor, amount, tax, category, currency, type,
         document_id, document_data, mime_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            t.id,
            t.date,
            t.vendor,
            t.amount,
            t.tax,
            t.category,
            t.currency,
            t.kind,
            t.document_id,
            t.document_data,
            t.mime_type,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Inserts a document and its transaction atomically.
pub fn insert_pair(
    db: &Database,
    doc: &DocumentRecord,
    tx: &Transaction,
) -> Result<(), DatabaseError> {
    let doc_row = DocumentRow::from(doc);
    let tx_row = TransactionRow::from(tx);

    db.with_conn_mut(|conn| {
        let sql_tx = conn.transaction()?;
        document_repo::insert_on(&sql_tx, &doc_row)?;
        insert_on(&sql_tx, &tx_row)?;
        sql_tx.commit()?;
        Ok(())
    })
}

/// Inserts a transaction or overwrites every field of an existing one.
pub fn upsert(db: &Database, t: &Transaction) -> Result<(), DatabaseError> {
    let row = TransactionRow::from(t);
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO transactions (id, date, vendor, amount, tax, category, currency, type,
             document_id, document_data, mime_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET date=excluded.date, vendor=excluded.vendor,
             amount=excluded.amount, tax=excluded.tax, category=excluded.category,
             currency=excluded.currency, type=excluded.type, document_id=excluded.document_id,
             document_data=excluded.document_data, mime_type=excluded.mime_type",
            params![
                row.id,
                row.date,
                row.vendor,
                row.amount,
                row.tax,
                row.category,
                row.currency,
                row.kind,
                row.document_id,
                row.document_data,
                row.mime_type,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    })
}

/// Finds a transaction by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<Transaction>, DatabaseError> {
    let row = db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM transactions WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], TransactionRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })?;

    row.map(Transaction::try_from).transpose()
}

/// Lists all transactions, latest date first.
pub fn list(db: &Database) -> Result<Vec<Transaction>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM transactions ORDER BY date DESC, created_at DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map([], TransactionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    rows.into_iter().map(Transaction::try_from).collect()
}

/// Deletes a transaction. Returns whether a row was removed.
pub fn delete(db: &Database, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::DocumentStatus;

    fn tx(id: &str, date: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: date.to_string(),
            vendor: "Amazon Web Services".to_string(),
            amount,
            tax: 0.0,
            category: "Software SaaS".to_string(),
            currency: "USD".to_string(),
            kind: TransactionType::Expense,
            document_id: "doc-1".to_string(),
            document_data: Some("data:application/pdf;base64,AAAA".to_string()),
            mime_type: Some("application/pdf".to_string()),
        }
    }

    fn doc() -> DocumentRecord {
        DocumentRecord {
            id: "doc-1".to_string(),
            name: "aws.pdf".to_string(),
            upload_date: "2026-01-01T00:00:00+00:00".to_string(),
            status: DocumentStatus::Completed,
            file_size: 100,
        }
    }

    #[test]
    fn test_insert_pair_and_find() {
        let db = Database::open_in_memory().unwrap();
        let t = tx("tr-1", "2023-12-15", 1450.5);
        insert_pair(&db, &doc(), &t).unwrap();

        assert_eq!(find_by_id(&db, "tr-1").unwrap(), Some(t));
        assert!(document_repo::find_by_id(&db, "doc-1").unwrap().is_some());
    }

    #[test]
    fn test_insert_pair_is_atomic() {
        let db = Database::open_in_memory().unwrap();
        insert_pair(&db, &doc(), &tx("tr-1", "2023-12-15", 1.0)).unwrap();

        // Same transaction id again: the second document must not be kept.
        let mut second_doc = doc();
        second_doc.id = "doc-2".to_string();
        assert!(insert_pair(&db, &second_doc, &tx("tr-1", "2023-12-16", 2.0)).is_err());
        assert!(document_repo::find_by_id(&db, "doc-2").unwrap().is_none());
    }

    #[test]
    fn test_upsert_overwrites() {
        let db = Database::open_in_memory().unwrap();
        let mut t = tx("tr-1", "2023-12-15", 10.0);
        upsert(&db, &t).unwrap();

        t.amount = 20.0;
        t.kind = TransactionType::Income;
        upsert(&db, &t).unwrap();

        let all = list(&db).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, 20.0);
        assert_eq!(all[0].kind, TransactionType::Income);
    }

    #[test]
    fn test_list_orders_by_date_desc() {
        let db = Database::open_in_memory().unwrap();
        upsert(&db, &tx("tr-a", "2023-11-01", 1.0)).unwrap();
        upsert(&db, &tx("tr-b", "2023-12-01", 1.0)).unwrap();

        let ids: Vec<String> = list(&db).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["tr-b", "tr-a"]);
    }

    #[test]
    fn test_delete() {
        let db = Database::open_in_memory().unwrap();
        upsert(&db, &tx("tr-1", "2023-12-15", 10.0)).unwrap();

        assert!(delete(&db, "tr-1").unwrap());
        assert!(!delete(&db, "tr-1").unwrap());
        assert!(list(&db).unwrap().is_empty());
    }
}
