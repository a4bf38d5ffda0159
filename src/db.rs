use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::{Result, TallyError};
use crate::models::{validate_amount, Transaction, TransactionKind, TIMESTAMP_FORMAT};

pub const SCHEMA_VERSION: &str = "1";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
    amount TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    timestamp TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_transactions_timestamp ON transactions(timestamp);

CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

const SELECT_COLUMNS: &str = "SELECT id, kind, amount, category, description, timestamp FROM transactions";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute(
        "INSERT OR IGNORE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION],
    )?;
    Ok(())
}

pub fn get_metadata(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| row.get(0))
        .optional()
        .ok()
        .flatten()
}

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(1)?;
    let kind = TransactionKind::from_str(&kind).map_err(|e| conversion_error(1, e.to_string()))?;
    let amount: String = row.get(2)?;
    let amount = Decimal::from_str(&amount)
        .map_err(|e| conversion_error(2, format!("bad amount '{amount}': {e}")))?;
    validate_amount(amount).map_err(|e| conversion_error(2, e.to_string()))?;
    let timestamp: String = row.get(5)?;
    let timestamp = NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT)
        .map_err(|e| conversion_error(5, format!("bad timestamp '{timestamp}': {e}")))?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        kind,
        amount,
        category: row.get(3)?,
        description: row.get(4)?,
        timestamp,
    })
}

/// Durable transaction collection backed by a single SQLite connection.
///
/// Obtained with [`Store::open`] and released with [`Store::close`]. Every
/// read returns a fresh snapshot; nothing is cached between calls.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        tracing::debug!(path = %db_path.display(), "opened store");
        Ok(Self { conn })
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| TallyError::Db(e))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Persist a new record and return the id assigned to it.
    pub fn insert(&self, txn: &Transaction) -> Result<i64> {
        validate_amount(txn.amount)?;
        self.conn.execute(
            "INSERT INTO transactions (kind, amount, category, description, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                txn.kind.as_str(),
                txn.amount.to_string(),
                txn.category,
                txn.description,
                txn.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, kind = txn.kind.as_str(), amount = %txn.amount, "inserted transaction");
        Ok(id)
    }

    /// Replace the stored record that has the same id.
    pub fn update(&self, txn: &Transaction) -> Result<()> {
        let id = txn.id.ok_or_else(|| {
            TallyError::Validation("cannot update a transaction that has no id".to_string())
        })?;
        validate_amount(txn.amount)?;
        let changed = self.conn.execute(
            "UPDATE transactions SET kind = ?1, amount = ?2, category = ?3, description = ?4, \
             timestamp = ?5 WHERE id = ?6",
            params![
                txn.kind.as_str(),
                txn.amount.to_string(),
                txn.category,
                txn.description,
                txn.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(TallyError::NotFound(id));
        }
        tracing::info!(id, "updated transaction");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(TallyError::NotFound(id));
        }
        tracing::info!(id, "deleted transaction");
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Transaction> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        self.conn
            .query_row(&sql, [id], row_to_transaction)
            .optional()?
            .ok_or(TallyError::NotFound(id))
    }

    /// All records, newest first. Ties on timestamp fall back to newest id first.
    pub fn list_all(&self) -> Result<Vec<Transaction>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::parse_timestamp;

    pub(crate) fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn txn(kind: TransactionKind, amount: &str, category: &str, date: &str) -> Transaction {
        Transaction::new(
            kind,
            Decimal::from_str(amount).unwrap(),
            category,
            "",
            parse_timestamp(date).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, store) = test_store();
        let tables: Vec<String> = store
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["transactions", "metadata"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, store) = test_store();
        init_db(store.connection()).unwrap();
        assert_eq!(get_metadata(store.connection(), "schema_version").as_deref(), Some("1"));
    }

    #[test]
    fn test_insert_assigns_id_and_keeps_precision() {
        let (_dir, store) = test_store();
        let id = store
            .insert(&txn(TransactionKind::Income, "1000.125", "Sales", "2024-01-05"))
            .unwrap();
        let loaded = store.get(id).unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.amount, Decimal::from_str("1000.125").unwrap());
        assert_eq!(loaded.kind, TransactionKind::Income);
    }

    #[test]
    fn test_list_all_is_date_descending() {
        let (_dir, store) = test_store();
        store.insert(&txn(TransactionKind::Income, "1", "A", "2024-01-05")).unwrap();
        store.insert(&txn(TransactionKind::Expense, "2", "B", "2024-03-01")).unwrap();
        store.insert(&txn(TransactionKind::Expense, "3", "C", "2024-02-10")).unwrap();
        let cats: Vec<String> = store.list_all().unwrap().into_iter().map(|t| t.category).collect();
        assert_eq!(cats, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_update_replaces_record() {
        let (_dir, store) = test_store();
        let id = store.insert(&txn(TransactionKind::Expense, "200", "Rent", "2024-01-10")).unwrap();
        let mut replacement = store.get(id).unwrap();
        replacement.amount = Decimal::from_str("210.50").unwrap();
        store.update(&replacement).unwrap();
        assert_eq!(store.get(id).unwrap().amount, Decimal::from_str("210.50").unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_update_and_delete_missing_id() {
        let (_dir, store) = test_store();
        let mut ghost = txn(TransactionKind::Expense, "1", "X", "2024-01-01");
        ghost.id = Some(99);
        assert!(matches!(store.update(&ghost), Err(TallyError::NotFound(99))));
        assert!(matches!(store.delete(99), Err(TallyError::NotFound(99))));
        assert!(matches!(store.get(99), Err(TallyError::NotFound(99))));
    }

    #[test]
    fn test_update_without_id_is_validation_error() {
        let (_dir, store) = test_store();
        let unsaved = txn(TransactionKind::Expense, "1", "X", "2024-01-01");
        assert!(matches!(store.update(&unsaved), Err(TallyError::Validation(_))));
    }

    #[test]
    fn test_out_of_range_amounts_never_stored() {
        let (_dir, store) = test_store();
        let mut huge = txn(TransactionKind::Income, "1", "Sales", "2024-01-01");
        huge.amount = Decimal::MAX;
        assert!(matches!(store.insert(&huge), Err(TallyError::Validation(_))));
        assert_eq!(store.count().unwrap(), 0);

        let id = store.insert(&txn(TransactionKind::Income, "1", "Sales", "2024-01-01")).unwrap();
        let mut edited = store.get(id).unwrap();
        edited.amount = Decimal::MAX;
        assert!(matches!(store.update(&edited), Err(TallyError::Validation(_))));
        assert_eq!(store.get(id).unwrap().amount, Decimal::ONE);
    }

    #[test]
    fn test_out_of_range_stored_amount_is_read_error() {
        let (_dir, store) = test_store();
        store
            .connection()
            .execute(
                "INSERT INTO transactions (kind, amount, category, description, timestamp) \
                 VALUES ('income', '79228162514264337593543950335', 'Sales', '', '2024-01-01 00:00:00')",
                [],
            )
            .unwrap();
        assert!(matches!(store.list_all(), Err(TallyError::Db(_))));
    }

    #[test]
    fn test_delete_removes_record() {
        let (_dir, store) = test_store();
        let id = store.insert(&txn(TransactionKind::Income, "5", "Tips", "2024-01-01")).unwrap();
        store.delete(id).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_close_and_reopen_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = Store::open(&path).unwrap();
        store.insert(&txn(TransactionKind::Income, "5", "Tips", "2024-01-01")).unwrap();
        store.close().unwrap();
        let store = Store::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
