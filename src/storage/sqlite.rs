//! SQLite deal store

use crate::model::DealRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DealStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SELECT_COLUMNS: &str = "SELECT link, title, price, set_number, temperature, comments_count, \
     posted_date, free_shipping, image_url, source FROM deals";

const INSERT_SQL: &str = "INSERT INTO deals (link, title, price, set_number, temperature, \
     comments_count, posted_date, free_shipping, image_url, source) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<DealRecord> {
    let posted: Option<String> = row.get(6)?;
    Ok(DealRecord {
        link: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        set_number: row.get(3)?,
        temperature: row.get(4)?,
        comments_count: row.get(5)?,
        posted_date: posted
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc)),
        free_shipping: row.get(7)?,
        image_url: row.get(8)?,
        source: row.get(9)?,
    })
}

fn insert_row(conn: &Connection, record: &DealRecord) -> rusqlite::Result<usize> {
    conn.execute(
        INSERT_SQL,
        params![
            record.link,
            record.title,
            record.price,
            record.set_number,
            record.temperature,
            record.comments_count,
            record.posted_date.map(|d| d.to_rfc3339()),
            record.free_shipping,
            record.image_url,
            record.source,
        ],
    )
}

impl DealStore for SqliteStore {
    fn load_all(&self) -> StorageResult<Vec<DealRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn replace_all(&mut self, records: &[DealRecord]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM deals", [])?;
        for record in records {
            insert_row(&tx, record)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert(&mut self, record: &DealRecord) -> StorageResult<()> {
        if self.get(&record.link)?.is_some() {
            return Err(StorageError::Duplicate(record.link.clone()));
        }
        insert_row(&self.conn, record)?;
        Ok(())
    }

    fn get(&self, link: &str) -> StorageResult<Option<DealRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{} WHERE link = ?1", SELECT_COLUMNS),
                params![link],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn replace(&mut self, record: &DealRecord) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE deals SET title = ?2, price = ?3, set_number = ?4, temperature = ?5, \
             comments_count = ?6, posted_date = ?7, free_shipping = ?8, image_url = ?9, \
             source = ?10 WHERE link = ?1",
            params![
                record.link,
                record.title,
                record.price,
                record.set_number,
                record.temperature,
                record.comments_count,
                record.posted_date.map(|d| d.to_rfc3339()),
                record.free_shipping,
                record.image_url,
                record.source,
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::NotFound(record.link.clone()));
        }
        Ok(())
    }
}
