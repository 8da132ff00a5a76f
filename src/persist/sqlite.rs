//! SQLite-backed row storage, one table per record type.

use std::path::Path;

use rusqlite::{Connection, params, params_from_iter, types::Value as SqlValue};
use tracing::debug;

use crate::{
    column::{self, Column, ColumnType, TextMode, Value},
    core::store::Store,
    model::EntityRow,
    op::Op,
    types::EntityKind,
};

use super::{PersistResult, RowSink};

/// SQLite implementation of [`crate::persist::RowSink`].
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens or creates a database at `path`, creating missing tables.
    ///
    /// Enables WAL mode, sets `synchronous=NORMAL` and turns foreign key
    /// enforcement on.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory database.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    /// Loads every stored row into a fresh [`Store`].
    pub fn load_store(&self) -> PersistResult<Store> {
        let mut rows = Vec::new();
        for kind in EntityKind::ORDERED {
            rows.extend(self.load_rows(kind)?);
        }
        debug!(rows = rows.len(), "loaded store from sqlite");
        Ok(Store::from_rows(rows))
    }

    /// Loads the rows of one table in key order.
    pub fn load_rows(&self, kind: EntityKind) -> PersistResult<Vec<EntityRow>> {
        let columns = EntityRow::empty(kind).columns();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id ASC",
            column_list(columns),
            kind.table_name()
        );

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let raw = stmt.query_map([], |row| {
            (0..columns.len())
                .map(|idx| row.get::<_, SqlValue>(idx))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?;

        let mut out = Vec::new();
        for values in raw {
            let values = values?;
            let mut row = EntityRow::empty(kind);
            for (column, stored) in columns.iter().zip(values) {
                row.set(column.name, from_sql(column, stored)?)?;
            }
            out.push(row);
        }
        Ok(out)
    }

    /// Number of rows stored in a table.
    pub fn count(&self, kind: EntityKind) -> PersistResult<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", kind.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl RowSink for SqliteSink {
    fn apply_ops(&mut self, ops: &[Op]) -> PersistResult<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for op in ops {
            match op {
                Op::Put { row, .. } => {
                    let columns = row.columns();
                    let values = columns
                        .iter()
                        .map(|c| to_sql(row.get(c.name).unwrap_or(Value::Null)))
                        .collect::<Vec<_>>();
                    let mut stmt = tx.prepare_cached(&upsert_sql(row.kind(), columns))?;
                    stmt.execute(params_from_iter(values))?;
                }
                Op::Delete { row } => {
                    let sql = format!("DELETE FROM {} WHERE id = ?1", row.kind().table_name());
                    let mut stmt = tx.prepare_cached(&sql)?;
                    stmt.execute(params![row.id()])?;
                }
            }
        }
        tx.commit()?;
        debug!(ops = ops.len(), "committed ops to sqlite");
        Ok(())
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}

fn column_list(columns: &[Column]) -> String {
    columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
}

fn upsert_sql(kind: EntityKind, columns: &[Column]) -> String {
    let placeholders = (1..=columns.len())
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    let assignments = columns
        .iter()
        .filter(|c| c.name != "id")
        .map(|c| format!("{0} = excluded.{0}", c.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        kind.table_name(),
        column_list(columns),
        placeholders,
        assignments
    )
}

/// Integers and booleans are stored natively, everything else as neutral text.
fn to_sql(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(v),
        Value::Boolean(v) => SqlValue::Integer(i64::from(v)),
        Value::Text(v) => SqlValue::Text(v),
        other => SqlValue::Text(column::render(&other, TextMode::Neutral)),
    }
}

fn from_sql(column: &Column, stored: SqlValue) -> PersistResult<Value> {
    let value = match (column.ty, stored) {
        (_, SqlValue::Null) => Value::Null,
        (ColumnType::Boolean, SqlValue::Integer(v)) => Value::Boolean(v != 0),
        (ColumnType::Text, SqlValue::Text(v)) => Value::Text(v),
        (ColumnType::Integer, SqlValue::Integer(v)) => Value::Integer(v),
        (_, SqlValue::Integer(v)) => column::parse(column, &v.to_string(), TextMode::Neutral)?,
        (_, SqlValue::Real(v)) => column::parse(column, &v.to_string(), TextMode::Neutral)?,
        (_, SqlValue::Text(v)) => column::parse(column, &v, TextMode::Neutral)?,
        (_, SqlValue::Blob(v)) => {
            column::parse(column, &String::from_utf8_lossy(&v), TextMode::Neutral)?
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Organization, Record};

    #[test]
    fn upsert_updates_every_column_but_the_key() {
        let sql = upsert_sql(EntityKind::Organization, Organization::columns());
        assert_eq!(
            sql,
            "INSERT INTO organization (id, name, code, description) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, code = excluded.code, \
             description = excluded.description"
        );
    }

    #[test]
    fn boolean_columns_are_stored_as_integers() {
        assert_eq!(to_sql(Value::Boolean(true)), SqlValue::Integer(1));
        let main = Column::required("main", ColumnType::Boolean);
        assert_eq!(
            from_sql(&main, SqlValue::Integer(0)).unwrap(),
            Value::Boolean(false)
        );
    }
}
