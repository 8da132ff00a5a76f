pub mod sqlite;

use thiserror::Error;

use crate::{column::ColumnError, op::Op};

/// Persistence failures.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The database rejected a statement.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored value could not be converted back into its column type.
    #[error("stored value does not convert: {0}")]
    Column(#[from] ColumnError),
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Destination for committed row mutations.
pub trait RowSink {
    /// Applies `ops` in order as one unit: either all of them are durable
    /// afterwards or none is.
    fn apply_ops(&mut self, ops: &[Op]) -> PersistResult<()>;

    /// Forces buffered writes to storage.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}
