//! Unit of work over the store and its persistence sink.

use std::path::Path;

use tracing::debug;

use crate::{
    core::store::Store,
    persist::{PersistResult, RowSink, sqlite::SqliteSink},
};

/// Owns the authoritative [`Store`] and the sink committed changes go to.
///
/// Mutations are made through [`Session::store_mut`] and stay pending until
/// [`Session::commit`] writes them out or [`Session::rollback`] reverts them.
pub struct Session {
    store: Store,
    sink: Option<Box<dyn RowSink>>,
}

impl Session {
    /// Wraps an existing store. Without a sink, commits only clear the
    /// pending log.
    pub fn new(store: Store, sink: Option<Box<dyn RowSink>>) -> Self {
        Self { store, sink }
    }

    /// Opens the database at `path`, creating it if absent, and loads it.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let sink = SqliteSink::open(path)?;
        let store = sink.load_store()?;
        Ok(Self::new(store, Some(Box::new(sink))))
    }

    /// Session over an empty in-memory database.
    pub fn in_memory() -> PersistResult<Self> {
        let sink = SqliteSink::open_in_memory()?;
        Ok(Self::new(Store::new(), Some(Box::new(sink))))
    }

    /// Read access to the store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Write access to the store.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Whether there are uncommitted changes.
    pub fn has_pending(&self) -> bool {
        self.store.has_pending()
    }

    /// Persists every pending change as one unit and returns how many
    /// mutations were written. On failure the changes stay pending.
    pub fn commit(&mut self) -> PersistResult<usize> {
        let count = self.store.pending_ops().len();
        if count == 0 {
            return Ok(0);
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.apply_ops(self.store.pending_ops())?;
            sink.flush()?;
        }
        self.store.mark_committed();
        debug!(ops = count, "session committed");
        Ok(count)
    }

    /// Reverts every pending change.
    pub fn rollback(&mut self) {
        let count = self.store.pending_ops().len();
        self.store.rollback();
        if count > 0 {
            debug!(ops = count, "session rolled back");
        }
    }
}
