use std::collections::BTreeMap;

use crate::{
    model::{Record, UniqueKey},
    types::Id,
};

use super::indices::{self, UniqueIndex};

/// Rows of one record type, ordered by primary key, with their unique index.
#[derive(Debug)]
pub struct Table<T> {
    rows: BTreeMap<Id, T>,
    unique: UniqueIndex,
    next_id: Id,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            unique: UniqueIndex::new(),
            next_id: 1,
        }
    }
}

impl<T: Record> Table<T> {
    /// Row stored under `id`.
    pub fn get(&self, id: Id) -> Option<&T> {
        self.rows.get(&id)
    }

    /// Whether a row is stored under `id`.
    pub fn contains(&self, id: Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// Rows in primary key order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn allocate_id(&mut self) -> Id {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn conflict(&self, rec: &T) -> Option<(UniqueKey, Id)> {
        indices::conflict(&self.unique, rec.id(), &rec.unique_keys())
    }

    /// Stores `rec` without any checks, returning the row it replaced.
    pub(crate) fn put_raw(&mut self, rec: T) -> Option<T> {
        let id = rec.id();
        let prev = self.remove_raw(id);
        for key in rec.unique_keys() {
            self.unique.insert(key, id);
        }
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.rows.insert(id, rec);
        prev
    }

    pub(crate) fn remove_raw(&mut self, id: Id) -> Option<T> {
        let rec = self.rows.remove(&id)?;
        for key in rec.unique_keys() {
            if self.unique.get(&key) == Some(&id) {
                self.unique.remove(&key);
            }
        }
        Some(rec)
    }
}
