use hashbrown::HashMap;

use crate::{model::UniqueKey, types::Id};

/// Unique constraint values of one table, mapped to the owning row.
pub type UniqueIndex = HashMap<UniqueKey, Id>;

/// First key in `keys` already held by a row other than `id`.
pub fn conflict(index: &UniqueIndex, id: Id, keys: &[UniqueKey]) -> Option<(UniqueKey, Id)> {
    keys.iter().find_map(|key| match index.get(key) {
        Some(owner) if *owner != id => Some((key.clone(), *owner)),
        _ => None,
    })
}
