//! Row mutations recorded by the store until the next commit.

use crate::{model::EntityRow, types::{EntityKind, Id}};

/// One applied row mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Insert or overwrite a row.
    Put {
        /// New row contents.
        row: EntityRow,
        /// Row previously stored under the same key, if any.
        prev: Option<EntityRow>,
    },
    /// Remove a row.
    Delete {
        /// Removed row contents.
        row: EntityRow,
    },
}

impl Op {
    /// Record type touched by the op.
    pub fn kind(&self) -> EntityKind {
        match self {
            Op::Put { row, .. } | Op::Delete { row } => row.kind(),
        }
    }

    /// Primary key touched by the op.
    pub fn id(&self) -> Id {
        match self {
            Op::Put { row, .. } | Op::Delete { row } => row.id(),
        }
    }

    /// The op that restores the state before `self` was applied.
    pub fn inverse(&self) -> Op {
        match self {
            Op::Put { row, prev: None } => Op::Delete { row: row.clone() },
            Op::Put {
                row,
                prev: Some(prev),
            } => Op::Put {
                row: prev.clone(),
                prev: Some(row.clone()),
            },
            Op::Delete { row } => Op::Put {
                row: row.clone(),
                prev: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Organization, Record};

    fn org(id: Id, name: &str) -> EntityRow {
        Organization {
            id,
            name: name.to_string(),
            code: "AK".to_string(),
            description: None,
        }
        .into_row()
    }

    #[test]
    fn inverse_of_overwrite_restores_previous_row() {
        let op = Op::Put {
            row: org(1, "new"),
            prev: Some(org(1, "old")),
        };
        assert_eq!(
            op.inverse(),
            Op::Put {
                row: org(1, "old"),
                prev: Some(org(1, "new")),
            }
        );
        assert_eq!(op.inverse().inverse(), op);
    }

    #[test]
    fn insert_and_delete_are_mutual_inverses() {
        let insert = Op::Put {
            row: org(2, "club"),
            prev: None,
        };
        assert_eq!(insert.inverse(), Op::Delete { row: org(2, "club") });
        assert_eq!(insert.inverse().inverse(), insert);
    }
}
