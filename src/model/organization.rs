use crate::{
    column::{Column, ColumnError, ColumnType, Value},
    types::{EntityKind, Id},
};

use super::{EntityRow, Record, UniqueKey, short_description, take, unknown_column};

const COLUMNS: &[Column] = &[
    Column::required("id", ColumnType::Integer),
    Column::required("name", ColumnType::Text).max_len(50),
    Column::required("code", ColumnType::Text).max_len(4),
    Column::optional("description", ColumnType::Text),
];

/// Club or national organization entering gliders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    /// Primary key.
    pub id: Id,
    /// Unique display name.
    pub name: String,
    /// Unique short code.
    pub code: String,
    /// Free notes.
    pub description: Option<String>,
}

impl Organization {
    /// Description shortened to `length` characters.
    pub fn short_description(&self, length: usize) -> Option<String> {
        short_description(self.description.as_deref(), length)
    }
}

impl Record for Organization {
    const KIND: EntityKind = EntityKind::Organization;

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn get(&self, column: &str) -> Option<Value> {
        let value: Value = match column {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "code" => self.code.as_str().into(),
            "description" => self.description.clone().into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, column: &str, value: Value) -> Result<(), ColumnError> {
        match column {
            "id" => self.id = take(column, value)?,
            "name" => self.name = take(column, value)?,
            "code" => self.code = take(column, value)?,
            "description" => self.description = take(column, value)?,
            _ => return Err(unknown_column(Self::KIND, column)),
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::new("uq_organization_name", &[self.name.as_str().into()]),
            UniqueKey::new("uq_organization_code", &[self.code.as_str().into()]),
        ]
    }

    fn into_row(self) -> EntityRow {
        EntityRow::Organization(self)
    }

    fn from_row(row: EntityRow) -> Option<Self> {
        match row {
            EntityRow::Organization(r) => Some(r),
            _ => None,
        }
    }
}
