use crate::{
    column::{Column, ColumnError, ColumnType, Value},
    types::{EntityKind, Id},
};

use super::{EntityRow, Record, Reference, UniqueKey, take, unknown_column};

const COLUMNS: &[Column] = &[
    Column::required("id", ColumnType::Integer),
    Column::required("glider_card_id", ColumnType::Integer),
    Column::required("md5", ColumnType::Text).max_len(32),
    Column::required("main", ColumnType::Boolean),
];

/// Content-addressed glider photo.
///
/// Only the hash is stored; the file lives in the photo store under
/// [`Photo::file_name`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Photo {
    /// Primary key.
    pub id: Id,
    /// Owning glider card.
    pub glider_card_id: Id,
    /// Lowercase hex MD5 of the photo bytes.
    pub md5: String,
    /// Shown first for the card.
    pub main: bool,
}

impl Photo {
    /// Name of the photo file, `<md5>.jpg`.
    pub fn file_name(&self) -> String {
        format!("{}.jpg", self.md5)
    }
}

impl Record for Photo {
    const KIND: EntityKind = EntityKind::Photo;

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
            "glider_card_id" => self.glider_card_id.into(),
            "md5" => self.md5.as_str().into(),
            "main" => self.main.into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, column: &str, value: Value) -> Result<(), ColumnError> {
        match column {
            "id" => self.id = take(column, value)?,
            "glider_card_id" => self.glider_card_id = take(column, value)?,
            "md5" => self.md5 = take(column, value)?,
            "main" => self.main = take(column, value)?,
            _ => return Err(unknown_column(Self::KIND, column)),
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("uq_photo_md5", &[self.md5.as_str().into()])]
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference {
            column: "glider_card_id",
            kind: EntityKind::GliderCard,
            id: self.glider_card_id,
        }]
    }

    fn into_row(self) -> EntityRow {
        EntityRow::Photo(self)
    }

    fn from_row(row: EntityRow) -> Option<Self> {
        match row {
            EntityRow::Photo(r) => Some(r),
            _ => None,
        }
    }
}
