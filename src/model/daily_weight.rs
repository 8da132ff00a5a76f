use chrono::NaiveDateTime;

use crate::{
    column::{Column, ColumnError, ColumnType, Value},
    types::{EntityKind, Id},
};

use super::{EntityRow, Record, Reference, UniqueKey, take, unknown_column};

const COLUMNS: &[Column] = &[
    Column::required("id", ColumnType::Integer),
    Column::required("glider_card_id", ColumnType::Integer),
    Column::required("date", ColumnType::DateTime),
    Column::required("tow_bar_weight", ColumnType::Integer),
];

/// Tow bar weight checked on a competition day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyWeight {
    /// Primary key.
    pub id: Id,
    /// Weighed glider card.
    pub glider_card_id: Id,
    /// Time of the weighing, whole seconds.
    pub date: NaiveDateTime,
    /// Measured tow bar weight, kg.
    pub tow_bar_weight: i32,
}

impl Record for DailyWeight {
    const KIND: EntityKind = EntityKind::DailyWeight;

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
            "date" => self.date.into(),
            "tow_bar_weight" => self.tow_bar_weight.into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, column: &str, value: Value) -> Result<(), ColumnError> {
        match column {
            "id" => self.id = take(column, value)?,
            "glider_card_id" => self.glider_card_id = take(column, value)?,
            "date" => self.date = take(column, value)?,
            "tow_bar_weight" => self.tow_bar_weight = take(column, value)?,
            _ => return Err(unknown_column(Self::KIND, column)),
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "uq_daily_weight_date",
            &[self.glider_card_id.into(), self.date.into()],
        )]
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference {
            column: "glider_card_id",
            kind: EntityKind::GliderCard,
            id: self.glider_card_id,
        }]
    }

    fn into_row(self) -> EntityRow {
        EntityRow::DailyWeight(self)
    }

    fn from_row(row: EntityRow) -> Option<Self> {
        match row {
            EntityRow::DailyWeight(r) => Some(r),
            _ => None,
        }
    }
}
