use rust_decimal::Decimal;

use crate::{
    column::{Column, ColumnError, ColumnType, Value},
    types::{EntityKind, Id},
};

use super::{EntityRow, Record, UniqueKey, short_description, take, unknown_column};

const COLUMNS: &[Column] = &[
    Column::required("id", ColumnType::Integer),
    Column::required("name", ColumnType::Text).max_len(50),
    Column::required("club_class", ColumnType::Boolean),
    Column::optional("coefficient", ColumnType::Decimal),
    Column::optional("weight_non_lifting", ColumnType::Integer),
    Column::optional("mtow_without_water", ColumnType::Integer),
    Column::optional("mtow", ColumnType::Integer),
    Column::optional("weight_referential", ColumnType::Integer),
    Column::optional("description", ColumnType::Text),
];

/// Entry of the IGC handicap list.
///
/// The weight fields and the coefficient only take part in compliance checks
/// when `club_class` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GliderType {
    /// Primary key.
    pub id: Id,
    /// Unique type name.
    pub name: String,
    /// Whether the type competes in the club class.
    pub club_class: bool,
    /// Base handicap coefficient.
    pub coefficient: Option<Decimal>,
    /// Listed weight of non-lifting parts, kg.
    pub weight_non_lifting: Option<i32>,
    /// Maximum takeoff weight without water ballast, kg.
    pub mtow_without_water: Option<i32>,
    /// Maximum takeoff weight, kg.
    pub mtow: Option<i32>,
    /// Referential weight the coefficient is computed against, kg.
    pub weight_referential: Option<i32>,
    /// Free notes.
    pub description: Option<String>,
}

impl GliderType {
    /// MTOW the measured weight is compared with: the dry figure when listed.
    pub fn mtow_reference(&self) -> Option<i32> {
        self.mtow_without_water.or(self.mtow)
    }

    /// `Club` for club class types, empty otherwise.
    pub fn club_class_label(&self) -> &'static str {
        if self.club_class { "Club" } else { "" }
    }

    /// Description shortened to `length` characters.
    pub fn short_description(&self, length: usize) -> Option<String> {
        short_description(self.description.as_deref(), length)
    }
}

impl Record for GliderType {
    const KIND: EntityKind = EntityKind::GliderType;

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
            "club_class" => self.club_class.into(),
            "coefficient" => self.coefficient.into(),
            "weight_non_lifting" => self.weight_non_lifting.into(),
            "mtow_without_water" => self.mtow_without_water.into(),
            "mtow" => self.mtow.into(),
            "weight_referential" => self.weight_referential.into(),
            "description" => self.description.clone().into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, column: &str, value: Value) -> Result<(), ColumnError> {
        match column {
            "id" => self.id = take(column, value)?,
            "name" => self.name = take(column, value)?,
            "club_class" => self.club_class = take(column, value)?,
            "coefficient" => self.coefficient = take(column, value)?,
            "weight_non_lifting" => self.weight_non_lifting = take(column, value)?,
            "mtow_without_water" => self.mtow_without_water = take(column, value)?,
            "mtow" => self.mtow = take(column, value)?,
            "weight_referential" => self.weight_referential = take(column, value)?,
            "description" => self.description = take(column, value)?,
            _ => return Err(unknown_column(Self::KIND, column)),
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("uq_glider_type_name", &[self.name.as_str().into()])]
    }

    fn into_row(self) -> EntityRow {
        EntityRow::GliderType(self)
    }

    fn from_row(row: EntityRow) -> Option<Self> {
        match row {
            EntityRow::GliderType(r) => Some(r),
            _ => None,
        }
    }
}
