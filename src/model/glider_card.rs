use crate::{
    column::{Column, ColumnError, ColumnType, Value},
    types::{EntityKind, Id},
};

use super::{EntityRow, Record, Reference, UniqueKey, short_description, take, unknown_column};

const COLUMNS: &[Column] = &[
    Column::required("id", ColumnType::Integer),
    Column::required("registration", ColumnType::Text).max_len(10),
    Column::required("competition_number", ColumnType::Text).max_len(5),
    Column::required("glider_type_id", ColumnType::Integer),
    Column::required("pilot_id", ColumnType::Integer),
    Column::required("organization_id", ColumnType::Integer),
    Column::required("landing_gear", ColumnType::Boolean),
    Column::required("winglets", ColumnType::Boolean),
    Column::optional("certified_weight_non_lifting", ColumnType::Integer),
    Column::optional("certified_empty_weight", ColumnType::Integer),
    Column::optional("certified_min_seat_weight", ColumnType::Integer),
    Column::optional("certified_max_seat_weight", ColumnType::Integer),
    Column::optional("glider_weight", ColumnType::Integer),
    Column::optional("pilot_weight", ColumnType::Integer),
    Column::optional("tow_bar_weight", ColumnType::Integer),
    Column::optional("description", ColumnType::Text),
];

/// Measured weights cleared by the clean operation.
pub(crate) const MEASURED_WEIGHT_COLUMNS: [&str; 3] =
    ["glider_weight", "pilot_weight", "tow_bar_weight"];

/// Per-glider competition record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GliderCard {
    /// Primary key.
    pub id: Id,
    /// Unique aircraft registration.
    pub registration: String,
    /// Unique competition number.
    pub competition_number: String,
    /// Handicap list entry.
    pub glider_type_id: Id,
    /// Pilot flying the glider; one card per pilot.
    pub pilot_id: Id,
    /// Entering organization.
    pub organization_id: Id,
    /// Retractable landing gear fitted.
    pub landing_gear: bool,
    /// Winglets fitted.
    pub winglets: bool,
    /// Certified weight of non-lifting parts, kg.
    pub certified_weight_non_lifting: Option<i32>,
    /// Certified empty weight, kg.
    pub certified_empty_weight: Option<i32>,
    /// Certified minimum seat load, kg.
    pub certified_min_seat_weight: Option<i32>,
    /// Certified maximum seat load, kg.
    pub certified_max_seat_weight: Option<i32>,
    /// Measured glider weight, kg.
    pub glider_weight: Option<i32>,
    /// Measured pilot weight with equipment, kg.
    pub pilot_weight: Option<i32>,
    /// Measured tow bar weight, kg.
    pub tow_bar_weight: Option<i32>,
    /// Free notes.
    pub description: Option<String>,
}

impl GliderCard {
    /// Description shortened to `length` characters.
    pub fn short_description(&self, length: usize) -> Option<String> {
        short_description(self.description.as_deref(), length)
    }
}

impl Record for GliderCard {
    const KIND: EntityKind = EntityKind::GliderCard;

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
            "registration" => self.registration.as_str().into(),
            "competition_number" => self.competition_number.as_str().into(),
            "glider_type_id" => self.glider_type_id.into(),
            "pilot_id" => self.pilot_id.into(),
            "organization_id" => self.organization_id.into(),
            "landing_gear" => self.landing_gear.into(),
            "winglets" => self.winglets.into(),
            "certified_weight_non_lifting" => self.certified_weight_non_lifting.into(),
            "certified_empty_weight" => self.certified_empty_weight.into(),
            "certified_min_seat_weight" => self.certified_min_seat_weight.into(),
            "certified_max_seat_weight" => self.certified_max_seat_weight.into(),
            "glider_weight" => self.glider_weight.into(),
            "pilot_weight" => self.pilot_weight.into(),
            "tow_bar_weight" => self.tow_bar_weight.into(),
            "description" => self.description.clone().into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, column: &str, value: Value) -> Result<(), ColumnError> {
        match column {
            "id" => self.id = take(column, value)?,
            "registration" => self.registration = take(column, value)?,
            "competition_number" => self.competition_number = take(column, value)?,
            "glider_type_id" => self.glider_type_id = take(column, value)?,
            "pilot_id" => self.pilot_id = take(column, value)?,
            "organization_id" => self.organization_id = take(column, value)?,
            "landing_gear" => self.landing_gear = take(column, value)?,
            "winglets" => self.winglets = take(column, value)?,
            "certified_weight_non_lifting" => {
                self.certified_weight_non_lifting = take(column, value)?
            }
            "certified_empty_weight" => self.certified_empty_weight = take(column, value)?,
            "certified_min_seat_weight" => self.certified_min_seat_weight = take(column, value)?,
            "certified_max_seat_weight" => self.certified_max_seat_weight = take(column, value)?,
            "glider_weight" => self.glider_weight = take(column, value)?,
            "pilot_weight" => self.pilot_weight = take(column, value)?,
            "tow_bar_weight" => self.tow_bar_weight = take(column, value)?,
            "description" => self.description = take(column, value)?,
            _ => return Err(unknown_column(Self::KIND, column)),
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::new(
                "uq_glider_card_registration",
                &[self.registration.as_str().into()],
            ),
            UniqueKey::new(
                "uq_glider_card_competition_number",
                &[self.competition_number.as_str().into()],
            ),
            UniqueKey::new("uq_glider_card_pilot", &[self.pilot_id.into()]),
        ]
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference {
                column: "glider_type_id",
                kind: EntityKind::GliderType,
                id: self.glider_type_id,
            },
            Reference {
                column: "pilot_id",
                kind: EntityKind::Pilot,
                id: self.pilot_id,
            },
            Reference {
                column: "organization_id",
                kind: EntityKind::Organization,
                id: self.organization_id,
            },
        ]
    }

    fn into_row(self) -> EntityRow {
        EntityRow::GliderCard(self)
    }

    fn from_row(row: EntityRow) -> Option<Self> {
        match row {
            EntityRow::GliderCard(r) => Some(r),
            _ => None,
        }
    }
}
