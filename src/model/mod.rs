//! Persisted record types and the column access shared by all of them.

mod daily_weight;
mod glider_card;
mod glider_type;
mod organization;
mod photo;
mod pilot;

pub use daily_weight::DailyWeight;
pub use glider_card::GliderCard;
pub(crate) use glider_card::MEASURED_WEIGHT_COLUMNS;
pub use glider_type::GliderType;
pub use organization::Organization;
pub use photo::Photo;
pub use pilot::Pilot;

use std::fmt;

use crate::{
    column::{self, Column, ColumnError, FromValue, TextMode, Value},
    types::{EntityKind, Id},
};

/// One value of a unique constraint, as stored in the store's unique index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    /// Constraint name, e.g. `uq_glider_card_registration`.
    pub constraint: &'static str,
    /// Values of the constrained columns, in constraint order.
    pub key: Vec<Value>,
}

impl UniqueKey {
    /// Builds a key over `values`. Absent values take part in the key, so two
    /// rows that differ only by both lacking a value still collide.
    pub fn new(constraint: &'static str, values: &[Value]) -> Self {
        Self {
            constraint,
            key: values.to_vec(),
        }
    }
}

/// A foreign key held by a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Referencing column.
    pub column: &'static str,
    /// Referenced record type.
    pub kind: EntityKind,
    /// Referenced primary key.
    pub id: Id,
}

/// Column-addressable record.
///
/// Implementors publish a static column table plus typed `get`/`set` by
/// column name; text conversion is provided on top of those for every type.
pub trait Record: Clone + Default + fmt::Debug + PartialEq + 'static {
    /// Record type.
    const KIND: EntityKind;

    /// Column descriptors, primary key first.
    fn columns() -> &'static [Column];

    /// Primary key.
    fn id(&self) -> Id;

    /// Replaces the primary key.
    fn set_id(&mut self, id: Id);

    /// Reads a column as a typed value, `None` for an unknown column.
    fn get(&self, column: &str) -> Option<Value>;

    /// Assigns a typed value to a column.
    fn set(&mut self, column: &str, value: Value) -> Result<(), ColumnError>;

    /// Values of every unique constraint of the row.
    fn unique_keys(&self) -> Vec<UniqueKey>;

    /// Foreign keys held by the row.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Wraps the record into an [`EntityRow`].
    fn into_row(self) -> EntityRow;

    /// Unwraps an [`EntityRow`] of this type.
    fn from_row(row: EntityRow) -> Option<Self>;

    /// Looks up a column descriptor by name.
    fn column(name: &str) -> Result<&'static Column, ColumnError> {
        Self::columns()
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| unknown_column(Self::KIND, name))
    }

    /// Renders a column as text.
    fn column_as_str(&self, column: &str, mode: TextMode) -> Result<String, ColumnError> {
        let value = self
            .get(column)
            .ok_or_else(|| unknown_column(Self::KIND, column))?;
        Ok(column::render(&value, mode))
    }

    /// Checks that every required column carries a value. Empty text counts
    /// as absent.
    fn validate(&self) -> Result<(), ColumnError> {
        for column in Self::columns().iter().filter(|c| c.required) {
            let absent = match self.get(column.name) {
                None | Some(Value::Null) => true,
                Some(Value::Text(text)) => text.is_empty(),
                Some(_) => false,
            };
            if absent {
                return Err(ColumnError::Required {
                    column: column.name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Parses `text` and stores it in a column.
    fn str_to_column(&mut self, column: &str, text: &str, mode: TextMode) -> Result<(), ColumnError> {
        let descriptor = Self::column(column)?;
        let value = column::parse(descriptor, text, mode)?;
        self.set(column, value)
    }
}

pub(crate) fn unknown_column(kind: EntityKind, column: &str) -> ColumnError {
    ColumnError::UnknownColumn {
        table: kind.table_name(),
        column: column.to_string(),
    }
}

pub(crate) fn take<T: FromValue>(column: &str, value: Value) -> Result<T, ColumnError> {
    T::from_value(column, value)
}

/// Shortens a description for list display: up to three characters are kept
/// as is, longer text is cut to `length` characters ending in `...`.
pub fn short_description(description: Option<&str>, length: usize) -> Option<String> {
    let description = description?;
    let count = description.chars().count();
    if count <= 3 {
        return Some(description.to_string());
    }
    if length <= 3 {
        return Some("...".to_string());
    }
    if count > length {
        let head: String = description.chars().take(length - 3).collect();
        return Some(format!("{head}..."));
    }
    Some(description.to_string())
}

/// A row of any record type.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRow {
    /// Organization row.
    Organization(Organization),
    /// Pilot row.
    Pilot(Pilot),
    /// Glider type row.
    GliderType(GliderType),
    /// Glider card row.
    GliderCard(GliderCard),
    /// Photo row.
    Photo(Photo),
    /// Daily weight row.
    DailyWeight(DailyWeight),
}

macro_rules! with_row {
    ($row:expr, $rec:ident => $body:expr) => {
        match $row {
            EntityRow::Organization($rec) => $body,
            EntityRow::Pilot($rec) => $body,
            EntityRow::GliderType($rec) => $body,
            EntityRow::GliderCard($rec) => $body,
            EntityRow::Photo($rec) => $body,
            EntityRow::DailyWeight($rec) => $body,
        }
    };
}

impl EntityRow {
    /// An all-default row of `kind`, used as the starting point when a row is
    /// rebuilt column by column.
    pub fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Organization => Organization::default().into_row(),
            EntityKind::Pilot => Pilot::default().into_row(),
            EntityKind::GliderType => GliderType::default().into_row(),
            EntityKind::GliderCard => GliderCard::default().into_row(),
            EntityKind::Photo => Photo::default().into_row(),
            EntityKind::DailyWeight => DailyWeight::default().into_row(),
        }
    }

    /// Record type of the row.
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRow::Organization(_) => EntityKind::Organization,
            EntityRow::Pilot(_) => EntityKind::Pilot,
            EntityRow::GliderType(_) => EntityKind::GliderType,
            EntityRow::GliderCard(_) => EntityKind::GliderCard,
            EntityRow::Photo(_) => EntityKind::Photo,
            EntityRow::DailyWeight(_) => EntityKind::DailyWeight,
        }
    }

    /// Primary key of the row.
    pub fn id(&self) -> Id {
        with_row!(self, r => r.id())
    }

    /// Column descriptors of the row's type.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            EntityRow::Organization(_) => Organization::columns(),
            EntityRow::Pilot(_) => Pilot::columns(),
            EntityRow::GliderType(_) => GliderType::columns(),
            EntityRow::GliderCard(_) => GliderCard::columns(),
            EntityRow::Photo(_) => Photo::columns(),
            EntityRow::DailyWeight(_) => DailyWeight::columns(),
        }
    }

    /// Reads a typed column value.
    pub fn get(&self, column: &str) -> Option<Value> {
        with_row!(self, r => r.get(column))
    }

    /// Assigns a typed column value.
    pub fn set(&mut self, column: &str, value: Value) -> Result<(), ColumnError> {
        with_row!(self, r => r.set(column, value))
    }

    /// Renders a column as text.
    pub fn column_as_str(&self, column: &str, mode: TextMode) -> Result<String, ColumnError> {
        with_row!(self, r => r.column_as_str(column, mode))
    }

    /// Parses text into a column.
    pub fn str_to_column(&mut self, column: &str, text: &str, mode: TextMode) -> Result<(), ColumnError> {
        with_row!(self, r => r.str_to_column(column, text, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_description_truncates_like_list_display() {
        assert_eq!(short_description(None, 50), None);
        assert_eq!(short_description(Some("abc"), 2).as_deref(), Some("abc"));
        assert_eq!(short_description(Some("abcdef"), 3).as_deref(), Some("..."));
        assert_eq!(short_description(Some("abcdefgh"), 6).as_deref(), Some("abc..."));
        assert_eq!(short_description(Some("abcdef"), 10).as_deref(), Some("abcdef"));
    }

    #[test]
    fn empty_row_has_requested_kind() {
        for kind in EntityKind::ORDERED {
            assert_eq!(EntityRow::empty(kind).kind(), kind);
        }
    }
}
