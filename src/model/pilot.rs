use crate::{
    column::{Column, ColumnError, ColumnType, Value},
    types::{EntityKind, Id},
};

use super::{EntityRow, Record, UniqueKey, short_description, take, unknown_column};

const COLUMNS: &[Column] = &[
    Column::required("id", ColumnType::Integer),
    Column::optional("degree", ColumnType::Text).max_len(15),
    Column::required("firstname", ColumnType::Text).max_len(24),
    Column::required("surname", ColumnType::Text).max_len(35),
    Column::optional("year_of_birth", ColumnType::Integer),
    Column::optional("sex", ColumnType::Text).max_len(1),
    Column::optional("description", ColumnType::Text),
];

/// A competing pilot.
///
/// Identity is the whole of surname, first name, degree, year of birth and
/// sex; two pilots sharing only a name are distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pilot {
    /// Primary key.
    pub id: Id,
    /// Academic degree written before the name.
    pub degree: Option<String>,
    /// First name.
    pub firstname: String,
    /// Surname.
    pub surname: String,
    /// Year of birth.
    pub year_of_birth: Option<i32>,
    /// Single letter sex marker.
    pub sex: Option<String>,
    /// Free notes.
    pub description: Option<String>,
}

impl Pilot {
    /// `Degree Firstname Surname`.
    pub fn fullname(&self) -> String {
        let name = format!("{} {}", self.firstname, self.surname);
        match &self.degree {
            Some(degree) => format!("{degree} {name}"),
            None => name,
        }
    }

    /// `Surname Firstname Degree`, the order used in pick lists.
    pub fn fullname_rev(&self) -> String {
        let name = format!("{} {}", self.surname, self.firstname);
        match &self.degree {
            Some(degree) => format!("{name} {degree}"),
            None => name,
        }
    }

    /// Description shortened to `length` characters.
    pub fn short_description(&self, length: usize) -> Option<String> {
        short_description(self.description.as_deref(), length)
    }
}

impl Record for Pilot {
    const KIND: EntityKind = EntityKind::Pilot;

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
            "degree" => self.degree.clone().into(),
            "firstname" => self.firstname.as_str().into(),
            "surname" => self.surname.as_str().into(),
            "year_of_birth" => self.year_of_birth.into(),
            "sex" => self.sex.clone().into(),
            "description" => self.description.clone().into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, column: &str, value: Value) -> Result<(), ColumnError> {
        match column {
            "id" => self.id = take(column, value)?,
            "degree" => self.degree = take(column, value)?,
            "firstname" => self.firstname = take(column, value)?,
            "surname" => self.surname = take(column, value)?,
            "year_of_birth" => self.year_of_birth = take(column, value)?,
            "sex" => self.sex = take(column, value)?,
            "description" => self.description = take(column, value)?,
            _ => return Err(unknown_column(Self::KIND, column)),
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "uq_pilot_name",
            &[
                self.surname.as_str().into(),
                self.firstname.as_str().into(),
                self.degree.clone().into(),
                self.year_of_birth.into(),
                self.sex.clone().into(),
            ],
        )]
    }

    fn into_row(self) -> EntityRow {
        EntityRow::Pilot(self)
    }

    fn from_row(row: EntityRow) -> Option<Self> {
        match row {
            EntityRow::Pilot(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullname_places_degree_by_order() {
        let pilot = Pilot {
            degree: Some("Ing.".to_string()),
            firstname: "Jan".to_string(),
            surname: "Novak".to_string(),
            ..Pilot::default()
        };
        assert_eq!(pilot.fullname(), "Ing. Jan Novak");
        assert_eq!(pilot.fullname_rev(), "Novak Jan Ing.");
    }
}
