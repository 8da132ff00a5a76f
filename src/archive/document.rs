//! Serialized shape of the archive document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    column::TextMode,
    config::Configuration,
    core::store::Store,
    types::EntityKind,
};

use super::{ArchiveError, SCHEMA_VERSION};

/// Export metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Export time, neutral date-time text.
    pub date: String,
    /// Schema version, `major.minor`.
    pub version: String,
}

impl Manifest {
    /// Checks that the document was written by a compatible schema.
    pub fn check_version(&self) -> Result<(), ArchiveError> {
        let invalid = || ArchiveError::InvalidManifest(format!("bad version '{}'", self.version));
        let (major, minor) = self.version.split_once('.').ok_or_else(invalid)?;
        let major: u32 = major.trim().parse().map_err(|_| invalid())?;
        let _minor: u32 = minor.trim().parse().map_err(|_| invalid())?;
        if major != SCHEMA_VERSION.0 {
            return Err(ArchiveError::UnsupportedVersion(self.version.clone()));
        }
        Ok(())
    }
}

/// Rows of one record type, every column as neutral text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBlock {
    /// Table name.
    pub name: String,
    /// Record type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// One map per row, column name to text.
    #[serde(default)]
    pub rows: Vec<IndexMap<String, String>>,
}

impl ModelBlock {
    /// Record type of the block.
    pub fn kind(&self) -> Result<EntityKind, ArchiveError> {
        let kind = EntityKind::from_type_name(&self.type_name)
            .ok_or_else(|| ArchiveError::UnknownType(self.type_name.clone()))?;
        if kind.table_name() != self.name {
            return Err(ArchiveError::TableMismatch {
                type_name: self.type_name.clone(),
                table: self.name.clone(),
            });
        }
        Ok(kind)
    }
}

/// The whole dataset as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDocument {
    /// Export metadata; required on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Manifest>,
    /// Handicap parameters by key name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<IndexMap<String, String>>,
    /// One block per record type.
    #[serde(default)]
    pub models: Vec<ModelBlock>,
}

impl ArchiveDocument {
    /// Captures every row of `store` and every parameter of `config`.
    pub fn capture(store: &Store, config: &Configuration, date: String) -> Result<Self, ArchiveError> {
        let preferences = config
            .entries()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();

        let mut models = Vec::with_capacity(EntityKind::ORDERED.len());
        for kind in EntityKind::ORDERED {
            let mut rows = Vec::with_capacity(store.len(kind));
            for row in store.rows(kind) {
                let mut cells = IndexMap::new();
                for column in row.columns() {
                    cells.insert(
                        column.name.to_string(),
                        row.column_as_str(column.name, TextMode::Neutral)?,
                    );
                }
                rows.push(cells);
            }
            models.push(ModelBlock {
                name: kind.table_name().to_string(),
                type_name: kind.type_name().to_string(),
                rows,
            });
        }

        Ok(Self {
            manifest: Some(Manifest {
                date,
                version: format!("{}.{}", SCHEMA_VERSION.0, SCHEMA_VERSION.1),
            }),
            preferences: Some(preferences),
            models,
        })
    }
}
