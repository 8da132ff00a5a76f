//! Full-dataset export and import as one zip archive.
//!
//! The archive holds [`DOCUMENT_NAME`], a JSON [`ArchiveDocument`] with the
//! manifest, the handicap parameters and every row as neutral text, plus one
//! `<md5>.jpg` entry per stored photo.

mod document;
mod export;
mod import;

pub use document::{ArchiveDocument, Manifest, ModelBlock};
pub use export::{ExportSummary, export, export_to_writer};
pub use import::{ImportSummary, import, import_from_reader};

use thiserror::Error;

use crate::{
    column::ColumnError, config::ConfigError, core::store::StoreError, persist::PersistError,
    photos::PhotoError, types::EntityKind,
};

/// Name of the document entry inside the archive.
pub const DOCUMENT_NAME: &str = "glidercheck.json";

/// Schema version written to the manifest. Archives with another major
/// version are rejected.
pub const SCHEMA_VERSION: (u32, u32) = (1, 0);

/// Archive failures.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The file could not be read or written.
    #[error("archive IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The container is not a readable zip file.
    #[error("invalid archive container: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// The document is not valid JSON of the expected shape.
    #[error("invalid archive document: {0}")]
    Json(#[from] serde_json::Error),
    /// The container holds no document.
    #[error("archive has no glidercheck.json")]
    MissingDocument,
    /// The document has no manifest.
    #[error("archive document has no manifest")]
    MissingManifest,
    /// The manifest cannot be interpreted.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
    /// The archive was written by an incompatible schema.
    #[error("unsupported archive version {0}")]
    UnsupportedVersion(String),
    /// A block names an unknown record type.
    #[error("unknown record type '{0}'")]
    UnknownType(String),
    /// A block's table name does not belong to its record type.
    #[error("record type '{type_name}' does not use table '{table}'")]
    TableMismatch {
        /// Record type name.
        type_name: String,
        /// Table name given by the block.
        table: String,
    },
    /// A column could not be rendered.
    #[error(transparent)]
    Column(#[from] ColumnError),
    /// A row's text could not be converted.
    #[error("{kind} row {index}: {source}")]
    RowFormat {
        /// Record type.
        kind: EntityKind,
        /// Position of the row in its block.
        index: usize,
        /// Conversion failure.
        source: ColumnError,
    },
    /// A row was rejected by the integrity rules.
    #[error("{kind} row {index}: {source}")]
    RowRejected {
        /// Record type.
        kind: EntityKind,
        /// Position of the row in its block.
        index: usize,
        /// Integrity failure.
        source: StoreError,
    },
    /// The imported parameters were invalid or could not be saved.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The imported rows could not be committed.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// A photo could not be read or stored.
    #[error(transparent)]
    Photo(#[from] PhotoError),
}
