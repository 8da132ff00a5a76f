use thiserror::Error;

use crate::{
    archive::ArchiveError, column::ColumnError, config::ConfigError, core::store::StoreError,
    persist::PersistError, photos::PhotoError,
};

/// Any failure of the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Text does not convert to a column value.
    #[error(transparent)]
    Column(#[from] ColumnError),
    /// A mutation broke an integrity rule.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Database failure.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Photo store failure.
    #[error(transparent)]
    Photo(#[from] PhotoError),
    /// Archive failure.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Result alias using the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
