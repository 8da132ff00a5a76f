use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::{
    column::{ColumnError, TextMode},
    config::{ConfigKey, Configuration},
    model::EntityRow,
    photos::{PhotoStore, hash_from_file_name},
    session::Session,
    types::EntityKind,
};

use super::{ArchiveDocument, ArchiveError, DOCUMENT_NAME, ModelBlock};

/// What an import applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Handicap parameters taken from the archive.
    pub preferences: usize,
    /// Rows merged into the store.
    pub rows: usize,
    /// Photo files copied into the photo store.
    pub photos: usize,
    /// Entries that are neither the document nor a photo.
    pub ignored_entries: usize,
}

/// Imports the archive at `path`.
///
/// The parameters found in the archive are applied and saved first; if any
/// is invalid, the configuration returns to its previous values and the
/// error is returned. Rows are then merged by primary key in dependency order
/// and committed once. A rejected row stops the import and leaves the rows
/// merged before it pending in `session`, for the caller to commit or roll
/// back. Photos are copied last.
pub fn import(
    session: &mut Session,
    config: &mut Configuration,
    photos: &PhotoStore,
    path: impl AsRef<Path>,
) -> Result<ImportSummary, ArchiveError> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);
    let summary = import_from_reader(session, config, photos, file)?;
    info!(
        path = %path.display(),
        rows = summary.rows,
        photos = summary.photos,
        preferences = summary.preferences,
        "imported archive"
    );
    Ok(summary)
}

/// [`import`] from any seekable reader.
pub fn import_from_reader<R: Read + Seek>(
    session: &mut Session,
    config: &mut Configuration,
    photos: &PhotoStore,
    reader: R,
) -> Result<ImportSummary, ArchiveError> {
    let mut zip = ZipArchive::new(reader)?;
    let document = read_document(&mut zip)?;

    document
        .manifest
        .as_ref()
        .ok_or(ArchiveError::MissingManifest)?
        .check_version()?;

    let mut blocks = document
        .models
        .iter()
        .map(|block| block.kind().map(|kind| (kind, block)))
        .collect::<Result<Vec<_>, _>>()?;
    blocks.sort_by_key(|(kind, _)| EntityKind::ORDERED.iter().position(|k| k == kind));

    let mut summary = ImportSummary::default();
    if let Some(preferences) = &document.preferences {
        summary.preferences = apply_preferences(config, preferences)?;
    }

    for (kind, block) in blocks {
        summary.rows += replay_block(session, kind, block)?;
    }
    session.commit()?;

    for idx in 0..zip.len() {
        let mut entry = zip.by_index(idx)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if name == DOCUMENT_NAME {
            continue;
        }
        let Some(md5) = hash_from_file_name(&name) else {
            debug!(entry = %name, "ignoring archive entry");
            summary.ignored_entries += 1;
            continue;
        };
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        photos.write_raw(&md5, &data)?;
        summary.photos += 1;
    }

    Ok(summary)
}

fn read_document<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<ArchiveDocument, ArchiveError> {
    let mut entry = match zip.by_name(DOCUMENT_NAME) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Err(ArchiveError::MissingDocument),
        Err(e) => return Err(e.into()),
    };
    let mut text = String::new();
    entry.read_to_string(&mut text)?;
    Ok(serde_json::from_str(&text)?)
}

fn apply_preferences(
    config: &mut Configuration,
    preferences: &indexmap::IndexMap<String, String>,
) -> Result<usize, ArchiveError> {
    let snapshot = config.snapshot();
    let applied = (|| {
        let mut applied = 0;
        for (name, text) in preferences {
            if text.is_empty() {
                continue;
            }
            let Ok(key) = name.parse::<ConfigKey>() else {
                warn!(key = %name, "ignoring unknown preference in archive");
                continue;
            };
            config.set(key, text)?;
            applied += 1;
        }
        config.save()?;
        Ok::<_, ArchiveError>(applied)
    })();

    if applied.is_err() {
        config.restore(snapshot);
    }
    applied
}

fn replay_block(session: &mut Session, kind: EntityKind, block: &ModelBlock) -> Result<usize, ArchiveError> {
    for (index, cells) in block.rows.iter().enumerate() {
        let mut row = EntityRow::empty(kind);
        for (column, text) in cells {
            if text.is_empty() {
                continue;
            }
            row.str_to_column(column, text, TextMode::Neutral)
                .map_err(|source| ArchiveError::RowFormat { kind, index, source })?;
        }
        let unfilled = row
            .columns()
            .iter()
            .find(|c| c.required && cells.get(c.name).is_none_or(|text| text.is_empty()));
        if let Some(column) = unfilled {
            let source = ColumnError::Required {
                column: column.name.to_string(),
            };
            return Err(ArchiveError::RowFormat { kind, index, source });
        }
        let id = row.id();
        session
            .store_mut()
            .merge_row(row)
            .map_err(|source| ArchiveError::RowRejected { kind, index, source })?;
        debug!(%kind, id, "merged archive row");
    }
    Ok(block.rows.len())
}
