use std::io::{Cursor, Seek, Write};
use std::path::Path;

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use tracing::{info, warn};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    column::{self, TextMode, Value},
    config::Configuration,
    core::store::Store,
    model::Photo,
    photos::{PhotoError, PhotoStore},
};

use super::{ArchiveDocument, ArchiveError, DOCUMENT_NAME};

/// What an export wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Rows across every record type.
    pub rows: usize,
    /// Photo files packed.
    pub photos: usize,
    /// Photo rows whose file was missing from the photo store.
    pub missing_photos: usize,
}

/// Writes the whole dataset to the archive at `path`, replacing it
/// atomically.
pub fn export(
    store: &Store,
    config: &Configuration,
    photos: &PhotoStore,
    path: impl AsRef<Path>,
) -> Result<ExportSummary, ArchiveError> {
    let path = path.as_ref();
    let mut buffer = Cursor::new(Vec::new());
    let summary = export_to_writer(store, config, photos, &mut buffer)?;

    let mut file = AtomicWriteFile::open(path)?;
    file.write_all(buffer.get_ref())?;
    file.commit()?;

    info!(
        path = %path.display(),
        rows = summary.rows,
        photos = summary.photos,
        "exported archive"
    );
    Ok(summary)
}

/// Writes the archive to any seekable writer.
pub fn export_to_writer<W: Write + Seek>(
    store: &Store,
    config: &Configuration,
    photos: &PhotoStore,
    writer: W,
) -> Result<ExportSummary, ArchiveError> {
    let date = column::render(
        &Value::DateTime(Local::now().naive_local()),
        TextMode::Neutral,
    );
    let document = ArchiveDocument::capture(store, config, date)?;
    let rows = document.models.iter().map(|m| m.rows.len()).sum();

    let mut zip = ZipWriter::new(writer);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file(DOCUMENT_NAME, deflated)?;
    serde_json::to_writer_pretty(&mut zip, &document)?;

    let mut summary = ExportSummary {
        rows,
        ..ExportSummary::default()
    };
    for photo in store.all::<Photo>() {
        let data = match photos.read(&photo.md5) {
            Ok(data) => data,
            Err(PhotoError::NotFound(md5)) => {
                warn!(%md5, card = photo.glider_card_id, "photo file missing, not exported");
                summary.missing_photos += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        zip.start_file(photo.file_name(), stored)?;
        zip.write_all(&data)?;
        summary.photos += 1;
    }

    zip.finish()?;
    Ok(summary)
}
