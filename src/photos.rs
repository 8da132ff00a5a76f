//! Content-addressed photo directory.
//!
//! Photos are stored flat as `{dir}/{md5}.jpg`; the database only keeps the
//! hash, so the path is always derived.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use thiserror::Error;
use tracing::debug;

/// Photo store failures.
#[derive(Debug, Error)]
pub enum PhotoError {
    /// No file for the hash.
    #[error("photo not found: {0}")]
    NotFound(String),
    /// The hash text is not a valid photo hash.
    #[error("invalid photo hash: {0}")]
    InvalidHash(String),
    /// File system failure.
    #[error("photo storage IO error: {0}")]
    Io(#[from] io::Error),
}

/// A validated MD5 content hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Hash of `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self(Md5::digest(data).into())
    }

    /// Parses 32 hex characters, either case.
    pub fn from_hex(s: &str) -> Result<Self, PhotoError> {
        if s.len() != 32 {
            return Err(PhotoError::InvalidHash(format!(
                "expected 32 hex characters, got {}",
                s.len()
            )));
        }
        let bytes = hex::decode(s).map_err(|e| PhotoError::InvalidHash(format!("invalid hex: {e}")))?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| PhotoError::InvalidHash("decoded to wrong length".into()))?;
        Ok(Self(arr))
    }

    /// Lowercase hex form, as stored in the `md5` column.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Photo file name, `<md5>.jpg`.
    pub fn file_name(&self) -> String {
        format!("{}.jpg", self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash named by a photo file name, if it follows the `<32 alphanumerics>.jpg`
/// pattern, compared case-insensitively.
pub fn hash_from_file_name(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if !ext.eq_ignore_ascii_case("jpg") || !is_hash_stem(stem) {
        return None;
    }
    Some(stem.to_ascii_lowercase())
}

fn is_hash_stem(stem: &str) -> bool {
    stem.len() == 32 && stem.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Directory of photo files keyed by content hash.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// Opens `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PhotoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Photo directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for `md5`.
    pub fn path(&self, md5: &str) -> PathBuf {
        self.dir.join(format!("{}.jpg", md5.to_ascii_lowercase()))
    }

    /// Whether a file exists for `md5`.
    pub fn contains(&self, md5: &str) -> bool {
        self.path(md5).is_file()
    }

    /// Stores `data` under its hash and returns the hash. Storing the same
    /// bytes twice keeps one file.
    pub fn add(&self, data: &[u8]) -> Result<ContentHash, PhotoError> {
        let hash = ContentHash::compute(data);
        self.write_raw(&hash.to_hex(), data)?;
        Ok(hash)
    }

    /// Copies the file at `source` into the store.
    pub fn add_file(&self, source: impl AsRef<Path>) -> Result<ContentHash, PhotoError> {
        let data = fs::read(source)?;
        self.add(&data)
    }

    /// Writes `data` under `md5` without checking that it matches the bytes.
    pub fn write_raw(&self, md5: &str, data: &[u8]) -> Result<(), PhotoError> {
        if !is_hash_stem(md5) {
            return Err(PhotoError::InvalidHash(format!(
                "expected 32 alphanumeric characters, got '{md5}'"
            )));
        }
        let path = self.path(md5);
        if path.exists() {
            return Ok(());
        }

        let temp_path = self.dir.join(format!(".{}.tmp", md5.to_ascii_lowercase()));
        if let Err(e) = fs::write(&temp_path, data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        debug!(md5, bytes = data.len(), "stored photo");
        Ok(())
    }

    /// Bytes of the photo `md5`.
    pub fn read(&self, md5: &str) -> Result<Vec<u8>, PhotoError> {
        match fs::read(self.path(md5)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(PhotoError::NotFound(md5.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the photo `md5`. Returns whether a file was removed.
    pub fn remove(&self, md5: &str) -> Result<bool, PhotoError> {
        match fs::remove_file(self.path(md5)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes every photo file and returns how many were removed.
    pub fn clear(&self) -> Result<usize, PhotoError> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if hash_from_file_name(name).is_some() && entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_matches_known_digest() {
        assert_eq!(
            ContentHash::compute(b"").to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(ContentHash::from_hex("abc").is_err());
        assert!(ContentHash::from_hex(&"z".repeat(32)).is_err());
    }

    #[test]
    fn file_name_pattern_is_case_insensitive() {
        let upper = format!("{}.JPG", "A".repeat(32));
        assert_eq!(hash_from_file_name(&upper), Some("a".repeat(32)));
        assert_eq!(hash_from_file_name("glidercheck.json"), None);
        assert_eq!(hash_from_file_name(&format!("{}.jpg", "a".repeat(31))), None);
    }
}
