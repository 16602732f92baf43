//! On-disk memo of encoded symbols.
//!
//! Each entry is the `'0'`/`'1'` text form of a symbol stored under a key
//! derived from the payload and every encode option. The key is a 64-bit
//! `FxHasher` digest, which is not collision resistant, so the first line of
//! each entry records the full payload and options and a mismatch on load is
//! a miss. A hit is always the symbol the same request would produce.
//! Random mask selection is not
//! reproducible; a cached symbol for such a request is simply one of the
//! valid outcomes.

use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use rustc_hash::{FxHashMap as HashMap, FxHasher};
use thiserror::Error;

use crate::encoder::{EncodeOptions, QrCode};
use crate::error::QrError;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Encode(#[from] QrError),
}

pub struct SymbolCache {
    dir: PathBuf,
    // Keyed by the full entry header, not the digest
    memo: HashMap<String, QrCode>,
}

impl SymbolCache {
    /// Opens (creating if needed) a cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            memo: HashMap::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex digest identifying a payload and its options.
    pub fn key(data: &[u8], options: &EncodeOptions) -> String {
        let mut hasher = FxHasher::default();
        data.hash(&mut hasher);
        options.version.hash(&mut hasher);
        options.level.hash(&mut hasher);
        options.hint.hash(&mut hasher);
        options.case_sensitive.hash(&mut hasher);
        options.mask.hash(&mut hasher);
        hex::encode(hasher.finish().to_be_bytes())
    }

    /// First line of an entry: the payload in hex followed by the options.
    fn header(data: &[u8], options: &EncodeOptions) -> String {
        format!("# {} {:?}", hex::encode(data), options)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.txt"))
    }

    /// Looks up a stored symbol.
    ///
    /// # Errors
    ///
    /// [`CacheError::Encode`] with [`QrError::MalformedMatrix`] when the
    /// stored rows do not parse back into a symbol.
    pub fn load(
        &mut self,
        data: &[u8],
        options: &EncodeOptions,
    ) -> Result<Option<QrCode>, CacheError> {
        let header = Self::header(data, options);
        if let Some(qr) = self.memo.get(&header) {
            return Ok(Some(qr.clone()));
        }
        let path = self.path_for(&Self::key(data, options));
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let (stored, rows) = text.split_once('\n').unwrap_or((text.as_str(), ""));
        if stored != header {
            debug!("Cache entry {} belongs to another request", path.display());
            return Ok(None);
        }
        let qr = QrCode::from_text(rows)?;
        debug!("Cache hit {}", path.display());
        self.memo.insert(header, qr.clone());
        Ok(Some(qr))
    }

    /// Writes a symbol under the key for `data` and `options`.
    pub fn store(
        &mut self,
        data: &[u8],
        options: &EncodeOptions,
        qr: &QrCode,
    ) -> Result<PathBuf, CacheError> {
        let header = Self::header(data, options);
        let path = self.path_for(&Self::key(data, options));
        fs::write(&path, format!("{header}\n{qr}"))?;
        debug!("Cached symbol at {}", path.display());
        self.memo.insert(header, qr.clone());
        Ok(path)
    }

    /// Returns the cached symbol for `text`, encoding and storing it on a miss.
    pub fn encode_text(
        &mut self,
        text: &str,
        options: &EncodeOptions,
    ) -> Result<QrCode, CacheError> {
        if let Some(qr) = self.load(text.as_bytes(), options)? {
            return Ok(qr);
        }
        let qr = QrCode::encode_text(text, options)?;
        self.store(text.as_bytes(), options, &qr)?;
        Ok(qr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QrCodeEcc;

    #[test]
    fn test_key_depends_on_options() {
        let a = SymbolCache::key(b"abc", &EncodeOptions::default());
        let b = SymbolCache::key(b"abc", &EncodeOptions::default().with_level(QrCodeEcc::High));
        let c = SymbolCache::key(b"abd", &EncodeOptions::default());
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, SymbolCache::key(b"abc", &EncodeOptions::default()));
    }

    #[test]
    fn test_miss_then_hit_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let options = EncodeOptions::default().with_level(QrCodeEcc::Quartile);
        let mut cache = SymbolCache::new(dir.path().join("symbols")).unwrap();
        assert!(cache.load(b"cached", &options).unwrap().is_none());

        let qr = cache.encode_text("cached", &options).unwrap();
        let mut fresh = SymbolCache::new(dir.path().join("symbols")).unwrap();
        assert_eq!(fresh.load(b"cached", &options).unwrap(), Some(qr));
    }

    #[test]
    fn test_corrupt_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let options = EncodeOptions::default();
        let mut cache = SymbolCache::new(dir.path()).unwrap();
        let key = SymbolCache::key(b"broken", &options);
        let entry = format!("{}\n0101\n", SymbolCache::header(b"broken", &options));
        fs::write(dir.path().join(format!("{key}.txt")), entry).unwrap();
        assert!(matches!(
            cache.load(b"broken", &options),
            Err(CacheError::Encode(QrError::MalformedMatrix(_)))
        ));
    }

    #[test]
    fn test_entry_for_another_payload_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let options = EncodeOptions::default();
        let mut cache = SymbolCache::new(dir.path()).unwrap();
        cache.encode_text("other", &options).unwrap();

        // Simulate a digest collision: the entry for "other" sits under the key for "mine"
        let other = dir.path().join(format!("{}.txt", SymbolCache::key(b"other", &options)));
        let mine = dir.path().join(format!("{}.txt", SymbolCache::key(b"mine", &options)));
        fs::copy(&other, &mine).unwrap();

        let mut fresh = SymbolCache::new(dir.path()).unwrap();
        assert!(fresh.load(b"mine", &options).unwrap().is_none());
        let qr = fresh.encode_text("mine", &options).unwrap();
        assert_eq!(qr, QrCode::encode_text("mine", &options).unwrap());
        assert_eq!(fresh.load(b"mine", &options).unwrap(), Some(qr));
    }
}
