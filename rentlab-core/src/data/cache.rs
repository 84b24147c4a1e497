//! Memoized loading keyed by source file.
//!
//! A cached report is reused while the file's length and modification time
//! are unchanged; otherwise the file is reloaded and the entry replaced.

use super::loader::{load_csv, LoadError};
use super::store::LoadReport;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

/// Cheap identity of a file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSignature {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceSignature {
    pub fn of(path: &Path) -> Result<Self, LoadError> {
        let meta = fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct Entry {
    signature: SourceSignature,
    report: Arc<LoadReport>,
}

/// Process-wide store cache. Safe to share across threads.
#[derive(Default)]
pub struct StoreCache {
    entries: RwLock<HashMap<PathBuf, Entry>>,
}

impl StoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached report for `path`, loading it on first use or when
    /// the file changed since the last load.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<LoadReport>, LoadError> {
        let path = path.as_ref();
        let key = fs::canonicalize(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let signature = SourceSignature::of(&key)?;

        if let Ok(entries) = self.entries.read() {
            if let Some(entry) = entries.get(&key) {
                if entry.signature == signature {
                    debug!("cache hit for {}", key.display());
                    return Ok(Arc::clone(&entry.report));
                }
            }
        }

        debug!("cache miss for {}", key.display());
        let report = Arc::new(load_csv(&key)?);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(
            key,
            Entry {
                signature,
                report: Arc::clone(&report),
            },
        );
        Ok(report)
    }

    /// Drop the entry for `path`, if cached.
    pub fn invalidate(&self, path: impl AsRef<Path>) {
        let Ok(key) = fs::canonicalize(path.as_ref()) else {
            return;
        };
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(&key);
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "id_contrato,id_loja,categoria_veiculo,data_inicio_locacao,diaria_media,valor_total_locacao,duracao_locacao,dias_antecedencia\n\
                       c1,1,SUV,2023-01-01,100,300,3,2\n";

    #[test]
    fn second_call_reuses_report() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let cache = StoreCache::new();
        let a = cache.get_or_load(file.path()).unwrap();
        let b = cache.get_or_load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_file_is_reloaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let cache = StoreCache::new();
        let a = cache.get_or_load(file.path()).unwrap();
        file.write_all(b"c2,2,Hatch,2023-01-02,90,180,2,1\n").unwrap();
        file.flush().unwrap();
        let b = cache.get_or_load(file.path()).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.accepted(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forces_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let cache = StoreCache::new();
        let a = cache.get_or_load(file.path()).unwrap();
        cache.invalidate(file.path());
        assert!(cache.is_empty());
        let b = cache.get_or_load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn missing_file_errors() {
        let cache = StoreCache::new();
        assert!(cache.get_or_load("/no/such/contracts.csv").is_err());
    }
}
