use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bases_core::{Corpus, CorpusError, CorpusProvider};

use crate::walker::VaultWalker;

/// Corpus snapshots keyed by canonical root path.
///
/// Entries are loaded on first access and kept for the lifetime of the cache;
/// failed loads are not remembered.
pub struct CorpusCache<P = VaultWalker> {
    provider: P,
    entries: HashMap<PathBuf, Arc<Corpus>>,
}

impl Default for CorpusCache<VaultWalker> {
    fn default() -> Self {
        CorpusCache::new(VaultWalker::new())
    }
}

impl<P: CorpusProvider> CorpusCache<P> {
    pub fn new(provider: P) -> Self {
        CorpusCache {
            provider,
            entries: HashMap::new(),
        }
    }

    pub fn load(&mut self, root: &Path) -> Result<Arc<Corpus>, CorpusError> {
        let key = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        if let Some(corpus) = self.entries.get(&key) {
            return Ok(Arc::clone(corpus));
        }
        let records = self.provider.list_records(&key)?;
        log::info!("indexed {} notes under {}", records.len(), key.display());
        let corpus = Arc::new(Corpus::new(records));
        self.entries.insert(key, Arc::clone(&corpus));
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bases_core::Record;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    struct CountingProvider {
        calls: Cell<usize>,
        fail: bool,
    }

    impl CorpusProvider for CountingProvider {
        fn list_records(&self, root: &Path) -> Result<Vec<Record>, CorpusError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(CorpusError::Walk {
                    path: root.to_path_buf(),
                    message: "boom".to_string(),
                });
            }
            Ok(vec![Record::new("a", "a.md", BTreeMap::new())])
        }
    }

    #[test]
    fn loads_once_per_root() {
        let mut cache = CorpusCache::new(CountingProvider {
            calls: Cell::new(0),
            fail: false,
        });
        let first = cache.load(Path::new("/no/such/vault")).unwrap();
        let second = cache.load(Path::new("/no/such/vault")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.provider.calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = CorpusCache::new(CountingProvider {
            calls: Cell::new(0),
            fail: true,
        });
        assert!(cache.load(Path::new("/no/such/vault")).is_err());
        assert!(cache.load(Path::new("/no/such/vault")).is_err());
        assert_eq!(cache.provider.calls.get(), 2);
        assert!(cache.is_empty());
    }
}
