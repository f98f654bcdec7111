use std::collections::HashMap;
use std::path::Path;

use crate::error::CorpusError;
use crate::record::Record;

/// Supplies the records a render pass operates over.
///
/// The provider owns traversal, hidden-directory exclusion and file-type
/// filtering; the engine only consumes the resulting records.
pub trait CorpusProvider {
    fn list_records(&self, root: &Path) -> Result<Vec<Record>, CorpusError>;
}

/// Records in load order, indexed by identifier.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<Record>,
    by_identifier: HashMap<String, usize>,
}

impl Corpus {
    pub fn new(records: Vec<Record>) -> Self {
        let mut by_identifier = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            // First record wins on duplicate identifiers.
            by_identifier
                .entry(record.identifier().to_string())
                .or_insert(idx);
        }
        Corpus {
            records,
            by_identifier,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&Record> {
        self.by_identifier
            .get(identifier)
            .and_then(|idx| self.records.get(*idx))
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn keeps_insertion_order_and_first_duplicate() {
        let corpus = Corpus::new(vec![
            Record::new("b", "b.md", BTreeMap::new()),
            Record::new("a", "a.md", BTreeMap::new()),
            Record::new("a", "other/a.md", BTreeMap::new()),
        ]);
        let ids: Vec<&str> = corpus.iter().map(Record::identifier).collect();
        assert_eq!(ids, vec!["b", "a", "a"]);
        assert_eq!(corpus.get("a").map(Record::source_path), Some("a.md"));
        assert!(corpus.get("missing").is_none());
        assert_eq!(corpus.len(), 3);
    }
}
