//! Dotted property-path resolution against a record.
//!
//! Paths are named keys only; there is no index syntax. Descending through a
//! missing key or a non-mapping value yields `Value::Null`, never an error.

use crate::record::Record;
use crate::value::Value;

/// The namespace a property path is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    File,
    Note,
    Formula,
    Bare,
}

impl Namespace {
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Namespace::File => Some("file."),
            Namespace::Note => Some("note."),
            Namespace::Formula => Some("formula."),
            Namespace::Bare => None,
        }
    }
}

/// Splits `formula.total` into `(Formula, "total")`; bare paths are returned whole.
pub fn split_namespace(path: &str) -> (Namespace, &str) {
    let path = path.trim();
    for ns in [Namespace::File, Namespace::Note, Namespace::Formula] {
        if let Some(rest) = ns.prefix().and_then(|p| path.strip_prefix(p)) {
            return (ns, rest);
        }
    }
    (Namespace::Bare, path)
}

/// Resolves `path` against `record`.
///
/// `file.*` reads the synthetic file object, `note.*` and bare names read the
/// record's attributes. `formula.*` is not known here and resolves to null;
/// the expression evaluator handles that namespace.
pub fn resolve_path(record: &Record, path: &str) -> Value {
    let segments: Vec<&str> = path.trim().split('.').map(str::trim).collect();
    let Some((head, rest)) = segments.split_first() else {
        return Value::Null;
    };
    match *head {
        "" => Value::Null,
        "file" => select(&record.file_object(), rest),
        "note" => match rest.split_first() {
            None => Value::Map(record.attributes().clone()),
            Some((key, rest)) => record
                .attribute(key)
                .map(|v| select(v, rest))
                .unwrap_or_default(),
        },
        _ => record
            .attribute(head)
            .map(|v| select(v, rest))
            .unwrap_or_default(),
    }
}

/// Indexes progressively into nested mappings.
pub fn select(value: &Value, segments: &[&str]) -> Value {
    let mut current = value;
    for segment in segments {
        match current.get(segment) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample() -> Record {
        let mut address = BTreeMap::new();
        address.insert("city".to_string(), Value::from("Lisbon"));
        let mut attrs = BTreeMap::new();
        attrs.insert("title".to_string(), Value::from("Alice"));
        attrs.insert("address".to_string(), Value::Map(address));
        attrs.insert("file".to_string(), Value::from("shadowed"));
        Record::new("people/alice", "people/alice.md", attrs)
    }

    #[test]
    fn bare_and_note_paths_read_attributes() {
        let record = sample();
        assert_eq!(resolve_path(&record, "title"), Value::from("Alice"));
        assert_eq!(resolve_path(&record, "note.title"), Value::from("Alice"));
        assert_eq!(resolve_path(&record, "address.city"), Value::from("Lisbon"));
        assert_eq!(resolve_path(&record, "note.address.city"), Value::from("Lisbon"));
    }

    #[test]
    fn file_namespace_ignores_file_attribute() {
        let record = sample();
        assert_eq!(resolve_path(&record, "file.name"), Value::from("alice"));
        assert_eq!(resolve_path(&record, "file.folder"), Value::from("people"));
        assert_eq!(resolve_path(&record, "file.slug"), Value::from("people/alice"));
    }

    #[test]
    fn missing_segments_short_circuit_to_null() {
        let record = sample();
        assert_eq!(resolve_path(&record, "missing"), Value::Null);
        assert_eq!(resolve_path(&record, "missing.deeper.still"), Value::Null);
        assert_eq!(resolve_path(&record, "title.length"), Value::Null);
        assert_eq!(resolve_path(&record, ""), Value::Null);
        assert_eq!(resolve_path(&record, "formula.anything"), Value::Null);
    }

    #[test]
    fn splits_known_namespaces() {
        assert_eq!(split_namespace("file.name"), (Namespace::File, "name"));
        assert_eq!(split_namespace("note.a.b"), (Namespace::Note, "a.b"));
        assert_eq!(split_namespace("formula.x"), (Namespace::Formula, "x"));
        assert_eq!(split_namespace("status"), (Namespace::Bare, "status"));
        assert_eq!(split_namespace("filename"), (Namespace::Bare, "filename"));
    }
}
