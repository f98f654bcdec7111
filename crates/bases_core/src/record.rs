use std::collections::BTreeMap;
use std::path::Path;

use crate::value::Value;

/// File facts derived once from a record's source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// File stem (`notes/Alice.md` -> `Alice`).
    pub name: String,
    /// Containing folder, `""` at the corpus root.
    pub folder: String,
    /// Corpus-relative path with forward slashes.
    pub path: String,
    pub slug: String,
    pub ext: String,
}

impl FileInfo {
    pub fn from_source_path(source_path: &str, identifier: &str) -> Self {
        let path = source_path.replace('\\', "/");
        let p = Path::new(&path);
        let name = p
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&path)
            .to_string();
        let folder = match path.rsplit_once('/') {
            Some((folder, _)) => folder.to_string(),
            None => String::new(),
        };
        let ext = p
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        FileInfo {
            name,
            folder,
            path,
            slug: identifier.to_string(),
            ext,
        }
    }
}

/// One corpus entry. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    identifier: String,
    source_path: String,
    attributes: BTreeMap<String, Value>,
    file: FileInfo,
}

impl Record {
    pub fn new(
        identifier: impl Into<String>,
        source_path: impl Into<String>,
        attributes: BTreeMap<String, Value>,
    ) -> Self {
        let identifier = identifier.into();
        let source_path = source_path.into().replace('\\', "/");
        let file = FileInfo::from_source_path(&source_path, &identifier);
        Record {
            identifier,
            source_path,
            attributes,
            file,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn file(&self) -> &FileInfo {
        &self.file
    }

    /// Source path with its final extension removed (`a/b/Note.md` -> `a/b/Note`).
    pub fn stem_path(&self) -> &str {
        match self.source_path.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem,
            _ => &self.source_path,
        }
    }

    /// The record's tags as a sequence; a scalar tag becomes a one-element list.
    pub fn tags(&self) -> Vec<Value> {
        let strip = |s: &str| Value::Text(s.trim().trim_start_matches('#').to_string());
        match self.attributes.get("tags") {
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Text(s) => strip(s),
                    other => other.clone(),
                })
                .collect(),
            Some(Value::Text(s)) if !s.trim().is_empty() => s
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(strip)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The synthetic `file` namespace object.
    pub fn file_object(&self) -> Value {
        let mut map = self.file_metadata_map();
        map.insert("ext".to_string(), Value::from(self.file.ext.as_str()));
        map.insert("tags".to_string(), Value::List(self.tags()));
        Value::Map(map)
    }

    /// The `fileMetadata` binding exposed to expressions.
    pub fn file_metadata(&self) -> Value {
        Value::Map(self.file_metadata_map())
    }

    fn file_metadata_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from(self.file.name.as_str()));
        map.insert("folder".to_string(), Value::from(self.file.folder.as_str()));
        map.insert("path".to_string(), Value::from(self.file.path.as_str()));
        map.insert("slug".to_string(), Value::from(self.file.slug.as_str()));
        map
    }
}
