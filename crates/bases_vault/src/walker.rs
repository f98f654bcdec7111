//! Directory traversal producing corpus records from markdown notes.

use std::fs;
use std::io;
use std::path::Path;

use bases_core::{CorpusError, CorpusProvider, Record};
use walkdir::{DirEntry, WalkDir};

use crate::frontmatter::{extract_frontmatter, Frontmatter};

/// Corpus provider over a directory of markdown notes.
///
/// Hidden entries are pruned, only `.md` files become records, and entries are
/// visited in file-name order so the corpus load order is stable.
#[derive(Debug, Clone, Default)]
pub struct VaultWalker {
    follow_links: bool,
}

impl VaultWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Read one note into a record. `rel_path` is relative to `root`.
    pub fn load_record(&self, root: &Path, rel_path: &str) -> Result<Record, CorpusError> {
        let abs = root.join(rel_path);
        let bytes = fs::read(&abs).map_err(|source| CorpusError::Read {
            path: abs.clone(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        let attributes = match extract_frontmatter(&content) {
            Frontmatter::Invalid(message) => {
                log::warn!("{}: unreadable front-matter: {}", abs.display(), message);
                Default::default()
            }
            other => other.into_attributes(),
        };
        Ok(Record::new(slugify_path(rel_path), rel_path, attributes))
    }
}

impl CorpusProvider for VaultWalker {
    fn list_records(&self, root: &Path) -> Result<Vec<Record>, CorpusError> {
        let meta = fs::metadata(root).map_err(|source| CorpusError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(CorpusError::Root {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let walker = WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            // The root itself may be a dot-directory (temporary dirs often are).
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        let mut records = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(CorpusError::Walk {
                        path: root.to_path_buf(),
                        message: err.to_string(),
                    });
                }
                Err(err) => {
                    log::warn!("skipping unreadable vault entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            let rel = normalize_path(rel);
            match self.load_record(root, &rel) {
                Ok(record) => records.push(record),
                Err(err) => log::warn!("skipping note: {}", err),
            }
        }
        log::debug!("loaded {} records from {}", records.len(), root.display());
        Ok(records)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Normalize path separators to forward slashes.
pub fn normalize_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Stable record identifier for a corpus-relative note path.
///
/// `Projects/Q1 Plan.md` becomes `Projects/Q1-Plan`. Whitespace runs collapse
/// to `-`; punctuation that would break an href (`?`, `#`, `%`, `&`, quotes)
/// is dropped.
pub fn slugify_path(rel_path: &str) -> String {
    let path = rel_path.replace('\\', "/");
    let path = match path.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("md") && !stem.is_empty() => stem,
        _ => path.as_str(),
    };
    let mut out = String::with_capacity(path.len());
    let mut last_dash = false;
    for ch in path.trim().chars() {
        if ch.is_whitespace() {
            if !last_dash {
                out.push('-');
                last_dash = true;
            }
            continue;
        }
        if ch.is_alphanumeric() || matches!(ch, '/' | '_' | '.' | '-') {
            out.push(ch);
            last_dash = ch == '-';
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_drops_extension_and_punctuation() {
        assert_eq!(slugify_path("people/alice.md"), "people/alice");
        assert_eq!(slugify_path("Projects/Q1  Plan.md"), "Projects/Q1-Plan");
        assert_eq!(slugify_path("a/What? #1 & 100%.md"), "a/What-1-100");
        assert_eq!(slugify_path("notes\\win.md"), "notes/win");
        assert_eq!(slugify_path("café/résumé.md"), "café/résumé");
        assert_eq!(slugify_path("v1.2 notes.md"), "v1.2-notes");
    }

    #[test]
    fn normalizes_paths_to_forward_slashes() {
        assert_eq!(normalize_path(Path::new("foo\\bar\\baz.md")), "foo/bar/baz.md");
    }

    #[test]
    fn markdown_extension_is_case_insensitive() {
        assert!(is_markdown(Path::new("a/b.MD")));
        assert!(!is_markdown(Path::new("a/b.base")));
        assert!(!is_markdown(Path::new("a/md")));
    }
}
