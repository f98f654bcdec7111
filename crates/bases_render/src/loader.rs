//! Locating, parsing and caching base definitions.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bases_core::BaseDefinition;

pub const BASE_EXTENSION: &str = "base";

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("base `{name}` not found (tried {})", display_paths(.tried))]
    NotFound { name: String, tried: Vec<PathBuf> },
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {origin}: {message}")]
    Parse { origin: String, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses definition source text, naming unnamed views by position.
pub fn parse_definition(source: &str) -> Result<BaseDefinition, DefinitionError> {
    parse_with_origin(source, "inline base")
}

fn parse_with_origin(source: &str, origin: &str) -> Result<BaseDefinition, DefinitionError> {
    let mut definition = if source.trim().is_empty() {
        BaseDefinition::default()
    } else {
        serde_yaml::from_str::<BaseDefinition>(source).map_err(|e| DefinitionError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?
    };
    definition.assign_default_view_names();
    Ok(definition)
}

/// Paths tried for `name`, in order: relative to the vault root, then to the
/// embedding document's folder.
pub fn candidate_paths(name: &str, vault_root: &Path, document_dir: Option<&Path>) -> Vec<PathBuf> {
    let name = name.trim().trim_start_matches('/');
    let relative = Path::new(name);
    let mut forms = vec![relative.to_path_buf()];
    let has_base_ext = relative
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(BASE_EXTENSION))
        .unwrap_or(false);
    if !has_base_ext {
        forms.push(PathBuf::from(format!("{name}.{BASE_EXTENSION}")));
        if relative.extension().is_some() {
            forms.push(relative.with_extension(BASE_EXTENSION));
        }
    }

    let mut candidates = Vec::new();
    for dir in std::iter::once(vault_root).chain(document_dir) {
        for form in &forms {
            let candidate = dir.join(form);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Parsed definitions keyed by resolved absolute path.
///
/// Each successful request also remembers which path it resolved to, so a
/// repeated request is answered without touching the filesystem. Only
/// successful loads are stored, so a corrected file is picked up on the next
/// attempt.
#[derive(Debug, Default)]
pub struct DefinitionCache {
    resolved: HashMap<RequestKey, PathBuf>,
    entries: HashMap<PathBuf, Arc<BaseDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RequestKey {
    name: String,
    vault_root: PathBuf,
    document_dir: Option<PathBuf>,
}

impl DefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(
        &mut self,
        name: &str,
        vault_root: &Path,
        document_dir: Option<&Path>,
    ) -> Result<Arc<BaseDefinition>, DefinitionError> {
        let request = RequestKey {
            name: name.trim().to_string(),
            vault_root: vault_root.to_path_buf(),
            document_dir: document_dir.map(Path::to_path_buf),
        };
        if let Some(definition) = self
            .resolved
            .get(&request)
            .and_then(|path| self.entries.get(path))
        {
            return Ok(Arc::clone(definition));
        }

        let tried = candidate_paths(name, vault_root, document_dir);
        let Some(found) = tried.iter().find(|path| path.is_file()) else {
            return Err(DefinitionError::NotFound {
                name: name.to_string(),
                tried,
            });
        };
        let key = fs::canonicalize(found).unwrap_or_else(|_| found.clone());
        if let Some(definition) = self.entries.get(&key) {
            let definition = Arc::clone(definition);
            self.resolved.insert(request, key);
            return Ok(definition);
        }

        let source = fs::read_to_string(found).map_err(|source| DefinitionError::Read {
            path: found.clone(),
            source,
        })?;
        let definition = Arc::new(parse_with_origin(&source, &found.display().to_string())?);
        log::debug!("loaded base definition {}", key.display());
        self.entries.insert(key.clone(), Arc::clone(&definition));
        self.resolved.insert(request, key);
        Ok(definition)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
