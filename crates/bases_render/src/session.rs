use std::path::{Path, PathBuf};
use std::sync::Arc;

use bases_core::{BaseDefinition, Corpus, CorpusError, CorpusProvider};
use bases_vault::{CorpusCache, VaultWalker};

use crate::config::RenderConfig;
use crate::embed::{replace_embeds, EmbedSite};
use crate::fragment::render_fragment;
use crate::html::error_fragment;
use crate::loader::{parse_definition, DefinitionCache};
use crate::script::script_tag;

const INLINE_BASE_NAME: &str = "inline";

/// Owns the caches for one pipeline run.
///
/// Corpus snapshots and parsed definitions are loaded lazily and kept for the
/// life of the session. Every render method returns embeddable markup; load
/// failures become inline error blocks and a warning.
pub struct RenderSession<P = VaultWalker> {
    config: RenderConfig,
    corpora: CorpusCache<P>,
    definitions: DefinitionCache,
}

impl RenderSession<VaultWalker> {
    pub fn new(config: RenderConfig) -> Self {
        Self::with_provider(config, VaultWalker::new())
    }
}

impl<P: CorpusProvider> RenderSession<P> {
    pub fn with_provider(config: RenderConfig, provider: P) -> Self {
        Self {
            config,
            corpora: CorpusCache::new(provider),
            definitions: DefinitionCache::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn corpus(&mut self) -> Result<Arc<Corpus>, CorpusError> {
        self.corpora.load(&self.config.vault_root)
    }

    /// Renders the definition file `name`, optionally restricted to one view.
    ///
    /// The definition is looked up under the vault root first, then under
    /// `document_dir`.
    pub fn render_base(
        &mut self,
        name: &str,
        view: Option<&str>,
        document_dir: Option<&Path>,
    ) -> String {
        let definition = match self
            .definitions
            .load(name, &self.config.vault_root, document_dir)
        {
            Ok(definition) => definition,
            Err(err) => {
                log::warn!("base `{}`: {}", name, err);
                return error_fragment(&format!("Could not load base {name}: {err}"));
            }
        };
        self.render_definition(&definition, name, view)
    }

    /// Renders definition source text, as found in a `base` fence.
    pub fn render_source(&mut self, source: &str) -> String {
        match parse_definition(source) {
            Ok(definition) => self.render_definition(&definition, INLINE_BASE_NAME, None),
            Err(err) => {
                log::warn!("inline base: {}", err);
                error_fragment(&format!("Could not parse inline base: {err}"))
            }
        }
    }

    fn render_definition(
        &mut self,
        definition: &BaseDefinition,
        base_name: &str,
        view: Option<&str>,
    ) -> String {
        let corpus = match self.corpus() {
            Ok(corpus) => corpus,
            Err(err) => {
                log::warn!("base `{}`: {}", base_name, err);
                return error_fragment(&format!("Could not load notes: {err}"));
            }
        };
        render_fragment(
            definition,
            base_name,
            view,
            &corpus,
            self.config.default_list_marker,
        )
    }

    /// Replaces every base embed in `markdown` with its rendered fragment.
    ///
    /// `document_path` locates the document so definitions next to it can be
    /// found. Each embed renders on its own; one failing embed never affects
    /// another.
    pub fn render_document(&mut self, markdown: &str, document_path: &Path) -> String {
        let document_dir = self.document_folder(document_path);
        let mut rendered = 0usize;
        let out = replace_embeds(markdown, |site| {
            rendered += 1;
            match site {
                EmbedSite::Reference { name, view } => {
                    self.render_base(&name, view.as_deref(), document_dir.as_deref())
                }
                EmbedSite::Inline { source } => self.render_source(source),
            }
        });
        log::info!(
            "rendered {} base embed(s) in {}",
            rendered,
            document_path.display()
        );
        if rendered > 0 {
            self.with_script(out)
        } else {
            out
        }
    }

    /// Appends the tab controller script when the session is configured to.
    pub fn with_script(&self, mut html: String) -> String {
        if self.config.include_script {
            if !html.ends_with('\n') {
                html.push('\n');
            }
            html.push_str(&script_tag());
            html.push('\n');
        }
        html
    }

    /// Folder of `document_path`, read relative to the vault root when it
    /// does not exist as given.
    fn document_folder(&self, document_path: &Path) -> Option<PathBuf> {
        let parent = document_path.parent()?;
        if parent.as_os_str().is_empty() {
            return Some(self.config.vault_root.clone());
        }
        if parent.is_relative() && !parent.is_dir() {
            return Some(self.config.vault_root.join(parent));
        }
        Some(parent.to_path_buf())
    }
}
