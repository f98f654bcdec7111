//! Vault access for base rendering: front-matter extraction, the directory
//! corpus provider, the corpus cache and wikilink resolution.

pub mod cache;
pub mod frontmatter;
pub mod links;
pub mod walker;

pub use cache::CorpusCache;
pub use frontmatter::{extract_frontmatter, strip_frontmatter, Frontmatter};
pub use links::{
    escape_html, find_record, heading_slug, is_asset_target, normalize_target, parse_reference,
    parse_reference_inner, resolve_inline_references, resolve_reference, Reference,
    ASSET_EXTENSIONS,
};
pub use walker::{normalize_path, slugify_path, VaultWalker};
