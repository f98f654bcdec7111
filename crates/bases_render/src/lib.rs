//! HTML rendering for bases: the formatting pipeline, table/list/card views,
//! multi-view fragments, the definition loader and document embedding.

pub mod config;
pub mod embed;
pub mod format;
pub mod fragment;
pub mod html;
pub mod loader;
pub mod script;
pub mod session;
pub mod views;

pub use config::{RenderConfig, ENV_INCLUDE_SCRIPT, ENV_VAULT_ROOT};
pub use embed::{replace_embeds, EmbedSite};
pub use format::{format_cell, format_value, RenderContext};
pub use fragment::{render_fragment, NO_VIEWS_MESSAGE};
pub use html::error_fragment;
pub use loader::{candidate_paths, parse_definition, DefinitionCache, DefinitionError};
pub use script::{script_tag, TAB_CONTROLLER_SCRIPT};
pub use session::RenderSession;
pub use views::{render_cards, render_list, render_table, render_view};
