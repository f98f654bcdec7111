//! Wikilink resolution against a corpus.
//!
//! Handles `[[target]]`, `[[target|alias]]` and `[[target#heading]]`, plus the
//! embedded `![[asset.png]]` form. Asset targets resolve by file name only;
//! everything else is matched against record source paths.

use bases_core::{Corpus, Record};

/// Extensions treated as assets rather than notes.
pub const ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "ico"];

/// A parsed `[[...]]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub target: String,
    pub alias: Option<String>,
    pub heading: Option<String>,
}

impl Reference {
    /// Visible text: the alias, or the last segment of the target.
    pub fn display(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => last_segment(&self.target),
        }
    }
}

/// Parses a whole string of the form `[[...]]` (an optional leading `!` is allowed).
pub fn parse_reference(text: &str) -> Option<Reference> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('!').unwrap_or(trimmed);
    let inner = trimmed.strip_prefix("[[")?.strip_suffix("]]")?;
    if inner.contains("]]") {
        return None;
    }
    parse_reference_inner(inner)
}

/// Parses the inner content of a wikilink.
pub fn parse_reference_inner(inner: &str) -> Option<Reference> {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut parts = trimmed.splitn(2, '|');
    let left = parts.next()?.trim();
    let alias = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut left_parts = left.splitn(2, '#');
    let target = left_parts.next()?.trim().to_string();
    let heading = left_parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if target.is_empty() {
        return None;
    }
    Some(Reference {
        target,
        alias,
        heading,
    })
}

/// True when `text` names a file with an asset extension (case-insensitive).
pub fn is_asset_target(text: &str) -> bool {
    let name = last_segment(text.trim());
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ASSET_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        _ => false,
    }
}

/// Strips leading `../` and `./` segments and normalizes separators.
pub fn normalize_target(s: &str) -> String {
    let mut out = s.trim().replace('\\', "/");
    loop {
        if let Some(rest) = out.strip_prefix("../") {
            out = rest.to_string();
        } else if let Some(rest) = out.strip_prefix("./") {
            out = rest.to_string();
        } else {
            break;
        }
    }
    out.trim_start_matches('/').to_string()
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn strip_note_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("md") && !stem.is_empty() => stem,
        _ => path,
    }
}

/// First record matching `target` in corpus order.
///
/// A record matches when its source path without extension equals the target
/// or ends with `/target`, or when its file stem equals the target or the
/// target's last segment.
pub fn find_record<'a>(target: &str, corpus: &'a Corpus) -> Option<&'a Record> {
    let target = strip_note_extension(target);
    if target.is_empty() {
        return None;
    }
    let target_name = last_segment(target);
    let suffix = format!("/{target}");
    corpus.iter().find(|record| {
        let stem = record.stem_path();
        let name = record.file().name.as_str();
        stem == target || stem.ends_with(&suffix) || name == target || name == target_name
    })
}

/// Resolves a reference to a record identifier or an asset file name.
///
/// Text that is not a `[[...]]` reference is returned unchanged. An unresolved
/// note reference degrades to its normalized target path.
pub fn resolve_reference(text: &str, corpus: &Corpus) -> String {
    let Some(reference) = parse_reference(text) else {
        return text.to_string();
    };
    let target = normalize_target(&reference.target);
    if is_asset_target(&target) {
        return last_segment(&target).to_string();
    }
    match find_record(&target, corpus) {
        Some(record) => record.identifier().to_string(),
        None => target,
    }
}

/// Replaces every wikilink in `text` with markup; all other text is escaped.
///
/// Resolved references become `<a class="internal">` anchors, embedded assets
/// become `<img>` tags, and unresolved references render as escaped display
/// text.
pub fn resolve_inline_references(text: &str, corpus: &Corpus) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut plain_start = 0usize;
    let mut i = 0usize;
    while i + 1 < bytes.len() {
        if bytes[i] == b'[' && bytes[i + 1] == b'[' {
            let embed = i > 0 && bytes[i - 1] == b'!';
            let inner_start = i + 2;
            let Some(end) = text[inner_start..].find("]]").map(|off| inner_start + off) else {
                break;
            };
            if let Some(reference) = parse_reference_inner(&text[inner_start..end]) {
                let raw_start = if embed { i - 1 } else { i };
                out.push_str(&escape_html(&text[plain_start..raw_start]));
                out.push_str(&render_reference(&reference, embed, corpus));
                plain_start = end + 2;
            }
            i = end + 2;
            continue;
        }
        i += 1;
    }
    out.push_str(&escape_html(&text[plain_start..]));
    out
}

fn render_reference(reference: &Reference, embed: bool, corpus: &Corpus) -> String {
    let target = normalize_target(&reference.target);
    if is_asset_target(&target) {
        let file = last_segment(&target);
        let alt = reference.alias.as_deref().unwrap_or(file);
        if embed {
            return format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape_html(file),
                escape_html(alt)
            );
        }
        return anchor(file, alt);
    }
    match find_record(&target, corpus) {
        Some(record) => {
            let mut href = record.identifier().to_string();
            if let Some(slug) = reference.heading.as_deref().map(heading_slug) {
                if !slug.is_empty() {
                    href.push('#');
                    href.push_str(&slug);
                }
            }
            anchor(&href, reference.display())
        }
        None => escape_html(reference.display()),
    }
}

fn anchor(href: &str, display: &str) -> String {
    format!(
        "<a href=\"{}\" class=\"internal\">{}</a>",
        escape_html(href),
        escape_html(display)
    )
}

/// Slug for a heading fragment (`My Heading!` -> `my-heading`).
pub fn heading_slug(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let mut last_dash = false;
    for ch in trimmed.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            out.push(ch);
            last_dash = false;
            continue;
        }
        if (ch.is_whitespace() || ch == '-') && !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Escapes `& < > " '` for markup text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
