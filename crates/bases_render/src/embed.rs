//! Finding base embeds inside a markdown document.
//!
//! Two forms are recognized: `![[name.base]]` / `![[name.base#View]]`
//! references, and fenced code blocks tagged `base`. Other fenced blocks are
//! copied through untouched, as are image-style embeds of anything else.

use bases_vault::parse_reference_inner;

/// One place in a document where a base is embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedSite<'a> {
    /// `![[name.base#view]]`
    Reference { name: String, view: Option<String> },
    /// The body of a ```` ```base ```` fence.
    Inline { source: &'a str },
}

const FENCE: &str = "```";
const BASE_FENCE_TAG: &str = "base";

/// Rewrites `markdown`, replacing every embed site with `render(site)`.
///
/// Sites are rendered independently and in document order. An unterminated
/// fence is left as written.
pub fn replace_embeds<F>(markdown: &str, mut render: F) -> String
where
    F: FnMut(EmbedSite<'_>) -> String,
{
    let mut out = String::with_capacity(markdown.len());
    let mut offset = 0usize;
    let lines: Vec<&str> = markdown.split_inclusive('\n').collect();
    let mut idx = 0usize;

    while idx < lines.len() {
        let line = lines[idx];
        let Some(tag) = fence_tag(line) else {
            out.push_str(&replace_reference_embeds(line, &mut render));
            offset += line.len();
            idx += 1;
            continue;
        };

        let Some(close) = (idx + 1..lines.len()).find(|&j| is_fence_close(lines[j])) else {
            out.push_str(&markdown[offset..]);
            return out;
        };
        let body_start = offset + line.len();
        let body_len: usize = lines[idx + 1..close].iter().map(|l| l.len()).sum();
        let block_len = line.len() + body_len + lines[close].len();

        if tag.eq_ignore_ascii_case(BASE_FENCE_TAG) {
            let source = &markdown[body_start..body_start + body_len];
            out.push_str(&render(EmbedSite::Inline { source }));
            if lines[close].ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(&markdown[offset..offset + block_len]);
        }
        offset += block_len;
        idx = close + 1;
    }
    out
}

/// Language tag of an opening fence line.
fn fence_tag(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(FENCE)?;
    Some(rest.trim().split_whitespace().next().unwrap_or(""))
}

fn is_fence_close(line: &str) -> bool {
    line.trim_start()
        .strip_prefix(FENCE)
        .map(|rest| rest.trim_start_matches('`').trim().is_empty())
        .unwrap_or(false)
}

fn replace_reference_embeds<F>(line: &str, render: &mut F) -> String
where
    F: FnMut(EmbedSite<'_>) -> String,
{
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find("![[") {
        let inner_start = start + 3;
        let Some(len) = rest[inner_start..].find("]]") else {
            break;
        };
        let inner = &rest[inner_start..inner_start + len];
        let site_end = inner_start + len + 2;
        out.push_str(&rest[..start]);
        match parse_reference_inner(inner).filter(|r| is_base_target(&r.target)) {
            Some(reference) => out.push_str(&render(EmbedSite::Reference {
                name: reference.target,
                view: reference.heading,
            })),
            None => out.push_str(&rest[start..site_end]),
        }
        rest = &rest[site_end..];
    }
    out.push_str(rest);
    out
}

fn is_base_target(target: &str) -> bool {
    target
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case(BASE_FENCE_TAG))
        .unwrap_or(false)
}
