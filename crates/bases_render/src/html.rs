//! Small markup helpers shared by the view renderers.

pub use bases_vault::escape_html;

/// Visible inline error block; the message is escaped.
pub fn error_fragment(message: &str) -> String {
    format!("<div class=\"base-error\">{}</div>", escape_html(message))
}

/// `100 / ratio` as a CSS percentage without trailing zeros.
pub(crate) fn padding_percent(ratio: f64) -> String {
    let raw = format!("{:.4}", 100.0 / ratio);
    raw.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Lowercase token safe to embed in a class name.
pub(crate) fn class_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_fragment_escapes() {
        assert_eq!(
            error_fragment("bad <view>"),
            "<div class=\"base-error\">bad &lt;view&gt;</div>"
        );
    }

    #[test]
    fn padding_is_trimmed() {
        assert_eq!(padding_percent(1.0), "100");
        assert_eq!(padding_percent(1.5), "66.6667");
        assert_eq!(padding_percent(0.5), "200");
        assert_eq!(padding_percent(4.0 / 3.0), "75");
    }

    #[test]
    fn class_tokens() {
        assert_eq!(class_token("Table"), "table");
        assert_eq!(class_token("map view\""), "map-view-");
    }
}
