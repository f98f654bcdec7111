use bases_core::{BaseDefinition, Corpus, MarkerStyle, View};
use bases_expr::select_records;
use bases_vault::escape_html;

use crate::format::RenderContext;
use crate::html::{class_token, error_fragment};
use crate::views::render_view;

pub const NO_VIEWS_MESSAGE: &str = "This base defines no views";

/// The embeddable markup for a definition: a container, a tab row when more
/// than one view is shown, and one block per view with all but the first
/// hidden.
///
/// With `view_name` set only that view is rendered. Failures render as an
/// inline error block.
pub fn render_fragment(
    definition: &BaseDefinition,
    base_name: &str,
    view_name: Option<&str>,
    corpus: &Corpus,
    default_marker: MarkerStyle,
) -> String {
    if definition.views.is_empty() {
        return error_fragment(NO_VIEWS_MESSAGE);
    }
    let views: Vec<&View> = match view_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => match definition.view_named(name) {
            Some(view) => vec![view],
            None => return error_fragment(&format!("View not found: {name}")),
        },
        None => definition.views.iter().collect(),
    };

    let ctx = RenderContext::new(definition, corpus);
    let mut out = format!(
        "<div class=\"base-container\" data-base=\"{}\">\n",
        escape_html(base_name)
    );

    if views.len() > 1 {
        out.push_str("<div class=\"base-tabs\">");
        for (idx, view) in views.iter().enumerate() {
            let class = if idx == 0 { "base-tab active" } else { "base-tab" };
            out.push_str(&format!(
                "<button class=\"{}\" data-view-index=\"{}\">{}</button>",
                class,
                idx,
                escape_html(&view.name)
            ));
        }
        out.push_str("</div>\n");
    }

    for (idx, view) in views.iter().enumerate() {
        let hidden = if idx == 0 { "" } else { " style=\"display:none\"" };
        out.push_str(&format!(
            "<div class=\"base-view base-view-{}\" data-view-index=\"{}\"{}>\n",
            class_token(view.kind.as_str()),
            idx,
            hidden
        ));
        let records = select_records(definition, view, corpus);
        log::debug!(
            "base `{}` view `{}`: {} of {} records",
            base_name,
            view.name,
            records.len(),
            corpus.len()
        );
        out.push_str(&render_view(view, &records, &ctx, default_marker));
        out.push_str("\n</div>\n");
    }

    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_definition;

    fn render(source: &str, view: Option<&str>) -> String {
        let definition = parse_definition(source).expect("parse");
        render_fragment(&definition, "Books", view, &Corpus::default(), MarkerStyle::Bulleted)
    }

    #[test]
    fn single_view_has_no_tabs() {
        let out = render("views:\n  - type: table\n", None);
        assert!(out.starts_with("<div class=\"base-container\" data-base=\"Books\">"));
        assert!(!out.contains("base-tabs"));
        assert!(out.contains("<div class=\"base-view base-view-table\" data-view-index=\"0\">"));
    }

    #[test]
    fn multiple_views_get_tabs_and_hidden_blocks() {
        let out = render(
            "views:\n  - type: table\n    name: All\n  - type: cards\n  - type: list\n",
            None,
        );
        assert!(out.contains(
            "<div class=\"base-tabs\"><button class=\"base-tab active\" data-view-index=\"0\">All</button><button class=\"base-tab\" data-view-index=\"1\">View 2</button><button class=\"base-tab\" data-view-index=\"2\">View 3</button></div>"
        ));
        assert!(out.contains("<div class=\"base-view base-view-cards\" data-view-index=\"1\" style=\"display:none\">"));
        assert!(out.contains("<div class=\"base-view base-view-list\" data-view-index=\"2\" style=\"display:none\">"));
        assert_eq!(out.matches("display:none").count(), 2);
    }

    #[test]
    fn named_view_renders_alone() {
        let out = render("views:\n  - type: table\n  - type: list\n    name: Reading\n", Some("Reading"));
        assert!(!out.contains("base-tabs"));
        assert!(out.contains("<div class=\"base-view base-view-list\" data-view-index=\"0\">"));
        assert!(!out.contains("base-view-table"));
    }

    #[test]
    fn missing_view_names_the_view() {
        let out = render("views:\n  - type: table\n", Some("Ghost"));
        assert_eq!(out, "<div class=\"base-error\">View not found: Ghost</div>");
    }

    #[test]
    fn no_views_is_an_error() {
        assert_eq!(render("filters: 'x'\n", None), error_fragment(NO_VIEWS_MESSAGE));
    }

    #[test]
    fn unknown_kind_stays_inside_its_view_block() {
        let out = render("views:\n  - type: map\n", None);
        assert!(out.contains("base-view-map"));
        assert!(out.contains("<div class=\"base-error\">Unknown view type: map</div>"));
    }
}
