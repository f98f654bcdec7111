//! Table, list and card renderers.

use bases_core::{MarkerStyle, Record, View, ViewKind};
use bases_expr::resolve_property;
use bases_vault::{escape_html, resolve_reference};

use crate::format::{format_cell, RenderContext};
use crate::html::{error_fragment, padding_percent};

/// Markup for one view over already selected and sorted records.
///
/// `default_marker` applies to list views that declare no marker style.
pub fn render_view(
    view: &View,
    records: &[&Record],
    ctx: &RenderContext<'_>,
    default_marker: MarkerStyle,
) -> String {
    match &view.kind {
        ViewKind::Table => render_table(view, records, ctx),
        ViewKind::List => render_list(view, records, ctx, default_marker),
        ViewKind::Cards => render_cards(view, records, ctx),
        ViewKind::Other(kind) => error_fragment(&format!("Unknown view type: {kind}")),
    }
}

pub fn render_table(view: &View, records: &[&Record], ctx: &RenderContext<'_>) -> String {
    let order = view.effective_order();
    let mut out = format!(
        "<table class=\"base-table row-height-{}\">\n",
        view.row_height.as_str()
    );

    let widths: Vec<Option<f64>> = order.iter().map(|path| column_width(view, path)).collect();
    if widths.iter().any(Option::is_some) {
        out.push_str("<colgroup>");
        for width in &widths {
            match width {
                Some(px) => out.push_str(&format!("<col style=\"width: {px}px\">")),
                None => out.push_str("<col>"),
            }
        }
        out.push_str("</colgroup>\n");
    }

    out.push_str("<thead><tr>");
    for path in &order {
        out.push_str(&format!("<th>{}</th>", escape_html(&ctx.label(path))));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for record in records {
        out.push_str("<tr>");
        for path in &order {
            out.push_str(&format!("<td>{}</td>", format_cell(path, record, ctx)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>");
    out
}

/// Declared pixel width for a column; `note.x` and `x` name the same column.
fn column_width(view: &View, path: &str) -> Option<f64> {
    if let Some(px) = view.column_sizes.get(path) {
        return Some(*px);
    }
    let alternate = match path.strip_prefix("note.") {
        Some(bare) => bare.to_string(),
        None => format!("note.{path}"),
    };
    view.column_sizes.get(&alternate).copied()
}

pub fn render_list(
    view: &View,
    records: &[&Record],
    ctx: &RenderContext<'_>,
    default_marker: MarkerStyle,
) -> String {
    let order = view.effective_order();
    let (open, close) = match view.marker_style.unwrap_or(default_marker) {
        MarkerStyle::Numbered => ("<ol>", "</ol>"),
        MarkerStyle::Bulleted => ("<ul>", "</ul>"),
        MarkerStyle::None => ("<ul class=\"no-markers\">", "</ul>"),
    };
    let mut out = format!("{open}\n");
    for record in records {
        out.push_str("<li>");
        out.push_str(&list_item(view, &order, record, ctx));
        out.push_str("</li>\n");
    }
    out.push_str(close);
    out
}

fn list_item(view: &View, order: &[String], record: &Record, ctx: &RenderContext<'_>) -> String {
    if let Some(separator) = &view.list_separator {
        return order
            .iter()
            .map(|path| format_cell(path, record, ctx))
            .filter(|value| !value.trim().is_empty())
            .collect::<Vec<_>>()
            .join(&escape_html(separator));
    }
    let joiner = if view.indent_properties {
        "<br>\n&emsp;"
    } else {
        " - "
    };
    order
        .iter()
        .filter_map(|path| {
            let value = format_cell(path, record, ctx);
            if value.trim().is_empty() {
                return None;
            }
            Some(format!(
                "<span class=\"base-list-label\">{}</span>: {}",
                escape_html(&ctx.label(path)),
                value
            ))
        })
        .collect::<Vec<_>>()
        .join(joiner)
}

pub fn render_cards(view: &View, records: &[&Record], ctx: &RenderContext<'_>) -> String {
    let order = view.effective_order();
    let padding = padding_percent(view.aspect_ratio());
    let mut out = String::from("<div class=\"base-cards\">\n");
    for record in records {
        out.push_str("<div class=\"base-card\">\n");
        if let Some(image) = view.image_property.as_deref() {
            if let Some(src) = card_image(image, record, ctx) {
                out.push_str(&format!(
                    "<div class=\"base-card-image\" style=\"padding-bottom: {}%\"><img src=\"{}\" alt=\"\"></div>\n",
                    padding,
                    escape_html(&src)
                ));
            }
        }
        for path in &order {
            out.push_str(&format!(
                "<div class=\"base-card-property\"><div class=\"base-card-label\">{}</div><div class=\"base-card-value\">{}</div></div>\n",
                escape_html(&ctx.label(path)),
                format_cell(path, record, ctx)
            ));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>");
    out
}

fn card_image(path: &str, record: &Record, ctx: &RenderContext<'_>) -> Option<String> {
    let value = resolve_property(path, record, ctx.definition, ctx.corpus);
    let raw = match value.as_list() {
        Some(items) => items.first()?.to_display_string(),
        None => value.to_display_string(),
    };
    let src = resolve_reference(raw.trim(), ctx.corpus);
    (!src.trim().is_empty()).then_some(src)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bases_core::{BaseDefinition, Corpus, PropertyConfig, RowHeight, Value};

    use super::*;

    fn record(identifier: &str, attrs: &[(&str, Value)]) -> Record {
        let attributes: BTreeMap<String, Value> = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Record::new(identifier, format!("{identifier}.md"), attributes)
    }

    fn corpus() -> Corpus {
        Corpus::new(vec![
            record(
                "books/dune",
                &[
                    ("title", "Dune".into()),
                    ("author", "Herbert".into()),
                    ("cover", "[[dune.jpg]]".into()),
                ],
            ),
            record("books/emma", &[("title", "Emma".into())]),
        ])
    }

    fn definition() -> BaseDefinition {
        let mut definition = BaseDefinition::default();
        definition.properties.insert(
            "note.title".into(),
            PropertyConfig {
                display_name: Some("Title".into()),
            },
        );
        definition
    }

    fn view(kind: ViewKind, order: &[&str]) -> View {
        let mut view = View::new(kind, "Books");
        view.order = order.iter().map(|s| s.to_string()).collect();
        view
    }

    fn render(view: &View) -> String {
        let corpus = corpus();
        let definition = definition();
        let ctx = RenderContext::new(&definition, &corpus);
        let records: Vec<&Record> = corpus.iter().collect();
        render_view(view, &records, &ctx, MarkerStyle::Bulleted)
    }

    #[test]
    fn table_headers_use_display_names() {
        let mut v = view(ViewKind::Table, &["title", "author"]);
        v.row_height = RowHeight::Tall;
        let out = render(&v);
        assert!(out.starts_with("<table class=\"base-table row-height-tall\">"));
        assert!(out.contains("<thead><tr><th>Title</th><th>author</th></tr></thead>"));
        assert_eq!(out.matches("<tr>").count(), 3);
        assert!(out.contains("<td>Dune</td><td>Herbert</td>"));
        assert!(out.contains("<td>Emma</td><td></td>"));
        assert!(!out.contains("<colgroup>"));
    }

    #[test]
    fn table_colgroup_from_column_sizes() {
        let mut v = view(ViewKind::Table, &["note.title", "author"]);
        v.column_sizes.insert("title".into(), 240.0);
        let out = render(&v);
        assert!(out.contains("<colgroup><col style=\"width: 240px\"><col></colgroup>"));
    }

    #[test]
    fn list_markers() {
        let mut v = view(ViewKind::List, &["title"]);
        assert!(render(&v).starts_with("<ul>\n"));
        v.marker_style = Some(MarkerStyle::Numbered);
        assert!(render(&v).starts_with("<ol>\n"));
        v.marker_style = Some(MarkerStyle::None);
        assert!(render(&v).starts_with("<ul class=\"no-markers\">"));
    }

    #[test]
    fn list_default_marker_comes_from_caller() {
        let corpus = corpus();
        let definition = definition();
        let ctx = RenderContext::new(&definition, &corpus);
        let out = render_list(&view(ViewKind::List, &["title"]), &[], &ctx, MarkerStyle::Numbered);
        assert_eq!(out, "<ol>\n</ol>");
    }

    #[test]
    fn list_segments_skip_empty_values() {
        let out = render(&view(ViewKind::List, &["title", "author"]));
        assert!(out.contains(
            "<li><span class=\"base-list-label\">Title</span>: Dune - <span class=\"base-list-label\">author</span>: Herbert</li>"
        ));
        assert!(out.contains("<li><span class=\"base-list-label\">Title</span>: Emma</li>"));
    }

    #[test]
    fn list_separator_joins_values() {
        let mut v = view(ViewKind::List, &["title", "author"]);
        v.list_separator = Some(" | ".into());
        let out = render(&v);
        assert!(out.contains("<li>Dune | Herbert</li>"));
        assert!(out.contains("<li>Emma</li>"));
    }

    #[test]
    fn list_indented_properties() {
        let mut v = view(ViewKind::List, &["title", "author"]);
        v.indent_properties = true;
        assert!(render(&v).contains("Dune<br>\n&emsp;<span"));
    }

    #[test]
    fn cards_with_images() {
        let mut v = view(ViewKind::Cards, &["title", "cover"]);
        v.image_property = Some("cover".into());
        v.image_aspect_ratio = Some(1.5);
        let out = render(&v);
        assert!(out.starts_with("<div class=\"base-cards\">"));
        assert_eq!(out.matches("<div class=\"base-card\">").count(), 2);
        assert!(out.contains(
            "<div class=\"base-card-image\" style=\"padding-bottom: 66.6667%\"><img src=\"dune.jpg\" alt=\"\"></div>"
        ));
        assert_eq!(out.matches("base-card-image").count(), 1);
        assert!(out.contains("<div class=\"base-card-label\">Title</div><div class=\"base-card-value\">Dune</div>"));
        assert_eq!(
            out.matches("<div class=\"base-card-label\">cover</div>").count(),
            2
        );
    }

    #[test]
    fn cards_ignore_invalid_aspect_ratio() {
        let mut v = view(ViewKind::Cards, &["title"]);
        v.image_property = Some("cover".into());
        v.image_aspect_ratio = Some(-2.0);
        assert!(render(&v).contains("padding-bottom: 100%"));
    }

    #[test]
    fn unknown_kind_is_an_inline_error() {
        let out = render(&view(ViewKind::Other("map".into()), &["title"]));
        assert_eq!(out, "<div class=\"base-error\">Unknown view type: map</div>");
    }
}
