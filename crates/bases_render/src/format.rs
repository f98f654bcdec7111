//! The per-cell formatting pipeline shared by tables, lists and cards.

use bases_core::{parse_date, split_namespace, BaseDefinition, Corpus, Namespace, Record, Value};
use bases_expr::{evaluate_named_formula, resolve_property};
use bases_vault::{escape_html, resolve_inline_references};

/// What every view renderer needs to format a record.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub definition: &'a BaseDefinition,
    pub corpus: &'a Corpus,
}

impl<'a> RenderContext<'a> {
    pub fn new(definition: &'a BaseDefinition, corpus: &'a Corpus) -> Self {
        Self { definition, corpus }
    }

    pub fn label(&self, path: &str) -> String {
        self.definition.display_name(path)
    }
}

/// Markup for one property of one record.
///
/// Formula output is trusted markup and passes through unescaped. Everything
/// else is either reference-substituted (text and lists) or escaped.
pub fn format_cell(path: &str, record: &Record, ctx: &RenderContext<'_>) -> String {
    let (ns, name) = split_namespace(path);
    if ns == Namespace::Formula {
        return evaluate_named_formula(name, record, ctx.definition, ctx.corpus);
    }
    let value = resolve_property(path, record, ctx.definition, ctx.corpus);
    format_value(name, &value, ctx.corpus)
}

/// Formats a resolved, non-formula value for the property `name`.
pub fn format_value(name: &str, value: &Value, corpus: &Corpus) -> String {
    if value.is_null() {
        return String::new();
    }
    if name.to_lowercase().contains("date") {
        let date = match value {
            Value::Date(date) => Some(*date),
            Value::Text(text) => parse_date(text),
            _ => None,
        };
        if let Some(date) = date {
            return date.to_us_date();
        }
    }
    match value {
        Value::List(items) => {
            let joined = items
                .iter()
                .map(Value::to_display_string)
                .collect::<Vec<_>>()
                .join(", ");
            resolve_inline_references(&joined, corpus)
        }
        Value::Text(text) => resolve_inline_references(text, corpus),
        other => escape_html(&other.to_display_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

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
            record("people/alice", &[("title", "Alice".into())]),
            record(
                "projects/apollo",
                &[
                    ("owner", "[[alice]]".into()),
                    ("due_date", "2024-03-05".into()),
                    ("tags", Value::List(vec!["x".into(), "y<z".into()])),
                    ("score", 3.5.into()),
                    ("note", "a < b".into()),
                    ("updateDate", "soon".into()),
                ],
            ),
        ])
    }

    fn cell(path: &str) -> String {
        let corpus = corpus();
        let mut definition = BaseDefinition::default();
        definition
            .formulas
            .insert("owner_link".into(), "link(file.name, \"<b>\")".into());
        let ctx = RenderContext::new(&definition, &corpus);
        let apollo = corpus.get("projects/apollo").expect("record");
        format_cell(path, apollo, &ctx)
    }

    #[test]
    fn missing_value_is_empty() {
        assert_eq!(cell("nothing"), "");
    }

    #[test]
    fn date_named_columns_use_us_format() {
        assert_eq!(cell("due_date"), "03/05/2024");
        assert_eq!(cell("note.due_date"), "03/05/2024");
    }

    #[test]
    fn unparseable_date_text_is_plain_text() {
        assert_eq!(cell("updateDate"), "soon");
    }

    #[test]
    fn lists_are_joined_and_escaped() {
        assert_eq!(cell("tags"), "x, y&lt;z");
    }

    #[test]
    fn text_references_become_links() {
        assert_eq!(
            cell("owner"),
            "<a href=\"people/alice\" class=\"internal\">alice</a>"
        );
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(cell("note"), "a &lt; b");
    }

    #[test]
    fn numbers_stringify() {
        assert_eq!(cell("score"), "3.5");
    }

    #[test]
    fn formula_markup_passes_through() {
        let out = cell("formula.owner_link");
        assert!(out.starts_with("<a "), "{out}");
    }
}
