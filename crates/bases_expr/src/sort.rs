use std::cmp::Ordering;

use bases_core::{BaseDefinition, Corpus, Record, SortDirection, SortRule, Value};

use crate::eval::resolve_property;

/// Stable multi-key sort. The first rule with a non-equal comparison decides.
pub fn sort_records<'r>(
    records: &mut Vec<&'r Record>,
    rules: &[SortRule],
    definition: &BaseDefinition,
    corpus: &Corpus,
) {
    if rules.is_empty() || records.len() < 2 {
        return;
    }
    let mut keyed: Vec<(Vec<Value>, &'r Record)> = records
        .drain(..)
        .map(|record| {
            let keys = rules
                .iter()
                .map(|rule| resolve_property(&rule.property, record, definition, corpus))
                .collect();
            (keys, record)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, rules));
    records.extend(keyed.into_iter().map(|(_, record)| record));
}

fn compare_keys(a: &[Value], b: &[Value], rules: &[SortRule]) -> Ordering {
    for ((left, right), rule) in a.iter().zip(b).zip(rules) {
        let ord = match rule.direction {
            SortDirection::Ascending => left.compare(right),
            SortDirection::Descending => right.compare(left),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
