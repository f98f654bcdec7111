use bases_core::{BaseDefinition, Condition, Corpus, Filter, Record, View};

use crate::condition::evaluate_condition;
use crate::sort::sort_records;

/// True when `record` passes `filter`; an absent filter passes everything.
///
/// Only one combinator of a node is consulted: `and`, else `or`, else `not`.
pub fn evaluate_filter(
    filter: Option<&Filter>,
    record: &Record,
    definition: &BaseDefinition,
    corpus: &Corpus,
) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let holds = |condition: &Condition| match condition {
        Condition::Expression(expr) => evaluate_condition(expr, record, definition, corpus),
        Condition::Group(group) => evaluate_filter(Some(group), record, definition, corpus),
    };
    if let Some(all) = &filter.and {
        return all.iter().all(holds);
    }
    if let Some(any) = &filter.or {
        return any.iter().any(holds);
    }
    if let Some(none) = &filter.not {
        return !none.iter().any(holds);
    }
    true
}

/// Records that pass both the definition's root filter and the view's filter,
/// in the view's sort order.
pub fn select_records<'c>(
    definition: &BaseDefinition,
    view: &View,
    corpus: &'c Corpus,
) -> Vec<&'c Record> {
    let mut selected: Vec<&Record> = corpus
        .iter()
        .filter(|record| {
            evaluate_filter(definition.filters.as_ref(), record, definition, corpus)
                && evaluate_filter(view.filters.as_ref(), record, definition, corpus)
        })
        .collect();
    sort_records(&mut selected, &view.sort, definition, corpus);
    selected
}
