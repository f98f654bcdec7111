use bases_core::{resolve_path, BaseDefinition, Corpus, Record};

use crate::errors::EvalError;
use crate::eval::{is_text_formula, Evaluator};
use crate::parser::parse_expression;

/// Evaluates a formula expression to display text for one record.
///
/// Failures degrade to the raw text resolved as a property path, which is
/// usually empty.
pub fn evaluate_formula(
    expr: &str,
    record: &Record,
    definition: &BaseDefinition,
    corpus: &Corpus,
) -> String {
    let mut evaluator = Evaluator::new(record, definition, corpus);
    match formula_text(&mut evaluator, expr) {
        Ok(text) => text,
        Err(err) => {
            log::debug!("formula `{}` on {}: {}", expr, record.identifier(), err);
            resolve_path(record, expr).to_display_string()
        }
    }
}

/// Evaluates the formula named `name`; unknown names render empty.
pub fn evaluate_named_formula(
    name: &str,
    record: &Record,
    definition: &BaseDefinition,
    corpus: &Corpus,
) -> String {
    match definition.formula(name) {
        Some(source) => evaluate_formula(source, record, definition, corpus),
        None => {
            log::debug!("unknown formula `{}`", name);
            String::new()
        }
    }
}

fn formula_text(evaluator: &mut Evaluator<'_>, source: &str) -> Result<String, EvalError> {
    let parsed =
        parse_expression(source).map_err(|errs| EvalError::from_parse_errors(source, &errs))?;
    if is_text_formula(&parsed) {
        evaluator.eval_text(&parsed)
    } else {
        Ok(evaluator.eval_source(source)?.to_display_string())
    }
}
