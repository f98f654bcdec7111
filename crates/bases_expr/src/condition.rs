use bases_core::{resolve_path, BaseDefinition, Corpus, Record, Value};

use crate::ast::{BinaryOp, Expr};
use crate::errors::EvalError;
use crate::eval::Evaluator;
use crate::parser::parse_expression;

/// Evaluates a filter condition for one record.
///
/// Top-level `contains` checks list membership only; everything else is
/// evaluated and coerced by truthiness. Parse failures fall back to the
/// truthiness of the raw text as a property path, and evaluation errors make
/// the condition false.
pub fn evaluate_condition(
    expr: &str,
    record: &Record,
    definition: &BaseDefinition,
    corpus: &Corpus,
) -> bool {
    let mut evaluator = Evaluator::new(record, definition, corpus);
    match condition_holds(&mut evaluator, expr) {
        Ok(holds) => holds,
        Err(err) => {
            log::debug!("condition `{}` on {}: {}", expr, record.identifier(), err);
            false
        }
    }
}

fn condition_holds(evaluator: &mut Evaluator<'_>, source: &str) -> Result<bool, EvalError> {
    let parsed = match parse_expression(source) {
        Ok(parsed) => parsed,
        Err(errs) => {
            log::debug!("{}", EvalError::from_parse_errors(source, &errs));
            return Ok(resolve_path(evaluator.record(), source).is_truthy());
        }
    };
    match &parsed {
        Expr::Method { target, name, args } if name == "contains" && args.len() == 1 => {
            let haystack = evaluator.eval(target)?;
            let needle = evaluator.eval(&args[0])?;
            Ok(list_contains(&haystack, &needle))
        }
        Expr::Binary {
            op: BinaryOp::Contains,
            lhs,
            rhs,
        } => {
            let haystack = evaluator.eval(lhs)?;
            let needle = evaluator.eval(rhs)?;
            Ok(list_contains(&haystack, &needle))
        }
        _ if !source.contains('(') => Ok(evaluator.eval_source(source)?.is_truthy()),
        other => Ok(evaluator.eval(other)?.is_truthy()),
    }
}

fn list_contains(haystack: &Value, needle: &Value) -> bool {
    let needle = needle.to_display_string();
    haystack
        .as_list()
        .is_some_and(|items| items.iter().any(|item| item.to_display_string() == needle))
}
