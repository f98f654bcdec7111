//! Expression language for base filters and formulas: a chumsky lexer and
//! parser, implicit-lambda desugaring, a tree-walking evaluator and the
//! filter/sort engine built on top of it.

mod ast;
mod condition;
mod desugar;
mod errors;
mod eval;
mod filter;
mod formula;
mod lexer;
mod parser;
mod sort;
mod span;
mod tokens;


pub use ast::*;
pub use condition::evaluate_condition;
pub use desugar::{bind_implicit_params, IMPLICIT_ACC, IMPLICIT_VALUE};
pub use errors::{EvalError, ParseError};
pub use eval::{apply_binary, contains, loose_equals, resolve_property, Evaluator, MAX_FORMULA_DEPTH};
pub use filter::{evaluate_filter, select_records};
pub use formula::{evaluate_formula, evaluate_named_formula};
pub use parser::{parse_expression, parse_syntax};
pub use sort::sort_records;
pub use span::Span;
