use std::fmt::{self, Display};

use chumsky::error::Simple;
use thiserror::Error;

use crate::span::{LineIndex, Span};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.span.line, self.span.col, self.message)
    }
}

impl std::error::Error for ParseError {}

pub(crate) fn to_parse_error<T: Display + std::hash::Hash + std::cmp::Eq>(
    err: Simple<T>,
    line_index: &LineIndex,
) -> ParseError {
    let span = err.span();
    let (line, col) = line_index.line_col(span.start);
    ParseError {
        message: err.to_string(),
        span: Span {
            start: span.start,
            end: span.end,
            line,
            col,
        },
    }
}

/// Failure while evaluating a parsed expression against a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("could not parse `{source_text}`: {message}")]
    Parse { source_text: String, message: String },
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("unknown method `{name}` on {type_name}")]
    UnknownMethod { name: String, type_name: &'static str },
    #[error("`{name}` expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: &'static str,
        found: usize,
    },
    #[error("`{name}` expects {expected}, got {found}")]
    Type {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown formula `{0}`")]
    UnknownFormula(String),
    #[error("formula nesting exceeds {0} levels")]
    DepthExceeded(usize),
    #[error("a lambda can only appear as a method argument")]
    StrayLambda,
}

impl EvalError {
    pub(crate) fn from_parse_errors(source: &str, errors: &[ParseError]) -> Self {
        EvalError::Parse {
            source_text: source.to_string(),
            message: errors
                .iter()
                .map(ParseError::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}
