//! Tree-walking interpreter over [`Expr`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use bases_core::{parse_date, resolve_path, BaseDefinition, Corpus, DateValue, Record, Value};
use bases_vault::{escape_html, find_record, normalize_target, parse_reference, resolve_reference};
use chrono::Local;

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::errors::EvalError;
use crate::parser::parse_expression;

/// Formulas referencing formulas deeper than this fail instead of recursing.
pub const MAX_FORMULA_DEPTH: usize = 32;

pub struct Evaluator<'a> {
    record: &'a Record,
    definition: &'a BaseDefinition,
    corpus: &'a Corpus,
    bindings: Vec<(String, Value)>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(record: &'a Record, definition: &'a BaseDefinition, corpus: &'a Corpus) -> Self {
        Evaluator {
            record,
            definition,
            corpus,
            bindings: Vec::new(),
            depth: 0,
        }
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    /// General evaluation of expression source text.
    ///
    /// Text without parentheses is first tried as a plain property path; a
    /// non-null result is returned as-is.
    pub fn eval_source(&mut self, source: &str) -> Result<Value, EvalError> {
        if !source.contains('(') {
            let direct = resolve_path(self.record, source);
            if !direct.is_null() {
                return Ok(direct);
            }
        }
        let expr =
            parse_expression(source).map_err(|errs| EvalError::from_parse_errors(source, &errs))?;
        self.eval(&expr)
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Path(segments) => self.eval_path(segments),
            Expr::Member { target, name } => {
                let target = self.eval(target)?;
                Ok(member(&target, name))
            }
            Expr::Call { name, args } => self.call(name, args),
            Expr::Method { target, name, args } => {
                let target = self.eval(target)?;
                self.method(target, name, args)
            }
            Expr::Unary { op, expr } => {
                let value = self.eval(expr)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Neg => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(EvalError::Type {
                            name: "-".to_string(),
                            expected: "a number",
                            found: other.type_name(),
                        }),
                    },
                }
            }
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Lambda { .. } => Err(EvalError::StrayLambda),
        }
    }

    /// Evaluates a named formula's expression as a value.
    pub fn formula_value(&mut self, name: &str) -> Result<Value, EvalError> {
        let source = self
            .definition
            .formula(name)
            .ok_or_else(|| EvalError::UnknownFormula(name.to_string()))?;
        if self.depth >= MAX_FORMULA_DEPTH {
            return Err(EvalError::DepthExceeded(MAX_FORMULA_DEPTH));
        }
        // Lambda parameters are lexically scoped to the formula that binds them.
        let saved = std::mem::take(&mut self.bindings);
        self.depth += 1;
        let result = self.eval_formula_source(source);
        self.depth -= 1;
        self.bindings = saved;
        result
    }

    /// A formula's value, identical wherever the formula is used.
    ///
    /// Text formulas (see [`is_text_formula`]) yield the text a cell shows;
    /// anything else evaluates like [`Evaluator::eval_source`].
    fn eval_formula_source(&mut self, source: &str) -> Result<Value, EvalError> {
        if !source.contains('(') {
            let direct = resolve_path(self.record, source);
            if !direct.is_null() {
                return Ok(direct);
            }
        }
        let expr =
            parse_expression(source).map_err(|errs| EvalError::from_parse_errors(source, &errs))?;
        if is_text_formula(&expr) {
            Ok(Value::Text(self.eval_text(&expr)?))
        } else {
            self.eval(&expr)
        }
    }

    /// Formula-context rendering of an expression to text.
    ///
    /// `link(..)` yields an anchor, `if(..)` selects a branch, a top-level `+`
    /// chain concatenates its operands, and anything else is evaluated and
    /// stringified.
    pub fn eval_text(&mut self, expr: &Expr) -> Result<String, EvalError> {
        match expr {
            Expr::Call { name, args } if name == "link" => self.link(args),
            Expr::Call { name, args } if name == "if" => {
                let (cond, then, otherwise) = if_args(args)?;
                if self.condition_holds(cond)? {
                    self.eval_text(then)
                } else {
                    otherwise.map_or(Ok(String::new()), |e| self.eval_text(e))
                }
            }
            Expr::Binary {
                op: BinaryOp::Add, ..
            } => {
                let mut operands = Vec::new();
                flatten_add(expr, &mut operands);
                let mut out = String::new();
                for operand in operands {
                    out.push_str(&self.eval_text(operand)?);
                }
                Ok(out)
            }
            other => Ok(self.eval(other)?.to_display_string()),
        }
    }

    fn eval_path(&mut self, segments: &[String]) -> Result<Value, EvalError> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(Value::Null);
        };
        if let Some(bound) = self.binding(head) {
            return Ok(select_members(&bound, rest));
        }
        let (base, rest) = match head.as_str() {
            "file" => (self.record.file_object(), rest),
            "fileMetadata" => (self.record.file_metadata(), rest),
            "note" | "this" => (Value::Map(self.record.attributes().clone()), rest),
            "formula" => match rest.split_first() {
                Some((name, rest)) => (self.formula_value(name)?, rest),
                None => return Ok(Value::Null),
            },
            _ => (
                self.record.attribute(head).cloned().unwrap_or_default(),
                rest,
            ),
        };
        Ok(select_members(&base, rest))
    }

    fn binding(&self, name: &str) -> Option<Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.clone())
    }

    fn condition_holds(&mut self, expr: &Expr) -> Result<bool, EvalError> {
        let value = self.eval(expr)?;
        Ok(value.is_truthy() && value.as_loose_bool() != Some(false))
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        match name {
            "link" => self.link(args).map(Value::Text),
            "if" => {
                let (cond, then, otherwise) = if_args(args)?;
                if self.condition_holds(cond)? {
                    self.eval(then)
                } else {
                    otherwise.map_or(Ok(Value::Null), |e| self.eval(e))
                }
            }
            "file" => {
                let [reference] = args else {
                    return Err(arity(name, "1", args.len()));
                };
                let reference = self.eval(reference)?.to_display_string();
                Ok(self.lookup_file(&reference))
            }
            "list" => {
                let [value] = args else {
                    return Err(arity(name, "1", args.len()));
                };
                Ok(match self.eval(value)? {
                    Value::List(items) => Value::List(items),
                    Value::Null => Value::List(Vec::new()),
                    other => Value::List(vec![other]),
                })
            }
            "date" => {
                let [value] = args else {
                    return Err(arity(name, "1", args.len()));
                };
                Ok(match self.eval(value)? {
                    Value::Date(d) => Value::Date(d),
                    other => parse_date(&other.to_display_string())
                        .map(Value::Date)
                        .unwrap_or_default(),
                })
            }
            "today" => Ok(Value::Date(DateValue::Day(Local::now().date_naive()))),
            "now" => Ok(Value::Date(DateValue::Instant(Local::now().naive_local()))),
            _ => Err(EvalError::UnknownFunction(name.to_string())),
        }
    }

    /// `link(url, text)`. A `file.*` url links to the current record itself.
    fn link(&mut self, args: &[Expr]) -> Result<String, EvalError> {
        let (url, text) = match args {
            [url] => (url, url),
            [url, text] => (url, text),
            _ => return Err(arity("link", "1 or 2", args.len())),
        };
        let href = match url {
            Expr::Path(segments) if segments.first().map(String::as_str) == Some("file") => {
                self.record.identifier().to_string()
            }
            other => {
                let raw = self.eval_text(other)?;
                resolve_reference(&raw, self.corpus)
            }
        };
        let text = self.eval_text(text)?;
        let text = match parse_reference(&text) {
            Some(reference) => reference.display().to_string(),
            None => text,
        };
        if href.trim().is_empty() || text.trim().is_empty() {
            return Ok(String::new());
        }
        Ok(format!(
            "<a href=\"{}\" class=\"internal\">{}</a>",
            escape_html(&href),
            escape_html(&text)
        ))
    }

    fn lookup_file(&self, reference: &str) -> Value {
        let target = match parse_reference(reference) {
            Some(parsed) => normalize_target(&parsed.target),
            None => normalize_target(reference),
        };
        match find_record(&target, self.corpus) {
            Some(record) => Value::Map(record.attributes().clone()),
            None => Value::Map(BTreeMap::new()),
        }
    }

    fn method(&mut self, target: Value, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        match name {
            "isEmpty" => Ok(Value::Bool(target.is_empty_value())),
            "contains" => {
                let [needle] = args else {
                    return Err(arity(name, "1", args.len()));
                };
                let needle = self.eval(needle)?;
                Ok(Value::Bool(contains(&target, &needle)))
            }
            "map" => {
                let items = list_items(name, target)?;
                let (params, body) = lambda_arg(name, args.first())?;
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    out.push(self.apply(params, body, vec![item, Value::from(idx as i64)])?);
                }
                Ok(Value::List(out))
            }
            "filter" => {
                let items = list_items(name, target)?;
                let (params, body) = lambda_arg(name, args.first())?;
                let mut out = Vec::new();
                for (idx, item) in items.into_iter().enumerate() {
                    let keep = self
                        .apply(params, body, vec![item.clone(), Value::from(idx as i64)])?
                        .is_truthy();
                    if keep {
                        out.push(item);
                    }
                }
                Ok(Value::List(out))
            }
            "reduce" => {
                let mut items = list_items(name, target)?.into_iter();
                let (params, body) = lambda_arg(name, args.first())?;
                let mut acc = match args.get(1) {
                    Some(init) => self.eval(init)?,
                    None => match items.next() {
                        Some(first) => first,
                        None => return Ok(Value::Null),
                    },
                };
                for item in items {
                    acc = self.apply(params, body, vec![acc, item])?;
                }
                Ok(acc)
            }
            "join" => {
                let sep = match args.first() {
                    Some(sep) => self.eval(sep)?.to_display_string(),
                    None => ",".to_string(),
                };
                Ok(Value::Text(match target {
                    Value::List(items) => items
                        .iter()
                        .map(Value::to_display_string)
                        .collect::<Vec<_>>()
                        .join(&sep),
                    other => other.to_display_string(),
                }))
            }
            "length" => Ok(length(&target).map(Value::from).unwrap_or_default()),
            "lower" | "toLowerCase" => Ok(Value::Text(target.to_display_string().to_lowercase())),
            "upper" | "toUpperCase" => Ok(Value::Text(target.to_display_string().to_uppercase())),
            "trim" => Ok(Value::Text(target.to_display_string().trim().to_string())),
            "toString" => Ok(Value::Text(target.to_display_string())),
            _ => Err(EvalError::UnknownMethod {
                name: name.to_string(),
                type_name: target.type_name(),
            }),
        }
    }

    fn apply(&mut self, params: &[String], body: &Expr, args: Vec<Value>) -> Result<Value, EvalError> {
        let mark = self.bindings.len();
        for (param, arg) in params.iter().zip(args) {
            self.bindings.push((param.clone(), arg));
        }
        let result = self.eval(body);
        self.bindings.truncate(mark);
        result
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, EvalError> {
        match op {
            BinaryOp::And => {
                if !self.eval(lhs)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(rhs)?.is_truthy()))
            }
            BinaryOp::Or => {
                if self.eval(lhs)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(rhs)?.is_truthy()))
            }
            _ => {
                let left = self.eval(lhs)?;
                let right = self.eval(rhs)?;
                Ok(apply_binary(op, &left, &right))
            }
        }
    }
}

/// True for formulas rooted at `link(..)`, `if(..)` or a `+` chain, which
/// render as text rather than as a computed value.
pub(crate) fn is_text_formula(expr: &Expr) -> bool {
    match expr {
        Expr::Call { name, .. } => name == "link" || name == "if",
        Expr::Binary {
            op: BinaryOp::Add, ..
        } => true,
        _ => false,
    }
}

/// Applies a non-short-circuiting binary operator to two values.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Eq => Value::Bool(loose_equals(left, right)),
        BinaryOp::Neq => Value::Bool(!loose_equals(left, right)),
        BinaryOp::Lt => Value::Bool(ordering(left, right) == Some(Ordering::Less)),
        BinaryOp::Lte => Value::Bool(matches!(
            ordering(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(ordering(left, right) == Some(Ordering::Greater)),
        BinaryOp::Gte => Value::Bool(matches!(
            ordering(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            _ => Value::Text(format!(
                "{}{}",
                left.to_display_string(),
                right.to_display_string()
            )),
        },
        BinaryOp::Contains => Value::Bool(contains(left, right)),
        BinaryOp::And => Value::Bool(left.is_truthy() && right.is_truthy()),
        BinaryOp::Or => Value::Bool(left.is_truthy() || right.is_truthy()),
    }
}

/// Equality used by `==` and `!=`.
///
/// Null equals only null, booleans compare against their textual spellings,
/// numbers compare numerically, everything else by display string.
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(b), other) | (other, Value::Bool(b)) => other.as_loose_bool() == Some(*b),
        (Value::Number(a), Value::Number(b)) => a == b,
        _ => left.to_display_string() == right.to_display_string(),
    }
}

/// Ordering for `<`-style operators; `None` when either side is null.
fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    if left.is_null() || right.is_null() {
        return None;
    }
    match (left, right) {
        (Value::Number(a), Value::Text(b)) => b.trim().parse::<f64>().ok().map(|b| a.total_cmp(&b)),
        (Value::Text(a), Value::Number(b)) => a.trim().parse::<f64>().ok().map(|a| a.total_cmp(b)),
        _ => Some(left.compare(right)),
    }
}

/// List membership by display string, or substring for text.
pub fn contains(haystack: &Value, needle: &Value) -> bool {
    let needle = needle.to_display_string();
    match haystack {
        Value::List(items) => items.iter().any(|item| item.to_display_string() == needle),
        Value::Text(s) => s.contains(&needle),
        Value::Null => false,
        other => other.to_display_string().contains(&needle),
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::Text(s.clone()),
    }
}

fn member(value: &Value, name: &str) -> Value {
    match (value, name) {
        (Value::Map(map), _) => map.get(name).cloned().unwrap_or_default(),
        (Value::List(_) | Value::Text(_), "length") => {
            length(value).map(Value::from).unwrap_or_default()
        }
        _ => Value::Null,
    }
}

fn select_members(value: &Value, segments: &[String]) -> Value {
    let mut current = value.clone();
    for segment in segments {
        current = member(&current, segment);
        if current.is_null() {
            break;
        }
    }
    current
}

fn length(value: &Value) -> Option<i64> {
    match value {
        Value::List(items) => Some(items.len() as i64),
        Value::Text(s) => Some(s.chars().count() as i64),
        Value::Map(map) => Some(map.len() as i64),
        Value::Null => Some(0),
        _ => None,
    }
}

fn list_items(name: &str, value: Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(EvalError::Type {
            name: name.to_string(),
            expected: "a list",
            found: other.type_name(),
        }),
    }
}

fn lambda_arg<'e>(name: &str, arg: Option<&'e Expr>) -> Result<(&'e [String], &'e Expr), EvalError> {
    match arg {
        Some(Expr::Lambda { params, body }) => Ok((params.as_slice(), body.as_ref())),
        Some(_) => Err(EvalError::Type {
            name: name.to_string(),
            expected: "a lambda",
            found: "expression",
        }),
        None => Err(arity(name, "at least 1", 0)),
    }
}

fn if_args(args: &[Expr]) -> Result<(&Expr, &Expr, Option<&Expr>), EvalError> {
    match args {
        [cond, then] => Ok((cond, then, None)),
        [cond, then, otherwise] => Ok((cond, then, Some(otherwise))),
        _ => Err(arity("if", "2 or 3", args.len())),
    }
}

fn flatten_add<'e>(expr: &'e Expr, out: &mut Vec<&'e Expr>) {
    match expr {
        Expr::Binary {
            op: BinaryOp::Add,
            lhs,
            rhs,
        } => {
            flatten_add(lhs, out);
            flatten_add(rhs, out);
        }
        other => out.push(other),
    }
}

fn arity(name: &str, expected: &'static str, found: usize) -> EvalError {
    EvalError::Arity {
        name: name.to_string(),
        expected,
        found,
    }
}

/// Namespace-aware property lookup used by sorting and rendering.
///
/// `formula.<name>` evaluates the named formula; every other path resolves the
/// same way an expression path would. Failures resolve to null.
pub fn resolve_property(
    path: &str,
    record: &Record,
    definition: &BaseDefinition,
    corpus: &Corpus,
) -> Value {
    let segments: Vec<String> = path.trim().split('.').map(|s| s.trim().to_string()).collect();
    let mut evaluator = Evaluator::new(record, definition, corpus);
    evaluator.eval_path(&segments).unwrap_or_else(|err| {
        log::debug!("property `{}` on {}: {}", path, record.identifier(), err);
        Value::Null
    })
}
