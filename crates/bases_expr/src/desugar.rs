//! Implicit lambda parameters.
//!
//! `tags.map(value + "!")` is shorthand for `tags.map(value => value + "!")`
//! and `xs.reduce(acc + value, 0)` for `xs.reduce((acc, value) => acc + value, 0)`.
//! The rewrite happens on the tree, so string literals that happen to contain
//! `value` are never touched.

use crate::ast::Expr;

pub const IMPLICIT_VALUE: &str = "value";
pub const IMPLICIT_ACC: &str = "acc";

pub fn bind_implicit_params(expr: Expr) -> Expr {
    match expr {
        Expr::Method { target, name, args } => {
            let target = Box::new(bind_implicit_params(*target));
            let mut args: Vec<Expr> = args.into_iter().map(bind_implicit_params).collect();
            let params: Option<&[&str]> = match name.as_str() {
                "map" | "filter" => Some(&[IMPLICIT_VALUE][..]),
                "reduce" => Some(&[IMPLICIT_ACC, IMPLICIT_VALUE][..]),
                _ => None,
            };
            if let (Some(params), Some(first)) = (params, args.first_mut()) {
                if !matches!(first, Expr::Lambda { .. }) {
                    let body = std::mem::replace(first, Expr::List(Vec::new()));
                    *first = Expr::Lambda {
                        params: params.iter().map(|p| p.to_string()).collect(),
                        body: Box::new(body),
                    };
                }
            }
            Expr::Method { target, name, args }
        }
        Expr::Member { target, name } => Expr::Member {
            target: Box::new(bind_implicit_params(*target)),
            name,
        },
        Expr::Call { name, args } => Expr::Call {
            name,
            args: args.into_iter().map(bind_implicit_params).collect(),
        },
        Expr::Unary { op, expr } => Expr::Unary {
            op,
            expr: Box::new(bind_implicit_params(*expr)),
        },
        Expr::Binary { op, lhs, rhs } => Expr::Binary {
            op,
            lhs: Box::new(bind_implicit_params(*lhs)),
            rhs: Box::new(bind_implicit_params(*rhs)),
        },
        Expr::List(items) => Expr::List(items.into_iter().map(bind_implicit_params).collect()),
        Expr::Lambda { params, body } => Expr::Lambda {
            params,
            body: Box::new(bind_implicit_params(*body)),
        },
        leaf @ (Expr::Literal(_) | Expr::Path(_)) => leaf,
    }
}
